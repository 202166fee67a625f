//! Keyboard movement and room bounds
//!
//! `KeyW` raises the *backward* intent and `KeyS` the *forward* one. The frame
//! velocity negates forward again, so holding W still walks along the view.

use glam::{Vec2, Vec3};

use super::camera::FirstPersonCamera;
use crate::consts::*;

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Update from a physical key code (`KeyboardEvent.code`).
    /// Returns false for keys that don't move the camera.
    pub fn apply_key(&mut self, code: &str, pressed: bool) -> bool {
        match code {
            "KeyW" => self.backward = pressed,
            "KeyS" => self.forward = pressed,
            "KeyA" => self.left = pressed,
            "KeyD" => self.right = pressed,
            _ => return false,
        }
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Per-frame velocity: `x` is strafe distance, `y` is forward distance
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.forward {
            v.y -= speed;
        }
        if self.backward {
            v.y += speed;
        }
        if self.left {
            v.x -= speed;
        }
        if self.right {
            v.x += speed;
        }
        v
    }
}

/// Whether a `KeyboardEvent.key` toggles effects. Only lowercase `e` does.
#[inline]
pub fn is_effects_toggle(key: &str) -> bool {
    key == "e"
}

/// Box the camera may move within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoomBounds {
    /// Walkable volume of the hall
    pub fn room() -> Self {
        let half_width = CINEMA_WIDTH / 2.0 - CAMERA_WALL_MARGIN;
        let half_depth = CINEMA_DEPTH / 2.0 - CAMERA_DEPTH_MARGIN;
        Self {
            min: Vec3::new(-half_width, CAMERA_MIN_Y, -half_depth),
            max: Vec3::new(half_width, CAMERA_MAX_Y, half_depth),
        }
    }

    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Move the camera for one frame and keep it inside the room
pub fn update_controls(camera: &mut FirstPersonCamera, intent: &MoveIntent, speed: f32) {
    let velocity = intent.velocity(speed);
    camera.move_right(velocity.x);
    camera.move_forward(velocity.y);
    camera.position = RoomBounds::room().clamp(camera.position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_wiring() {
        let mut intent = MoveIntent::default();
        assert!(intent.apply_key("KeyW", true));
        assert!(intent.backward && !intent.forward);
        assert!(intent.apply_key("KeyS", true));
        assert!(intent.forward);
        assert!(intent.apply_key("KeyW", false));
        assert!(!intent.backward);
        assert!(!intent.apply_key("KeyQ", true));

        intent.clear();
        assert!(!intent.any());
    }

    #[test]
    fn test_holding_w_walks_toward_screen() {
        let mut camera = FirstPersonCamera::default();
        let mut intent = MoveIntent::default();
        intent.apply_key("KeyW", true);

        let start = camera.position;
        update_controls(&mut camera, &intent, 0.1);
        assert!((camera.position.z - (start.z - 0.1)).abs() < 1e-5);
        assert!((camera.position.x - start.x).abs() < 1e-5);
    }

    #[test]
    fn test_holding_d_strafes_right() {
        let mut camera = FirstPersonCamera::default();
        let mut intent = MoveIntent::default();
        intent.apply_key("KeyD", true);
        update_controls(&mut camera, &intent, 0.1);
        assert!((camera.position.x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let intent = MoveIntent {
            forward: true,
            backward: true,
            left: true,
            right: true,
        };
        assert_eq!(intent.velocity(0.1), Vec2::ZERO);
    }

    #[test]
    fn test_effects_toggle_key() {
        assert!(is_effects_toggle("e"));
        assert!(!is_effects_toggle("E"));
        assert!(!is_effects_toggle("KeyE"));
    }

    #[test]
    fn test_room_bounds() {
        let b = RoomBounds::room();
        assert!((b.max.x - 7.5).abs() < 1e-5);
        assert!((b.max.z - 7.1).abs() < 1e-5);
        assert_eq!(b.min.y, 1.0);
        assert_eq!(b.max.y, 5.0);
    }

    #[test]
    fn test_walking_into_wall_stops_at_bound() {
        let mut camera = FirstPersonCamera::default();
        let intent = MoveIntent {
            backward: true,
            ..Default::default()
        };
        for _ in 0..500 {
            update_controls(&mut camera, &intent, 0.1);
        }
        assert!((camera.position.z - RoomBounds::room().min.z).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_camera_stays_in_room(
            start in (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0),
            yaw in -10.0f32..10.0,
            pitch in -1.5f32..1.5,
            keys in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..50),
            speed in 0.01f32..1.0,
        ) {
            let mut camera = FirstPersonCamera::default();
            camera.position = Vec3::new(start.0, start.1, start.2);
            camera.yaw = yaw;
            camera.pitch = pitch;
            let bounds = RoomBounds::room();

            for (forward, backward, left, right) in keys {
                let intent = MoveIntent { forward, backward, left, right };
                update_controls(&mut camera, &intent, speed);
                prop_assert!(bounds.contains(camera.position));
            }
        }
    }
}
