//! First-person perspective camera
//!
//! Orientation is yaw (around +Y) then pitch (around local +X), the same order
//! pointer-lock look controls use. At yaw = pitch = 0 the camera looks down -Z.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use super::picking::Ray;

/// Camera start position: standing in the aisle between screen and seats
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 1.5, 5.0);

#[derive(Debug, Clone)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    /// Radians, positive turns left
    pub yaw: f32,
    /// Radians, positive looks up, clamped to [-π/2, π/2]
    pub pitch: f32,
    pub fov_y_degrees: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new(CAMERA_START, 75.0, 16.0 / 9.0)
    }
}

impl FirstPersonCamera {
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_degrees,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// View direction
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Camera right vector; always horizontal
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Walk along the view direction projected onto the ground plane
    pub fn move_forward(&mut self, distance: f32) {
        let ground_forward = Vec3::Y.cross(self.right());
        self.position += ground_forward * distance;
    }

    /// Strafe along the camera's right vector
    pub fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    /// Apply relative pointer movement (pixels) while the pointer is locked
    pub fn rotate_by_pointer(&mut self, movement_x: f32, movement_y: f32, radians_per_pixel: f32) {
        self.yaw -= movement_x * radians_per_pixel;
        self.pitch = (self.pitch - movement_y * radians_per_pixel).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Turn to face a world point
    pub fn look_toward(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point in normalized device coordinates
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let inv_view_proj = self.view_projection().inverse();
        let near = inv_view_proj.project_point3(ndc.extend(0.0));
        let far = inv_view_proj.project_point3(ndc.extend(1.0));
        Ray::new(self.position, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = FirstPersonCamera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
        assert_eq!(cam.position, CAMERA_START);
    }

    #[test]
    fn test_move_forward_stays_on_ground_plane() {
        let mut cam = FirstPersonCamera::default();
        cam.pitch = 0.8;
        cam.move_forward(1.0);
        assert!((cam.position - (CAMERA_START + Vec3::NEG_Z)).length() < EPS);

        cam.yaw = FRAC_PI_2; // facing -X
        cam.move_forward(2.0);
        assert!((cam.position.x - -2.0).abs() < EPS);
        assert!((cam.position.y - CAMERA_START.y).abs() < EPS);
    }

    #[test]
    fn test_pointer_pitch_clamped() {
        let mut cam = FirstPersonCamera::default();
        cam.rotate_by_pointer(0.0, -100_000.0, 0.002);
        assert!((cam.pitch - FRAC_PI_2).abs() < EPS);
        cam.rotate_by_pointer(0.0, 100_000.0, 0.002);
        assert!((cam.pitch + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_pointer_right_turns_right() {
        let mut cam = FirstPersonCamera::default();
        cam.rotate_by_pointer(100.0, 0.0, 0.002);
        assert!(cam.forward().x > 0.0);
    }

    #[test]
    fn test_center_ray_matches_forward() {
        let mut cam = FirstPersonCamera::default();
        cam.look_toward(Vec3::new(-3.0, -0.1, 7.6));
        let ray = cam.ray_through_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, cam.position);
        assert!((ray.direction - cam.forward()).length() < 1e-3);
    }

    #[test]
    fn test_corner_ray_spreads_with_fov() {
        let cam = FirstPersonCamera::new(Vec3::ZERO, 90.0, 1.0);
        let ray = cam.ray_through_ndc(Vec2::new(0.0, 1.0));
        // Top edge of a 90° vertical FOV is 45° above the view direction
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!((ray.direction - expected).length() < 1e-3);
    }

    #[test]
    fn test_view_matrix_straight_down_is_finite() {
        let mut cam = FirstPersonCamera::default();
        cam.pitch = -FRAC_PI_2;
        assert!(cam.view_projection().is_finite());
    }
}
