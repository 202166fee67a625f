//! Per-frame update
//!
//! Runs once per display refresh. Movement always applies; fan spin and seat
//! bob only while effects are on.

use super::controls::update_controls;
use super::state::HallState;
use crate::consts::*;

/// Inputs sampled by the frame callback
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Wall-clock milliseconds (`Date.now()` in the browser)
    pub now_ms: f64,
}

/// Vertical seat offset at a point in time. Stateless in `(now_ms, index)`, so
/// bobbing resumes in phase after effects are toggled back on.
#[inline]
pub fn seat_bob_offset(now_ms: f64, index: usize) -> f32 {
    ((now_ms * SEAT_BOB_RATE + index as f64).sin() as f32) * SEAT_BOB_AMPLITUDE
}

/// Advance the hall by one frame
pub fn tick(state: &mut HallState, input: &FrameInput) {
    update_controls(&mut state.camera, &state.intent, state.move_speed);

    if state.effects_on {
        for fan in &mut state.fans {
            fan.blade_angle += FAN_SPIN_PER_FRAME;
        }
        for seat in &mut state.seats {
            seat.bob_offset = seat_bob_offset(input.now_ms, seat.index);
        }
    }

    state.frame_count += 1;
    log::trace!(
        "frame {} camera ({:.2}, {:.2}, {:.2})",
        state.frame_count,
        state.camera.position.x,
        state.camera.position.y,
        state.camera.position.z
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    fn frame(ms: f64) -> FrameInput {
        FrameInput { now_ms: ms }
    }

    #[test]
    fn test_fan_angle_increases_while_on() {
        let mut state = HallState::new(&Settings::default());
        let mut last = state.fans[0].blade_angle;
        for i in 0..10 {
            tick(&mut state, &frame(i as f64 * 16.0));
            let angle = state.fans[0].blade_angle;
            assert!(angle > last);
            last = angle;
        }
        assert!((last - 10.0 * FAN_SPIN_PER_FRAME).abs() < 1e-9);
    }

    #[test]
    fn test_fan_angle_keeps_increasing_after_long_run() {
        let mut state = HallState::new(&Settings::default());
        // Roughly 97 hours of spinning at 60 Hz
        state.fans[0].blade_angle = 4_194_304.0;
        let mut last = state.fans[0].blade_angle;
        for i in 0..3 {
            tick(&mut state, &frame(i as f64 * 16.0));
            let angle = state.fans[0].blade_angle;
            assert!(angle > last, "{angle} <= {last}");
            last = angle;
        }

        let far = state.fans[0].clone();
        let mut near = far.clone();
        near.blade_angle = far.blade_angle.rem_euclid(std::f64::consts::TAU);
        let diff = far.blades_transform().transform_vector3(glam::Vec3::X)
            - near.blades_transform().transform_vector3(glam::Vec3::X);
        assert!(diff.length() < 1e-4);
    }

    #[test]
    fn test_effects_off_freezes_cosmetics() {
        let mut state = HallState::new(&Settings::default());
        tick(&mut state, &frame(1000.0));
        state.toggle_effects();

        let angles: Vec<f64> = state.fans.iter().map(|f| f.blade_angle).collect();
        let offsets: Vec<f32> = state.seats.iter().map(|s| s.bob_offset).collect();
        for i in 0..5 {
            tick(&mut state, &frame(2000.0 + i as f64 * 16.0));
        }

        assert_eq!(angles, state.fans.iter().map(|f| f.blade_angle).collect::<Vec<_>>());
        assert_eq!(offsets, state.seats.iter().map(|s| s.bob_offset).collect::<Vec<_>>());
    }

    #[test]
    fn test_bob_resumes_at_closed_form() {
        let mut state = HallState::new(&Settings::default());
        tick(&mut state, &frame(500.0));
        state.toggle_effects();
        tick(&mut state, &frame(1500.0));
        state.toggle_effects();
        tick(&mut state, &frame(9000.0));

        for seat in &state.seats {
            assert_eq!(seat.bob_offset, seat_bob_offset(9000.0, seat.index));
            let y = seat.position().y;
            assert!((y - (crate::hall::row_height(seat.row) + seat.bob_offset)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bob_amplitude() {
        for i in 0..SEAT_COUNT {
            for ms in [0.0, 123.0, 98_765.0, 1.7e12] {
                assert!(seat_bob_offset(ms, i).abs() <= SEAT_BOB_AMPLITUDE + 1e-6);
            }
        }
        assert_eq!(seat_bob_offset(0.0, 0), 0.0);
    }

    #[test]
    fn test_movement_applies_with_effects_off() {
        let mut state = HallState::new(&Settings {
            effects_on_start: false,
            ..Settings::default()
        });
        state.intent.apply_key("KeyW", true);
        let z = state.camera.position.z;
        tick(&mut state, &frame(0.0));
        assert!(state.camera.position.z < z);
        assert_eq!(state.frame_count, 1);
    }
}
