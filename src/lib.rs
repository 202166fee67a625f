//! Cinema Hall - a walk-through diorama of a small movie theater
//!
//! Core modules:
//! - `hall`: Layout, controls, per-frame animation and seat picking (no GPU)
//! - `renderer`: WebGPU rendering pipeline
//! - `assets`: Texture decoding and browser fetch
//! - `hud`: FPS counter and HUD text
//! - `settings`: Viewer configuration

pub mod assets;
pub mod error;
pub mod hall;
pub mod hud;
pub mod renderer;
pub mod settings;

pub use error::{AssetError, RenderInitError, SettingsError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Hall layout constants
pub mod consts {
    /// Seating grid
    pub const NUM_ROWS: usize = 8;
    pub const SEATS_PER_ROW: usize = 10;
    pub const SEAT_COUNT: usize = NUM_ROWS * SEATS_PER_ROW;
    pub const SEAT_SPACING_X: f32 = 1.2;
    pub const SEAT_SPACING_Z: f32 = 1.4;

    /// Stadium rake: each row sits this much higher than the one in front
    pub const ROW_HEIGHT_INCREMENT: f32 = 0.15;
    /// Seat group origin height for row 0
    pub const SEAT_BASE_Y: f32 = -0.7;
    /// Depth of row 0 (rows grow toward +Z, away from the screen)
    pub const FIRST_ROW_Z: f32 = 2.0;
    /// Floor height under row 0
    pub const FLOOR_BASE_Y: f32 = -1.0;

    /// Room dimensions
    pub const CINEMA_WIDTH: f32 = SEATS_PER_ROW as f32 * SEAT_SPACING_X + 4.0;
    pub const CINEMA_DEPTH: f32 = NUM_ROWS as f32 * SEAT_SPACING_Z + 6.0;
    pub const CINEMA_HEIGHT: f32 = 6.0;

    /// Wall planes
    pub const BACK_WALL_Z: f32 = -10.0;
    pub const FRONT_WALL_Z: f32 = NUM_ROWS as f32 * SEAT_SPACING_Z + 4.0;
    pub const WALL_HEIGHT: f32 = CINEMA_HEIGHT + 2.0;
    pub const SIDE_WALL_LENGTH: f32 = CINEMA_DEPTH + 8.5;

    /// Screen
    pub const SCREEN_Z: f32 = -9.9;
    pub const SCREEN_Y: f32 = 3.0;

    /// Fans
    pub const FANS_PER_WALL: usize = 6;
    /// Gap between a fan and the wall it hangs on
    pub const FAN_WALL_INSET: f32 = 0.3;
    /// Blade spin per frame while effects are on (radians)
    pub const FAN_SPIN_PER_FRAME: f64 = 0.2;

    /// Seat bob: offset = sin(now_ms * rate + index) * amplitude
    pub const SEAT_BOB_RATE: f64 = 0.002;
    pub const SEAT_BOB_AMPLITUDE: f32 = 0.05;

    /// Camera bounds margins
    pub const CAMERA_WALL_MARGIN: f32 = 0.5;
    pub const CAMERA_DEPTH_MARGIN: f32 = 1.5;
    pub const CAMERA_MIN_Y: f32 = 1.0;
    pub const CAMERA_MAX_Y: f32 = CINEMA_HEIGHT - 1.0;

    /// Radians of look per pixel of pointer movement at pointer_speed 1.0
    pub const LOOK_RADIANS_PER_PIXEL: f32 = 0.002;

    /// Highlight applied to a picked seat
    pub const PICK_HIGHLIGHT: u32 = 0xff0000;
}

/// Convert an sRGB hex color (0xRRGGBB) to linear RGB
#[inline]
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

/// Convert a pixel position on a viewport to normalized device coordinates
///
/// NDC is [-1, 1] on both axes with +Y pointing up.
#[inline]
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_dimensions() {
        assert!((consts::CINEMA_WIDTH - 16.0).abs() < 1e-5);
        assert!((consts::CINEMA_DEPTH - 17.2).abs() < 1e-5);
        assert!((consts::FRONT_WALL_Z - 15.2).abs() < 1e-5);
    }

    #[test]
    fn test_screen_to_ndc() {
        let center = screen_to_ndc(400.0, 300.0, 800.0, 600.0);
        assert!(center.length() < 1e-6);

        let top_left = screen_to_ndc(0.0, 0.0, 800.0, 600.0);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = screen_to_ndc(800.0, 600.0, 800.0, 600.0);
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_srgb_hex_to_linear() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let white = srgb_hex_to_linear(0xffffff);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
        let red = srgb_hex_to_linear(0xff0000);
        assert_eq!(red[1], 0.0);
        assert!((red[0] - 1.0).abs() < 1e-6);
        // Mid grey is darker in linear space
        let grey = srgb_hex_to_linear(0x808080);
        assert!(grey[0] > 0.2 && grey[0] < 0.23);
    }
}
