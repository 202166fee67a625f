//! HUD values
//!
//! The DOM side only copies these strings into `.hud-value` elements.

use crate::hall::HallState;

/// Frames averaged for the FPS readout
const FPS_WINDOW: usize = 60;

/// Frames-per-second from a ring of frame timestamps
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    /// Record a frame at `time_ms` (monotonic) and return the current estimate
    pub fn record(&mut self, time_ms: f64) -> u32 {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest sample is the next slot to be overwritten
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Text for each HUD field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudText {
    pub fps: Option<String>,
    pub effects: String,
    pub picked: String,
}

impl HudText {
    pub fn new(state: &HallState, fps: u32, show_fps: bool) -> Self {
        Self {
            fps: show_fps.then(|| fps.to_string()),
            effects: if state.effects_on { "On" } else { "Off" }.to_string(),
            picked: state.highlighted_count().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    #[test]
    fn test_fps_at_60hz() {
        let mut counter = FpsCounter::default();
        let mut fps = 0;
        for i in 1..=200 {
            fps = counter.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps, 60);
        assert_eq!(counter.fps(), 60);
    }

    #[test]
    fn test_fps_zero_until_window_fills() {
        let mut counter = FpsCounter::default();
        for i in 1..FPS_WINDOW {
            assert_eq!(counter.record(i as f64 * 16.0), 0);
        }
    }

    #[test]
    fn test_hud_text() {
        let mut state = HallState::new(&Settings::default());
        state.seats[3].highlight = Some(crate::consts::PICK_HIGHLIGHT);

        let hud = HudText::new(&state, 59, true);
        assert_eq!(hud.fps.as_deref(), Some("59"));
        assert_eq!(hud.effects, "On");
        assert_eq!(hud.picked, "1");

        state.toggle_effects();
        let hud = HudText::new(&state, 59, false);
        assert_eq!(hud.fps, None);
        assert_eq!(hud.effects, "Off");
    }
}
