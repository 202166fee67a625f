//! Cinema hall model
//!
//! Everything the viewer knows about the hall lives here, independent of the GPU:
//! - Closed-form layout of seats, floors, walls, screen and fans
//! - First-person camera and keyboard/pointer controls
//! - Per-frame cosmetic animation
//! - Seat picking

pub mod camera;
pub mod controls;
pub mod draw;
pub mod layout;
pub mod materials;
pub mod picking;
pub mod state;
pub mod tick;

pub use camera::FirstPersonCamera;
pub use controls::{MoveIntent, RoomBounds, is_effects_toggle, update_controls};
pub use draw::{DrawItem, MeshKind, draw_list};
pub use layout::{
    BoxPart, FanMount, Surface, SurfaceKind, WallSide, column_offset, row_height, row_z,
    seat_index, seat_position, seat_row_col,
};
pub use materials::{Lighting, Material, TextureSlot};
pub use picking::{Aabb, Ray, SeatHit, pick_seat, raycast_seats};
pub use state::{Fan, HallState, Seat};
pub use tick::{FrameInput, seat_bob_offset, tick};
