//! Closed-form hall layout
//!
//! Seats sit on a row/column grid that rises toward the back of the room.
//! Floor strips, walls and fans are placed with offsets derived from the same
//! constants so abutting surfaces share edges.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat3, Quat, Vec2, Vec3};

use super::materials::{Material, TextureSlot, colors};
use crate::consts::*;

/// An axis-aligned box in its parent's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPart {
    pub center: Vec3,
    pub size: Vec3,
}

impl BoxPart {
    pub const fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size / 2.0
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size / 2.0
    }
}

/// Seat parts in seat-local space: base, back, left arm, right arm
pub const SEAT_PARTS: [BoxPart; 4] = [
    BoxPart::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.3, 1.0)),
    BoxPart::new(Vec3::new(0.0, 0.45, -0.4), Vec3::new(1.0, 0.6, 0.2)),
    BoxPart::new(Vec3::new(-0.55, 0.15, -0.2), Vec3::new(0.1, 0.4, 0.6)),
    BoxPart::new(Vec3::new(0.55, 0.15, -0.2), Vec3::new(0.1, 0.4, 0.6)),
];

/// Seats are built facing +Z and turned around to face the screen
pub const SEAT_YAW: f32 = PI;

/// Fan housing: a cylinder whose axis points out of the wall
pub const FAN_HOUSING_RADIUS: f32 = 0.25;
pub const FAN_HOUSING_DEPTH: f32 = 0.15;
/// Blade box, repeated at quarter turns around the fan axis
pub const FAN_BLADE_SIZE: Vec3 = Vec3::new(0.6, 0.04, 0.08);
pub const FAN_BLADE_COUNT: usize = 4;

/// Base floor slab in front of the seating
const BASE_FLOOR_DEPTH: f32 = 15.0;
const BASE_FLOOR_Z: f32 = -5.0;
/// Floor and strip planes overhang the side walls slightly
const FLOOR_OVERHANG: f32 = 0.5;
const SCREEN_FRAME_OFFSET: f32 = 0.05;
/// Fans are shifted along the side wall from their nominal slot
const FAN_Z_SHIFT: f32 = 8.5;

#[inline]
pub fn seat_index(row: usize, col: usize) -> usize {
    row * SEATS_PER_ROW + col
}

#[inline]
pub fn seat_row_col(index: usize) -> (usize, usize) {
    (index / SEATS_PER_ROW, index % SEATS_PER_ROW)
}

/// Base height of every seat in a row
#[inline]
pub fn row_height(row: usize) -> f32 {
    SEAT_BASE_Y + row as f32 * ROW_HEIGHT_INCREMENT
}

/// Depth of a row's seat centers and floor strip center
#[inline]
pub fn row_z(row: usize) -> f32 {
    FIRST_ROW_Z + row as f32 * SEAT_SPACING_Z
}

/// X offset of a column, centered on the room axis
#[inline]
pub fn column_offset(col: usize) -> f32 {
    (col as f32 - (SEATS_PER_ROW - 1) as f32 / 2.0) * SEAT_SPACING_X
}

/// Resting world position of a seat
pub fn seat_position(index: usize) -> Vec3 {
    let (row, col) = seat_row_col(index);
    Vec3::new(column_offset(col), row_height(row), row_z(row))
}

/// Height of the floor strip under a row
#[inline]
pub fn floor_strip_y(row: usize) -> f32 {
    FLOOR_BASE_Y + row as f32 * ROW_HEIGHT_INCREMENT
}

/// Rotation whose +Z axis points along `forward`, keeping `up` on top
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Back,
    Front,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    FloorStrip(usize),
    BaseFloor,
    Screen,
    ScreenFrame,
    Wall(WallSide),
}

/// A static flat rectangle. Local plane is XY facing +Z, sized `size`.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub center: Vec3,
    pub size: Vec2,
    pub rotation: Quat,
    pub material: Material,
}

impl Surface {
    /// Direction the front face points
    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// World-space corners of the rectangle
    pub fn corners(&self) -> [Vec3; 4] {
        let half = self.size / 2.0;
        [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|c| self.center + self.rotation * c.extend(0.0))
    }
}

/// All static surfaces: floor strips (one per row) first, then base floor,
/// screen, screen frame and the four walls
pub fn surfaces() -> Vec<Surface> {
    let flat = Quat::from_rotation_x(-FRAC_PI_2);
    let floor = Material::solid(colors::FLOOR).double_sided();
    let wall = Material::solid(colors::WALL)
        .textured(TextureSlot::Wall, Vec2::splat(6.0))
        .double_sided();
    let floor_width = CINEMA_WIDTH + FLOOR_OVERHANG;

    let strip_repeat = Vec2::new(
        SEATS_PER_ROW as f32 * SEAT_SPACING_X / 2.0,
        (NUM_ROWS as f32 * SEAT_SPACING_Z + 4.0) / 2.0,
    );

    let mut out: Vec<Surface> = (0..NUM_ROWS)
        .map(|row| Surface {
            kind: SurfaceKind::FloorStrip(row),
            center: Vec3::new(0.0, floor_strip_y(row), row_z(row)),
            size: Vec2::new(floor_width, SEAT_SPACING_Z),
            rotation: flat,
            material: floor.textured(TextureSlot::Floor, strip_repeat),
        })
        .collect();

    out.push(Surface {
        kind: SurfaceKind::BaseFloor,
        center: Vec3::new(0.0, FLOOR_BASE_Y, BASE_FLOOR_Z),
        size: Vec2::new(floor_width, BASE_FLOOR_DEPTH),
        rotation: flat,
        material: floor.textured(TextureSlot::Floor, Vec2::new(3.0, 2.0)),
    });

    let screen_center = Vec3::new(0.0, SCREEN_Y, SCREEN_Z);
    out.push(Surface {
        kind: SurfaceKind::Screen,
        center: screen_center,
        size: Vec2::new(CINEMA_WIDTH - 2.0, CINEMA_HEIGHT),
        rotation: Quat::IDENTITY,
        material: Material::solid(colors::SCREEN).textured(TextureSlot::Screen, Vec2::ONE),
    });
    out.push(Surface {
        kind: SurfaceKind::ScreenFrame,
        center: screen_center - Vec3::Z * SCREEN_FRAME_OFFSET,
        size: Vec2::new(CINEMA_WIDTH - 1.0, CINEMA_HEIGHT + 1.0),
        rotation: Quat::IDENTITY,
        material: Material::solid(colors::SCREEN_FRAME).double_sided(),
    });

    let wall_y = CINEMA_HEIGHT / 2.0;
    let side_z = (FRONT_WALL_Z + BACK_WALL_Z) / 2.0;
    let walls = [
        (WallSide::Back, Vec3::new(0.0, wall_y, BACK_WALL_Z), CINEMA_WIDTH, 0.0),
        (WallSide::Front, Vec3::new(0.0, wall_y, FRONT_WALL_Z), CINEMA_WIDTH, PI),
        (WallSide::Left, Vec3::new(-CINEMA_WIDTH / 2.0, wall_y, side_z), SIDE_WALL_LENGTH, FRAC_PI_2),
        (WallSide::Right, Vec3::new(CINEMA_WIDTH / 2.0, wall_y, side_z), SIDE_WALL_LENGTH, -FRAC_PI_2),
    ];
    out.extend(walls.into_iter().map(|(side, center, width, yaw)| Surface {
        kind: SurfaceKind::Wall(side),
        center,
        size: Vec2::new(width, WALL_HEIGHT),
        rotation: Quat::from_rotation_y(yaw),
        material: wall,
    }));

    out
}

/// Where a fan hangs and which way it faces (into the room)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanMount {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Fan mounts: the left wall's fans first, then the right wall's
pub fn fan_mounts() -> Vec<FanMount> {
    let sides = [
        (-CINEMA_WIDTH / 2.0 + FAN_WALL_INSET, Vec3::X),
        (CINEMA_WIDTH / 2.0 - FAN_WALL_INSET, Vec3::NEG_X),
    ];

    sides
        .into_iter()
        .flat_map(|(x, normal)| {
            (0..FANS_PER_WALL).map(move |i| {
                let t = i as f32 / (FANS_PER_WALL - 1) as f32;
                let z = BACK_WALL_Z + t * (CINEMA_DEPTH - 2.0) + FAN_Z_SHIFT;
                let y = 2.0 + (i % 3) as f32 * 1.5;
                FanMount {
                    position: Vec3::new(x, y, z),
                    normal,
                }
            })
        })
        .collect()
}
