//! Hall state
//!
//! Built once at startup. Seats and fans are addressed by index for the rest of
//! the program; only their cosmetic fields change.

use glam::{Mat4, Quat, Vec3};

use super::camera::{CAMERA_START, FirstPersonCamera};
use super::controls::MoveIntent;
use super::layout::{self, SEAT_YAW, Surface};
use super::materials::{Lighting, Material, colors};
use crate::Settings;
use crate::consts::*;

/// Shared seat material; a pick overrides only the color
pub const SEAT_MATERIAL: Material = Material::solid(colors::SEAT).pbr(0.4, 0.3);

#[derive(Debug, Clone)]
pub struct Seat {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    /// Resting position
    pub base: Vec3,
    /// Vertical bob added to `base.y`
    pub bob_offset: f32,
    /// Color set by picking
    pub highlight: Option<u32>,
}

impl Seat {
    pub fn new(index: usize) -> Self {
        let (row, col) = layout::seat_row_col(index);
        Self {
            index,
            row,
            col,
            base: layout::seat_position(index),
            bob_offset: 0.0,
            highlight: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.base + Vec3::Y * self.bob_offset
    }

    /// Seat-local to world
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(SEAT_YAW), self.position())
    }

    pub fn material(&self) -> Material {
        match self.highlight {
            Some(color) => SEAT_MATERIAL.with_color(color),
            None => SEAT_MATERIAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fan {
    pub position: Vec3,
    /// Points into the room
    pub normal: Vec3,
    /// Accumulated blade spin around the fan axis (radians)
    pub blade_angle: f64,
}

impl Fan {
    pub fn new(mount: layout::FanMount) -> Self {
        Self {
            position: mount.position,
            normal: mount.normal,
            blade_angle: 0.0,
        }
    }

    /// Fan-local to world. Local +Z is the fan axis.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            layout::look_rotation(self.normal, Vec3::Y),
            self.position,
        )
    }

    /// Transform of the spinning blade assembly
    pub fn blades_transform(&self) -> Mat4 {
        let angle = self.blade_angle.rem_euclid(std::f64::consts::TAU) as f32;
        self.transform() * Mat4::from_rotation_z(angle)
    }
}

/// Everything the frame loop and event handlers share
#[derive(Debug, Clone)]
pub struct HallState {
    pub seats: Vec<Seat>,
    pub fans: Vec<Fan>,
    pub surfaces: Vec<Surface>,
    pub lighting: Lighting,
    pub camera: FirstPersonCamera,
    pub intent: MoveIntent,
    pub effects_on: bool,
    /// World units per frame
    pub move_speed: f32,
    /// Look sensitivity multiplier
    pub pointer_speed: f32,
    /// Radial segments of the fan housing mesh
    pub fan_segments: u32,
    pub frame_count: u64,
}

impl HallState {
    pub fn new(settings: &Settings) -> Self {
        let seats: Vec<Seat> = (0..SEAT_COUNT).map(Seat::new).collect();
        let fans: Vec<Fan> = layout::fan_mounts().into_iter().map(Fan::new).collect();
        let surfaces = layout::surfaces();

        log::info!(
            "Built hall: {} seats, {} fans, {} surfaces",
            seats.len(),
            fans.len(),
            surfaces.len()
        );

        Self {
            seats,
            fans,
            surfaces,
            lighting: Lighting::default(),
            camera: FirstPersonCamera::new(CAMERA_START, settings.fov_degrees, 16.0 / 9.0),
            intent: MoveIntent::default(),
            effects_on: settings.effects_on_start,
            move_speed: settings.move_speed,
            pointer_speed: settings.pointer_speed,
            fan_segments: settings.quality.fan_segments(),
            frame_count: 0,
        }
    }

    /// Flip the effects flag and return the new value
    pub fn toggle_effects(&mut self) -> bool {
        self.effects_on = !self.effects_on;
        log::info!("Effects {}", if self.effects_on { "on" } else { "off" });
        self.effects_on
    }

    /// Apply relative pointer movement while the pointer is locked
    pub fn look(&mut self, movement_x: f32, movement_y: f32) {
        self.camera.rotate_by_pointer(
            movement_x,
            movement_y,
            LOOK_RADIANS_PER_PIXEL * self.pointer_speed,
        );
    }

    pub fn highlighted_count(&self) -> usize {
        self.seats.iter().filter(|s| s.highlight.is_some()).count()
    }
}
