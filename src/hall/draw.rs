//! Flatten the hall into primitive draws
//!
//! Every draw is a unit mesh placed by a model matrix:
//! - `Plane`: 1x1 in local XY, facing +Z
//! - `Cube`: 1x1x1 centered on the origin
//! - `Cylinder`: radius 1, height 1 along local Y

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};

use super::layout::{FAN_BLADE_COUNT, FAN_BLADE_SIZE, FAN_HOUSING_DEPTH, FAN_HOUSING_RADIUS, SEAT_PARTS};
use super::materials::{Material, colors};
use super::state::HallState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    Plane,
    Cylinder,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub mesh: MeshKind,
    pub model: Mat4,
    pub material: Material,
}

const FAN_HOUSING: Material = Material::solid(colors::FAN_HOUSING);
const FAN_BLADE: Material = Material::solid(colors::FAN_BLADE);

/// Draws for the current frame: surfaces, then seats, then fans
pub fn draw_list(state: &HallState) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(
        state.surfaces.len()
            + state.seats.len() * SEAT_PARTS.len()
            + state.fans.len() * (1 + FAN_BLADE_COUNT),
    );

    items.extend(state.surfaces.iter().map(|s| DrawItem {
        mesh: MeshKind::Plane,
        model: Mat4::from_scale_rotation_translation(s.size.extend(1.0), s.rotation, s.center),
        material: s.material,
    }));

    for seat in &state.seats {
        let seat_model = seat.transform();
        let material = seat.material();
        items.extend(SEAT_PARTS.iter().map(|part| DrawItem {
            mesh: MeshKind::Cube,
            model: seat_model * Mat4::from_translation(part.center) * Mat4::from_scale(part.size),
            material,
        }));
    }

    let housing_scale = Vec3::new(FAN_HOUSING_RADIUS, FAN_HOUSING_DEPTH, FAN_HOUSING_RADIUS);
    for fan in &state.fans {
        items.push(DrawItem {
            mesh: MeshKind::Cylinder,
            model: fan.transform() * Mat4::from_rotation_x(FRAC_PI_2) * Mat4::from_scale(housing_scale),
            material: FAN_HOUSING,
        });

        let blades = fan.blades_transform();
        items.extend((0..FAN_BLADE_COUNT).map(|i| DrawItem {
            mesh: MeshKind::Cube,
            model: blades
                * Mat4::from_rotation_z(i as f32 * PI / 2.0)
                * Mat4::from_scale(FAN_BLADE_SIZE),
            material: FAN_BLADE,
        }));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::consts::*;

    #[test]
    fn test_draw_counts() {
        let state = HallState::new(&Settings::default());
        let items = draw_list(&state);

        let count = |kind| items.iter().filter(|i| i.mesh == kind).count();
        assert_eq!(count(MeshKind::Plane), NUM_ROWS + 7);
        assert_eq!(count(MeshKind::Cylinder), FANS_PER_WALL * 2);
        assert_eq!(
            count(MeshKind::Cube),
            SEAT_COUNT * SEAT_PARTS.len() + FANS_PER_WALL * 2 * FAN_BLADE_COUNT
        );
    }

    #[test]
    fn test_highlight_reaches_draws() {
        let mut state = HallState::new(&Settings::default());
        state.seats[7].highlight = Some(PICK_HIGHLIGHT);
        let items = draw_list(&state);

        let seat_draws = &items[state.surfaces.len()..][..SEAT_COUNT * SEAT_PARTS.len()];
        let red = seat_draws.iter().filter(|i| i.material.color == PICK_HIGHLIGHT).count();
        assert_eq!(red, SEAT_PARTS.len());
        assert!(seat_draws[7 * SEAT_PARTS.len()..][..SEAT_PARTS.len()]
            .iter()
            .all(|i| i.material.color == PICK_HIGHLIGHT));
    }

    #[test]
    fn test_housing_axis_along_wall_normal() {
        let state = HallState::new(&Settings::default());
        let items = draw_list(&state);
        let housings: Vec<&DrawItem> = items.iter().filter(|i| i.mesh == MeshKind::Cylinder).collect();

        for (fan, item) in state.fans.iter().zip(housings) {
            // Cylinder height runs along local Y
            let axis = item.model.transform_vector3(Vec3::Y);
            assert!((axis.normalize() - fan.normal).length() < 1e-4);
            assert!((axis.length() - FAN_HOUSING_DEPTH).abs() < 1e-4);
        }
    }

    #[test]
    fn test_blades_spin_with_fan() {
        let mut state = HallState::new(&Settings::default());
        let before = draw_list(&state);
        state.fans[0].blade_angle += 0.5;
        let after = draw_list(&state);

        let first_blade = |items: &[DrawItem]| {
            items
                .iter()
                .find(|i| i.mesh == MeshKind::Cube && i.material.color == colors::FAN_BLADE)
                .map(|i| i.model.transform_vector3(Vec3::X))
                .unwrap()
        };
        assert!((first_blade(&before) - first_blade(&after)).length() > 0.1);
    }
}
