//! Seat picking
//!
//! Rays are tested against the seat parts in each seat's local space, which
//! keeps the boxes axis-aligned. Seat transforms are rigid, so a distance along
//! the local ray is the same distance in world space.

use glam::{Vec2, Vec3};

use super::layout::SEAT_PARTS;
use super::state::{HallState, Seat};
use crate::consts::PICK_HIGHLIGHT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Slab test. Returns the entry distance, or `None` when the box is missed,
    /// lies behind the ray, or contains the ray origin (front faces only).
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray.direction.x != 0.0 { 1.0 / ray.direction.x } else { f32::INFINITY },
            if ray.direction.y != 0.0 { 1.0 / ray.direction.y } else { f32::INFINITY },
            if ray.direction.z != 0.0 { 1.0 / ray.direction.z } else { f32::INFINITY },
        );

        let t1 = (self.min - ray.origin) * inv_dir;
        let t2 = (self.max - ray.origin) * inv_dir;

        // NaN from 0 * inf means the origin sits on a slab plane of a parallel axis
        let lo = t1.min(t2);
        let hi = t1.max(t2);
        if lo.is_nan() || hi.is_nan() {
            return None;
        }

        let tmin = lo.max_element();
        let tmax = hi.min_element();

        if tmax >= tmin && tmin >= 0.0 {
            Some(tmin)
        } else {
            None
        }
    }
}

/// Nearest seat along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatHit {
    pub seat: usize,
    pub distance: f32,
    pub point: Vec3,
}

/// Distance along `ray` to the nearest part of `seat`
fn intersect_seat(seat: &Seat, ray: &Ray) -> Option<f32> {
    let to_local = seat.transform().inverse();
    let local = Ray {
        origin: to_local.transform_point3(ray.origin),
        direction: to_local.transform_vector3(ray.direction),
    };

    SEAT_PARTS
        .iter()
        .filter_map(|part| Aabb::new(part.min(), part.max()).intersect_ray(&local))
        .min_by(|a, b| a.total_cmp(b))
}

/// Find the nearest seat hit by a ray, if any
pub fn raycast_seats(seats: &[Seat], ray: &Ray) -> Option<SeatHit> {
    seats
        .iter()
        .filter_map(|seat| {
            intersect_seat(seat, ray).map(|distance| SeatHit {
                seat: seat.index,
                distance,
                point: ray.point_at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Cast a ray from the camera through `ndc` and highlight the nearest seat
pub fn pick_seat(state: &mut HallState, ndc: Vec2) -> Option<SeatHit> {
    let ray = state.camera.ray_through_ndc(ndc);
    let hit = raycast_seats(&state.seats, &ray)?;

    if let Some(seat) = state.seats.get_mut(hit.seat) {
        seat.highlight = Some(PICK_HIGHLIGHT);
    }
    log::debug!(
        "Picked seat {} at distance {:.2} ({:.2}, {:.2}, {:.2})",
        hit.seat,
        hit.distance,
        hit.point.x,
        hit.point.y,
        hit.point.z
    );

    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::hall::layout::seat_position;

    #[test]
    fn test_aabb_hit_from_outside() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = aabb.intersect_ray(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!((ray.point_at(t) - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_aabb_miss_and_behind() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let beside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(aabb.intersect_ray(&beside).is_none());

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(aabb.intersect_ray(&away).is_none());
    }

    #[test]
    fn test_aabb_origin_inside_is_not_a_hit() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(aabb.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_straight_down_ray_hits_seat_42() {
        let state = HallState::new(&Settings::default());
        let center = seat_position(42);
        let ray = Ray::new(center + Vec3::Y * 5.0, Vec3::NEG_Y);

        let hit = raycast_seats(&state.seats, &ray).unwrap();
        assert_eq!(hit.seat, 42);
        // Top of the seat base
        assert!((hit.point.y - (center.y + 0.15)).abs() < 1e-4);
    }

    #[test]
    fn test_ray_between_rows_misses() {
        let state = HallState::new(&Settings::default());
        // Gap between the back of row 4 and the front of row 5
        let ray = Ray::new(Vec3::new(-3.0, 5.0, 8.3), Vec3::NEG_Y);
        assert!(raycast_seats(&state.seats, &ray).is_none());
    }

    #[test]
    fn test_pick_through_view_center_highlights_nearest() {
        let mut state = HallState::new(&Settings::default());
        state.camera.position = Vec3::new(-3.0, 3.0, 10.6);
        state.camera.look_toward(seat_position(42));

        let hit = pick_seat(&mut state, Vec2::ZERO).unwrap();
        assert_eq!(hit.seat, 42);
        assert_eq!(state.seats[42].highlight, Some(PICK_HIGHLIGHT));
        assert_eq!(state.highlighted_count(), 1);

        // Idempotent
        pick_seat(&mut state, Vec2::ZERO);
        assert_eq!(state.highlighted_count(), 1);
    }

    #[test]
    fn test_pick_into_empty_space_is_noop() {
        let mut state = HallState::new(&Settings::default());
        // Default camera looks at the screen, away from the seats
        assert!(pick_seat(&mut state, Vec2::ZERO).is_none());
        assert_eq!(state.highlighted_count(), 0);
    }
}
