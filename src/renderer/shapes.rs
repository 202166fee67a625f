//! Unit meshes for the hall's primitives
//!
//! All triangles wind counter-clockwise seen from the side their normal points to.

use std::f32::consts::TAU;

use glam::Vec3;

use super::vertex::Vertex;

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Append a flat quad centered at `center` spanning `u` and `v`.
    /// The face normal is `u x v`.
    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3) {
        let base = self.vertices.len() as u16;
        let normal = u.cross(v).normalize().to_array();
        for (s, t) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let p = center + u * (s - 0.5) + v * (t - 0.5);
            // Texture rows run top to bottom
            self.vertices.push(Vertex::new(p.to_array(), normal, [s, 1.0 - t]));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// 1x1 plane in local XY, facing +Z
pub fn plane() -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_quad(Vec3::ZERO, Vec3::X, Vec3::Y);
    mesh
}

/// 1x1x1 cube centered on the origin
pub fn cube() -> Mesh {
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = Mesh::default();
    for (normal, u, v) in faces {
        mesh.push_quad(normal * 0.5, u, v);
    }
    mesh
}

/// Capped cylinder of radius 1 and height 1 along Y, centered on the origin
pub fn cylinder(segments: u32) -> Mesh {
    let segments = segments.max(3);
    let ring = |i: u32| {
        let theta = i as f32 / segments as f32 * TAU;
        (theta.sin(), theta.cos())
    };

    let mut mesh = Mesh::default();

    // Side: bottom/top vertex pairs, seam duplicated for UVs
    for i in 0..=segments {
        let (x, z) = ring(i);
        let u = i as f32 / segments as f32;
        mesh.vertices.push(Vertex::new([x, -0.5, z], [x, 0.0, z], [u, 1.0]));
        mesh.vertices.push(Vertex::new([x, 0.5, z], [x, 0.0, z], [u, 0.0]));
    }
    for i in 0..segments as u16 {
        let b0 = i * 2;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        mesh.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
    }

    // Caps
    for (y, normal) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
        let center = mesh.vertices.len() as u16;
        mesh.vertices
            .push(Vertex::new([0.0, y, 0.0], [0.0, normal, 0.0], [0.5, 0.5]));
        for i in 0..=segments {
            let (x, z) = ring(i);
            mesh.vertices.push(Vertex::new(
                [x, y, z],
                [0.0, normal, 0.0],
                [x * 0.5 + 0.5, z * 0.5 + 0.5],
            ));
        }
        for i in 0..segments as u16 {
            let a = center + 1 + i;
            let b = a + 1;
            if normal > 0.0 {
                mesh.indices.extend_from_slice(&[center, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's winding agrees with its vertices' normals
    fn assert_outward_winding(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let pa = Vec3::from_array(a.position);
            let face = (Vec3::from_array(b.position) - pa).cross(Vec3::from_array(c.position) - pa);
            let normal = Vec3::from_array(a.normal);
            assert!(face.dot(normal) > 0.0, "triangle {:?} winds inward", tri);
        }
    }

    #[test]
    fn test_plane() {
        let mesh = plane();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_outward_winding(&mesh);
    }

    #[test]
    fn test_cube() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn test_cylinder() {
        let segments = 24;
        let mesh = cylinder(segments);
        let n = segments as usize;
        assert_eq!(mesh.vertices.len(), 4 * (n + 1) + 2);
        assert_eq!(mesh.triangle_count(), 4 * n);
        for v in &mesh.vertices {
            let r = Vec3::new(v.position[0], 0.0, v.position[2]).length();
            assert!(r <= 1.0 + 1e-5);
            assert!((v.position[1].abs() - 0.5).abs() < 1e-6);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn test_cylinder_minimum_segments() {
        assert_eq!(cylinder(0).triangle_count(), 12);
    }
}
