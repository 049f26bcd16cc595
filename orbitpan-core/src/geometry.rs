/// Mesh primitives shared by picking and rendering
use nalgebra::{Point3, Vector3};

use crate::ray::Sphere;

/// A mesh vertex with position and normal in the mesh's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a flat-shaded triangle from three positions.
    pub fn from_positions(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = face_normal(&a, &b, &c);
        Self::new(
            Vertex::new(a, normal),
            Vertex::new(b, normal),
            Vertex::new(c, normal),
        )
    }

    pub fn positions(&self) -> [Point3<f32>; 3] {
        [
            self.vertices[0].position,
            self.vertices[1].position,
            self.vertices[2].position,
        ]
    }

    /// Face normal from the winding order. Zero for degenerate faces.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [a, b, c] = self.positions();
        face_normal(&a, &b, &c)
    }
}

pub(crate) fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// A triangle soup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.triangles
            .iter()
            .flat_map(|triangle| triangle.vertices.iter().map(|vertex| vertex.position))
    }

    /// Sphere enclosing every vertex, centered on the axis-aligned bounds.
    ///
    /// An empty mesh yields a zero-radius sphere at the origin.
    pub fn bounding_sphere(&self) -> Sphere {
        let mut positions = self.positions();
        let Some(first) = positions.next() else {
            return Sphere::new(Point3::origin(), 0.0);
        };

        let (min, max) = positions.fold((first.coords, first.coords), |(min, max), p| {
            (min.inf(&p.coords), max.sup(&p.coords))
        });
        let center = Point3::from((min + max) * 0.5);
        let radius = self
            .positions()
            .map(|p| nalgebra::distance(&center, &p))
            .fold(0.0_f32, f32::max);

        Sphere::new(center, radius)
    }

    /// Axis-aligned cube of edge `size` centered on the origin.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // Each face: outward normal plus the two in-plane axes, chosen so
        // that `u x v == normal` and the winding is counter-clockwise.
        let faces = [
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
        ];

        let mut mesh = Self::with_capacity(faces.len() * 2);
        for (normal, u, v) in faces {
            let center = Point3::from(normal * h);
            let corner = |su: f32, sv: f32| center + u * (su * h) + v * (sv * h);
            let quad = [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ];
            let vertex = |p: Point3<f32>| Vertex::new(p, normal);
            mesh.add_triangle(Triangle::new(vertex(quad[0]), vertex(quad[1]), vertex(quad[2])));
            mesh.add_triangle(Triangle::new(vertex(quad[0]), vertex(quad[2]), vertex(quad[3])));
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_winding_matches_normals() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            assert_relative_eq!(
                triangle.calculate_normal(),
                triangle.vertices[0].normal,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_cube_bounding_sphere() {
        let sphere = Mesh::cube(2.0).bounding_sphere();
        assert_relative_eq!(sphere.center, Point3::origin(), epsilon = 1e-6);
        assert_relative_eq!(sphere.radius, 3.0_f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_bounding_sphere_of_offset_mesh() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::from_positions(
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
        ));
        let sphere = mesh.bounding_sphere();
        assert_relative_eq!(sphere.center, Point3::new(3.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(sphere.radius, 2.0_f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_mesh_bounding_sphere() {
        let sphere = Mesh::new().bounding_sphere();
        assert_eq!(sphere.radius, 0.0);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::from_positions(p, p, p);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
