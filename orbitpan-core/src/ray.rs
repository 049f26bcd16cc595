/// Rays, planes and spheres with the intersection queries used for picking
use nalgebra::{Matrix4, Point3, Unit, Vector3};

use crate::geometry::Mesh;

/// Below this, a ray is considered parallel to a plane or triangle.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Barycentric slack so rays through a shared edge hit one of its faces.
const EDGE_TOLERANCE: f32 = 1e-5;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

/// An infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Plane {
    pub fn new(point: Point3<f32>, normal: Unit<Vector3<f32>>) -> Self {
        Self { point, normal }
    }
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Unit<Vector3<f32>>) -> Self {
        Self { origin, direction }
    }

    /// Ray from `origin` toward `through`. None when the two coincide.
    pub fn through(origin: Point3<f32>, through: Point3<f32>) -> Option<Self> {
        let direction = Unit::try_new(through - origin, f32::EPSILON)?;
        Some(Self::new(origin, direction))
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }

    pub fn intersect_plane(&self, plane: &Plane) -> Option<Point3<f32>> {
        let denom = plane.normal.dot(&*self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = plane.normal.dot(&(plane.point - self.origin)) / denom;
        (t >= 0.0 && t.is_finite()).then(|| self.at(t))
    }

    /// Nearest intersection in front of the origin. From inside the sphere
    /// this is the exit point.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<Point3<f32>> {
        let offset = self.origin - sphere.center;
        let b = offset.dot(&*self.direction);
        let c = offset.norm_squared() - sphere.radius * sphere.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        let t = if near >= 0.0 { near } else { far };
        (t >= 0.0 && t.is_finite()).then(|| self.at(t))
    }

    /// Möller–Trumbore. Returns the ray parameter of the hit.
    pub fn intersect_triangle(&self, a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = self.direction.dot(&q) * inv_det;
        if v < -EDGE_TOLERANCE || u + v > 1.0 + EDGE_TOLERANCE {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Nearest hit against `mesh` placed in the world by `local_to_world`.
    pub fn intersect_mesh(&self, mesh: &Mesh, local_to_world: &Matrix4<f32>) -> Option<Point3<f32>> {
        mesh.triangles
            .iter()
            .filter_map(|triangle| {
                let [a, b, c] = triangle.positions().map(|p| local_to_world.transform_point(&p));
                self.intersect_triangle(&a, &b, &c)
            })
            .min_by(f32::total_cmp)
            .map(|t| self.at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn down_z(origin: Point3<f32>) -> Ray {
        Ray::new(origin, Unit::new_normalize(-Vector3::z()))
    }

    #[test]
    fn test_plane_hit() {
        let ray = down_z(Point3::new(1.0, 2.0, 5.0));
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z_axis());
        let hit = ray.intersect_plane(&plane).unwrap();
        assert_relative_eq!(hit, Point3::new(1.0, 2.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        let parallel = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::x_axis());
        let plane = Plane::new(Point3::origin(), Vector3::z_axis());
        assert!(parallel.intersect_plane(&plane).is_none());

        let away = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::z_axis());
        assert!(away.intersect_plane(&plane).is_none());
    }

    #[test]
    fn test_sphere_near_hit() {
        let ray = down_z(Point3::new(0.0, 0.0, 5.0));
        let sphere = Sphere::new(Point3::origin(), 1.0);
        let hit = ray.intersect_sphere(&sphere).unwrap();
        assert_relative_eq!(hit, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_from_inside_hits_exit() {
        let ray = down_z(Point3::origin());
        let sphere = Sphere::new(Point3::origin(), 2.0);
        let hit = ray.intersect_sphere(&sphere).unwrap();
        assert_relative_eq!(hit, Point3::new(0.0, 0.0, -2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = down_z(Point3::new(3.0, 0.0, 5.0));
        assert!(ray.intersect_sphere(&Sphere::new(Point3::origin(), 1.0)).is_none());

        let behind = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::z_axis());
        assert!(behind.intersect_sphere(&Sphere::new(Point3::origin(), 1.0)).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let a = Point3::new(-1.0, -1.0, 0.0);
        let b = Point3::new(1.0, -1.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        let t = down_z(Point3::new(0.0, 0.0, 3.0)).intersect_triangle(&a, &b, &c);
        assert_relative_eq!(t.unwrap(), 3.0, epsilon = 1e-6);

        assert!(down_z(Point3::new(2.0, 0.0, 3.0))
            .intersect_triangle(&a, &b, &c)
            .is_none());
    }

    #[test]
    fn test_mesh_hit_on_shared_diagonal() {
        // (0, 0) lies exactly on the diagonal splitting the front face.
        let mesh = Mesh::cube(2.0);
        let hit = down_z(Point3::new(0.0, 0.0, 5.0))
            .intersect_mesh(&mesh, &Matrix4::identity())
            .unwrap();
        assert_relative_eq!(hit, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_mesh_hit_uses_world_transform() {
        let mesh = Mesh::cube(2.0);
        let model = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -3.0));
        let hit = down_z(Point3::new(0.5, 0.5, 5.0))
            .intersect_mesh(&mesh, &model)
            .unwrap();
        assert_relative_eq!(hit, Point3::new(0.5, 0.5, -2.0), epsilon = 1e-5);

        assert!(down_z(Point3::new(1.5, 0.0, 5.0))
            .intersect_mesh(&mesh, &model)
            .is_none());
    }
}
