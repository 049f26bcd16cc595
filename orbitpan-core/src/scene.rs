/// The manipulable object as the manipulator sees it
use nalgebra::{Matrix4, Point3};

use crate::geometry::Mesh;
use crate::ray::{Ray, Sphere};

/// What the manipulator needs from a scene-graph node.
///
/// The node owns its transform; the manipulator reads it, composes an
/// increment and writes the result back every frame.
pub trait Target {
    fn local_to_parent(&self) -> Matrix4<f32>;

    fn set_local_to_parent(&mut self, matrix: Matrix4<f32>);

    /// Accumulated transform through the scene hierarchy
    fn local_to_world(&self) -> Matrix4<f32>;

    /// Bounding sphere in world space, current as of the last write
    fn world_bounding_sphere(&self) -> Sphere;

    /// Exact hit against the node's geometry
    fn intersect_mesh(&self, ray: &Ray) -> Option<Point3<f32>>;
}

/// A mesh placed under a (fixed) parent frame
#[derive(Debug, Clone)]
pub struct SceneNode {
    mesh: Mesh,
    local_bounds: Sphere,
    local_to_parent: Matrix4<f32>,
    parent_to_world: Matrix4<f32>,
}

impl SceneNode {
    pub fn new(mesh: Mesh) -> Self {
        let local_bounds = mesh.bounding_sphere();
        Self {
            mesh,
            local_bounds,
            local_to_parent: Matrix4::identity(),
            parent_to_world: Matrix4::identity(),
        }
    }

    pub fn with_transform(mut self, local_to_parent: Matrix4<f32>) -> Self {
        self.local_to_parent = local_to_parent;
        self
    }

    pub fn with_parent(mut self, parent_to_world: Matrix4<f32>) -> Self {
        self.parent_to_world = parent_to_world;
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.local_bounds = mesh.bounding_sphere();
        self.mesh = mesh;
    }

    pub fn parent_to_world(&self) -> Matrix4<f32> {
        self.parent_to_world
    }
}

impl Target for SceneNode {
    fn local_to_parent(&self) -> Matrix4<f32> {
        self.local_to_parent
    }

    fn set_local_to_parent(&mut self, matrix: Matrix4<f32>) {
        self.local_to_parent = matrix;
    }

    fn local_to_world(&self) -> Matrix4<f32> {
        self.parent_to_world * self.local_to_parent
    }

    fn world_bounding_sphere(&self) -> Sphere {
        let local_to_world = self.local_to_world();
        let linear = local_to_world.fixed_view::<3, 3>(0, 0);
        let max_scale = linear
            .column_iter()
            .map(|axis| axis.norm())
            .fold(0.0_f32, f32::max);
        Sphere::new(
            local_to_world.transform_point(&self.local_bounds.center),
            self.local_bounds.radius * max_scale,
        )
    }

    fn intersect_mesh(&self, ray: &Ray) -> Option<Point3<f32>> {
        ray.intersect_mesh(&self.mesh, &self.local_to_world())
    }
}
