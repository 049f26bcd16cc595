/// Camera, viewport and the screen <-> world mappings used for picking
use nalgebra::{Isometry3, Matrix4, Point2, Point3, Unit, Vector3, Vector4};

use crate::ray::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Pixel (or terminal cell) extent of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Map a screen position (origin top-left, y down) to normalized device
    /// coordinates (origin centered, y up, [-1, 1] on both axes).
    pub fn normalize(&self, screen_x: f32, screen_y: f32) -> Point2<f32> {
        Point2::new(
            (screen_x / self.width) * 2.0 - 1.0,
            1.0 - (screen_y / self.height) * 2.0,
        )
    }

    pub fn to_screen(&self, ndc: &Point2<f32>) -> (f32, f32) {
        (
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Perspective camera with a vertical field of view given in degrees.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    pub fn look_at(mut self, position: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Self {
        self.position = position;
        self.target = target;
        self.up = up;
        self
    }

    fn view_isometry(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_isometry().to_homogeneous()
    }

    /// Camera-to-world transform
    pub fn local_to_world(&self) -> Matrix4<f32> {
        self.view_isometry().inverse().to_homogeneous()
    }

    /// The camera's local +Z axis in world space, pointing away from what it
    /// looks at.
    pub fn backward(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.view_isometry().inverse() * Vector3::z())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a normalized device coordinate, starting on
    /// the near plane.
    pub fn pick_ray(&self, ndc: &Point2<f32>) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;
        let near = inverse.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc.x, ndc.y, 1.0));
        Ray::through(near, far)
    }

    /// Project a world-space point to screen space.
    ///
    /// Returns `(screen_x, screen_y, depth)` with depth in NDC, or None when
    /// the point is behind the camera or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        viewport: &Viewport,
    ) -> Option<(f32, f32, f32)> {
        let clip = self.view_projection() * Vector4::new(point.x, point.y, point.z, 1.0);

        // Prevent division by near-zero depth values
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        let (x, y) = viewport.to_screen(&Point2::new(ndc.x, ndc.y));
        Some((x, y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
