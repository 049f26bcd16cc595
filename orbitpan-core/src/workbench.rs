/// Host-facing entry points: screen-space pointer events in, transform updates out
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::geometry::Mesh;
use crate::manipulator::{ManipulationState, Manipulator, ManipulatorConfig, MouseButton};
use crate::projection::{Camera, Viewport};
use crate::scene::{SceneNode, Target};
use crate::transform::Transform;

/// Callbacks a windowing host forwards its mouse events to.
///
/// Coordinates are screen positions in the host's units (pixels or
/// terminal cells), origin at the top-left.
pub trait PointerHandler {
    fn on_press(&mut self, button: MouseButton, screen_x: f32, screen_y: f32);
    fn on_move(&mut self, screen_x: f32, screen_y: f32);
    fn on_release(&mut self, button: MouseButton);
}

/// One camera looking at one manipulable object
#[derive(Debug, Clone)]
pub struct Workbench {
    pub viewport: Viewport,
    pub camera: Camera,
    pub node: SceneNode,
    manipulator: Manipulator,
    initial_transform: Matrix4<f32>,
}

impl Workbench {
    pub fn new(viewport: Viewport, camera: Camera, node: SceneNode, config: ManipulatorConfig) -> Self {
        let initial_transform = node.local_to_parent();
        Self {
            viewport,
            camera,
            node,
            manipulator: Manipulator::new(config),
            initial_transform,
        }
    }

    /// The demo layout: a 60° perspective camera at (0, 0, 2) looking at the
    /// origin, and the mesh at (0.5, 0, -1) scaled by 1.5.
    pub fn demo(mesh: Mesh, viewport: Viewport, config: ManipulatorConfig) -> Self {
        let camera = Camera::perspective(60.0, viewport.aspect(), 0.1, 100.0).look_at(
            Point3::new(0.0, 0.0, 2.0),
            Point3::origin(),
            Vector3::y(),
        );
        let node = SceneNode::new(mesh).with_transform(Transform::from_parts(
            Vector3::new(0.5, 0.0, -1.0),
            UnitQuaternion::identity(),
            Vector3::repeat(1.5),
        ));
        Self::new(viewport, camera, node, config)
    }

    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    pub fn state(&self) -> &ManipulationState {
        self.manipulator.state()
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.node.local_to_world()
    }

    /// Keep the camera's aspect in step with the drawing surface.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.camera.aspect = self.viewport.aspect();
    }

    /// Restore the transform the object had when the workbench was built.
    /// Ignored while a gesture is active.
    pub fn reset(&mut self) {
        if self.manipulator.is_idle() {
            self.node.set_local_to_parent(self.initial_transform);
        }
    }
}

impl PointerHandler for Workbench {
    fn on_press(&mut self, button: MouseButton, screen_x: f32, screen_y: f32) {
        let cursor = self.viewport.normalize(screen_x, screen_y);
        self.manipulator.press(button, cursor, &self.camera, &self.node);
    }

    fn on_move(&mut self, screen_x: f32, screen_y: f32) {
        let cursor = self.viewport.normalize(screen_x, screen_y);
        self.manipulator.drag(cursor, &self.camera, &mut self.node);
    }

    fn on_release(&mut self, button: MouseButton) {
        self.manipulator.release(button);
    }
}
