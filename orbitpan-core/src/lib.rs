/// orbitpan core library - picking, pan and trackball manipulation
///
/// This library provides the input-to-transform logic for moving and
/// spinning a 3D object with the mouse, together with the camera, ray and
/// mesh primitives it picks against.

pub mod error;
pub mod geometry;
pub mod manipulator;
pub mod obj;
pub mod projection;
pub mod ray;
pub mod scene;
pub mod transform;
pub mod workbench;

// Re-export commonly used types
pub use error::{MeshError, MeshResult};
pub use geometry::{Mesh, Triangle, Vertex};
pub use manipulator::{
    ManipulationState, Manipulator, ManipulatorConfig, MouseButton, RotateMissPolicy,
    DEFAULT_MAX_ROTATION_STEP,
};
pub use projection::{Camera, ProjectionMode, Viewport};
pub use ray::{Plane, Ray, Sphere};
pub use scene::{SceneNode, Target};
pub use transform::{compose, Increment, Transform};
pub use workbench::{PointerHandler, Workbench};
