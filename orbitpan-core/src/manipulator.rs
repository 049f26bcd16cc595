/// Mouse-driven pan and trackball rotation of a single scene object
///
/// A press on the object's surface starts a gesture: the primary button pans
/// the object across a camera-facing plane through the clicked point, the
/// secondary button spins it like a virtual trackball on its bounding
/// sphere. Every move composes a small world-space increment onto the
/// object's current local-to-parent matrix.
use nalgebra::{Point2, Point3, Unit};
use tracing::{debug, trace};

use crate::projection::Camera;
use crate::ray::Plane;
use crate::scene::Target;
use crate::transform::{compose, Increment};

/// Largest rotation accepted from a single move, in radians (45°).
pub const DEFAULT_MAX_ROTATION_STEP: f32 = std::f32::consts::FRAC_PI_4;

/// Cross products shorter than this are treated as a zero rotation.
const AXIS_EPSILON: f32 = 1e-6;

/// Mouse button ids as delivered by DOM-style input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl MouseButton {
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => MouseButton::Primary,
            1 => MouseButton::Auxiliary,
            2 => MouseButton::Secondary,
            other => MouseButton::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManipulationState {
    Idle,
    /// Translating across the plane captured when the gesture began
    Panning { plane: Plane },
    Rotating,
}

/// What happens to the remembered cursor when a rotate frame misses the
/// bounding sphere or yields no axis. Steps rejected for being too large
/// always advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateMissPolicy {
    /// Always take the new position, like panning does
    #[default]
    AdvanceCursor,
    /// Keep the last position that produced a rotation
    HoldCursor,
}

/// Why a rotate frame produced no increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotateSkip {
    Missed,
    Degenerate,
    TooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulatorConfig {
    /// Rotations larger than this in one move are dropped. None disables the
    /// check.
    pub max_rotation_step: Option<f32>,
    pub rotate_miss_policy: RotateMissPolicy,
}

impl Default for ManipulatorConfig {
    fn default() -> Self {
        Self {
            max_rotation_step: Some(DEFAULT_MAX_ROTATION_STEP),
            rotate_miss_policy: RotateMissPolicy::default(),
        }
    }
}

impl ManipulatorConfig {
    pub fn with_max_rotation_step(mut self, radians: Option<f32>) -> Self {
        self.max_rotation_step = radians;
        self
    }

    pub fn with_rotate_miss_policy(mut self, policy: RotateMissPolicy) -> Self {
        self.rotate_miss_policy = policy;
        self
    }
}

/// Gesture state for one target
#[derive(Debug, Clone)]
pub struct Manipulator {
    config: ManipulatorConfig,
    state: ManipulationState,
    previous: Point2<f32>,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self::new(ManipulatorConfig::default())
    }
}

impl Manipulator {
    pub fn new(config: ManipulatorConfig) -> Self {
        Self {
            config,
            state: ManipulationState::Idle,
            previous: Point2::origin(),
        }
    }

    pub fn config(&self) -> &ManipulatorConfig {
        &self.config
    }

    pub fn state(&self) -> &ManipulationState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ManipulationState::Idle
    }

    pub fn pan_plane(&self) -> Option<&Plane> {
        match &self.state {
            ManipulationState::Panning { plane } => Some(plane),
            _ => None,
        }
    }

    /// Last cursor position sampled, in normalized device coordinates
    pub fn previous_position(&self) -> Point2<f32> {
        self.previous
    }

    /// Start a gesture if idle and the cursor is directly over the target.
    ///
    /// Returns whether a gesture began.
    pub fn press<T: Target>(
        &mut self,
        button: MouseButton,
        cursor: Point2<f32>,
        camera: &Camera,
        target: &T,
    ) -> bool {
        if !self.is_idle() {
            debug!(?button, state = ?self.state, "press ignored, gesture in progress");
            return false;
        }
        if !matches!(button, MouseButton::Primary | MouseButton::Secondary) {
            return false;
        }

        let Some(hit) = camera
            .pick_ray(&cursor)
            .and_then(|ray| target.intersect_mesh(&ray))
        else {
            trace!(?button, x = cursor.x, y = cursor.y, "press missed target");
            return false;
        };

        self.state = match button {
            MouseButton::Primary => ManipulationState::Panning {
                plane: Plane::new(hit, camera.backward()),
            },
            _ => ManipulationState::Rotating,
        };
        self.previous = cursor;
        debug!(?button, hit = ?hit, state = ?self.state, "gesture started");
        true
    }

    /// Apply the active gesture for a cursor move.
    ///
    /// Returns whether the target's transform was written.
    pub fn drag<T: Target>(&mut self, cursor: Point2<f32>, camera: &Camera, target: &mut T) -> bool {
        let (increment, advance) = match self.state {
            ManipulationState::Idle => return false,
            ManipulationState::Panning { plane } => {
                (self.pan_increment(&plane, cursor, camera), true)
            }
            ManipulationState::Rotating => match self.rotate_increment(cursor, camera, target) {
                Ok(increment) => (Some(increment), true),
                Err(RotateSkip::TooLarge) => (None, true),
                Err(RotateSkip::Missed | RotateSkip::Degenerate) => {
                    (None, self.config.rotate_miss_policy == RotateMissPolicy::AdvanceCursor)
                }
            },
        };

        if advance {
            self.previous = cursor;
        }
        increment.map_or(false, |increment| apply_increment(target, &increment))
    }

    /// End the gesture started by `button`, wherever the cursor is.
    pub fn release(&mut self, button: MouseButton) {
        let ends = matches!(
            (&self.state, button),
            (ManipulationState::Panning { .. }, MouseButton::Primary)
                | (ManipulationState::Rotating, MouseButton::Secondary)
        );
        if ends {
            debug!(?button, state = ?self.state, "gesture ended");
            self.state = ManipulationState::Idle;
        }
    }

    fn pan_increment(&self, plane: &Plane, cursor: Point2<f32>, camera: &Camera) -> Option<Increment> {
        let on_plane = |ndc: &Point2<f32>| camera.pick_ray(ndc)?.intersect_plane(plane);
        match (on_plane(&self.previous), on_plane(&cursor)) {
            (Some(previous), Some(current)) => Some(Increment::Translation(current - previous)),
            _ => {
                trace!(x = cursor.x, y = cursor.y, "pan ray missed plane");
                None
            }
        }
    }

    fn rotate_increment<T: Target>(
        &self,
        cursor: Point2<f32>,
        camera: &Camera,
        target: &T,
    ) -> Result<Increment, RotateSkip> {
        let sphere = target.world_bounding_sphere();
        let on_sphere = |ndc: &Point2<f32>| camera.pick_ray(ndc)?.intersect_sphere(&sphere);
        let (Some(previous), Some(current)) = (on_sphere(&self.previous), on_sphere(&cursor)) else {
            trace!(x = cursor.x, y = cursor.y, "rotate ray missed bounding sphere");
            return Err(RotateSkip::Missed);
        };

        let from = (previous - sphere.center)
            .try_normalize(f32::EPSILON)
            .ok_or(RotateSkip::Degenerate)?;
        let to = (current - sphere.center)
            .try_normalize(f32::EPSILON)
            .ok_or(RotateSkip::Degenerate)?;
        let cross = from.cross(&to);
        let angle = cross.norm().atan2(from.dot(&to));
        let Some(axis) = Unit::try_new(cross, AXIS_EPSILON).filter(|_| angle.is_finite()) else {
            trace!(angle, "degenerate trackball rotation");
            return Err(RotateSkip::Degenerate);
        };
        if let Some(max) = self.config.max_rotation_step {
            if angle > max {
                trace!(angle, max, "rotation step rejected");
                return Err(RotateSkip::TooLarge);
            }
        }

        let pivot = target.local_to_world().transform_point(&Point3::origin());
        Ok(Increment::Rotation { axis, angle, pivot })
    }
}

/// Compose `increment` onto the target's current transform and write it back.
fn apply_increment<T: Target>(target: &mut T, increment: &Increment) -> bool {
    match compose(&target.local_to_parent(), &target.local_to_world(), increment) {
        Some(next) => {
            target.set_local_to_parent(next);
            true
        }
        None => {
            trace!(?increment, "target frame is singular, increment skipped");
            false
        }
    }
}
