/// Incremental transform updates composed onto a node's local-to-parent matrix
use nalgebra::{Matrix4, Point3, Rotation3, Unit, UnitQuaternion, Vector3};

/// A world-space change applied on top of an object's existing transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Increment {
    /// Move by a world-space offset
    Translation(Vector3<f32>),
    /// Rotate by `angle` radians around `axis` through the world point `pivot`
    Rotation {
        axis: Unit<Vector3<f32>>,
        angle: f32,
        pivot: Point3<f32>,
    },
}

impl Increment {
    /// The operator as a world-space matrix.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        match *self {
            Increment::Translation(offset) => Matrix4::new_translation(&offset),
            Increment::Rotation { axis, angle, pivot } => {
                let to_pivot = Matrix4::new_translation(&pivot.coords);
                let from_pivot = Matrix4::new_translation(&-pivot.coords);
                to_pivot * Rotation3::from_axis_angle(&axis, angle).to_homogeneous() * from_pivot
            }
        }
    }

    /// The same operator expressed in the frame described by `local_to_world`.
    ///
    /// Translations only go through the linear part of the inverse, so the
    /// frame's own offset never leaks into the vector.
    pub fn local_matrix(&self, local_to_world: &Matrix4<f32>) -> Option<Matrix4<f32>> {
        let world_to_local = local_to_world.try_inverse()?;
        let local = match self {
            Increment::Translation(offset) => {
                Matrix4::new_translation(&world_to_local.transform_vector(offset))
            }
            Increment::Rotation { .. } => world_to_local * self.world_matrix() * local_to_world,
        };
        local.iter().all(|c| c.is_finite()).then_some(local)
    }
}

/// New local-to-parent matrix after applying `increment` in world space.
///
/// With `W = P * M` (parent-to-world times local-to-parent) the result is
/// `M * (W⁻¹ * O * W)`, which equals `P⁻¹ * O * P * M`: the operator lands
/// in parent space and is applied after the current transform. The matrix is
/// never split into translation, rotation and scale. Returns None when the
/// local-to-world matrix is singular.
pub fn compose(
    local_to_parent: &Matrix4<f32>,
    local_to_world: &Matrix4<f32>,
    increment: &Increment,
) -> Option<Matrix4<f32>> {
    Some(local_to_parent * increment.local_matrix(local_to_world)?)
}

/// Transform builder for scene setup
pub struct Transform;

impl Transform {
    /// Translation * rotation * scale
    pub fn from_parts(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Matrix4<f32> {
        Matrix4::new_translation(&translation)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&scale)
    }

    /// Translation part of an affine matrix
    pub fn position(matrix: &Matrix4<f32>) -> Point3<f32> {
        matrix.transform_point(&Point3::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn scaled_offset() -> Matrix4<f32> {
        Transform::from_parts(
            Vector3::new(0.5, 0.0, -1.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3),
            Vector3::repeat(1.5),
        )
    }

    #[test]
    fn test_translation_moves_world_position() {
        let model = scaled_offset();
        let offset = Vector3::new(0.2, -0.1, 0.4);
        let next = compose(&model, &model, &Increment::Translation(offset)).unwrap();

        assert_relative_eq!(
            Transform::position(&next),
            Transform::position(&model) + offset,
            epsilon = 1e-5
        );
        // Orientation and scale are untouched.
        assert_relative_eq!(
            next.fixed_view::<3, 3>(0, 0).into_owned(),
            model.fixed_view::<3, 3>(0, 0).into_owned(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_translation_under_a_parent() {
        let parent = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0))
            * Matrix4::new_scaling(2.0);
        let local = scaled_offset();
        let world = parent * local;
        let offset = Vector3::new(1.0, 0.0, 0.0);

        let next = compose(&local, &world, &Increment::Translation(offset)).unwrap();
        assert_relative_eq!(
            Transform::position(&(parent * next)),
            Transform::position(&world) + offset,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_zero_translation_is_identity() {
        let model = scaled_offset();
        let next = compose(&model, &model, &Increment::Translation(Vector3::zeros())).unwrap();
        assert_eq!(next, model);
    }

    #[test]
    fn test_rotation_about_own_position_keeps_position() {
        let model = scaled_offset();
        let increment = Increment::Rotation {
            axis: Vector3::z_axis(),
            angle: FRAC_PI_2,
            pivot: Transform::position(&model),
        };
        let next = compose(&model, &model, &increment).unwrap();

        assert_relative_eq!(Transform::position(&next), Transform::position(&model), epsilon = 1e-5);
        let x_before = model.transform_vector(&Vector3::x());
        let x_after = next.transform_vector(&Vector3::x());
        let expected = Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2) * x_before;
        assert_relative_eq!(x_after, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_about_origin_swings_position() {
        let model = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0));
        let increment = Increment::Rotation {
            axis: Vector3::z_axis(),
            angle: FRAC_PI_2,
            pivot: Point3::origin(),
        };
        let next = compose(&model, &model, &increment).unwrap();
        assert_relative_eq!(Transform::position(&next), Point3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_singular_frame_is_skipped() {
        let flat = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 0.0, 1.0));
        assert!(compose(&flat, &flat, &Increment::Translation(Vector3::x())).is_none());
    }

    #[test]
    fn test_identity_parts() {
        let matrix = Transform::from_parts(Vector3::zeros(), UnitQuaternion::identity(), Vector3::repeat(1.0));
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }
}
