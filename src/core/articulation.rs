// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };
use crate::math::transform::Transform;

/// Height of the tank model's local origin above the ground plane in the
/// reference scene.
pub const DEFAULT_HEIGHT_OFFSET: Float = 0.46;

/// Per-frame pose of the tank, written by game logic.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TankState {
    /// World position; only x and z are used, height comes from the rig.
    pub position: Vector3f,
    /// Body yaw in radians.
    pub rotation: Float,
    /// Turret yaw relative to the body, radians.
    pub turret_rotation: Float,
    /// Barrel pitch relative to the turret, radians.
    pub barrel_elevation: Float,
}

impl Default for TankState {
    fn default() -> Self {
        Self {
            position: Vector3f::zeros(),
            rotation: 0.0,
            turret_rotation: 0.0,
            barrel_elevation: 0.0,
        }
    }
}

/// Rest-pose points of the model, loaded once with the asset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TankPivots {
    pub turret: Vector3f,
    pub barrel: Vector3f,
    pub join: Vector3f,
}

impl Default for TankPivots {
    fn default() -> Self {
        Self {
            turret: Vector3f::zeros(),
            barrel: Vector3f::zeros(),
            join: Vector3f::zeros(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Articulation {
    pub height_offset: Float,
    pub pivots: TankPivots,
}

impl Default for Articulation {
    fn default() -> Self {
        Self {
            height_offset: DEFAULT_HEIGHT_OFFSET,
            pivots: TankPivots::default(),
        }
    }
}

impl Articulation {
    pub fn new(height_offset: Float, pivots: TankPivots) -> Self {
        Self { height_offset, pivots }
    }

    pub fn body_transform(&self, state: &TankState) -> Transform {
        let ground = Vector3f::new(state.position.x, self.height_offset, state.position.z);
        Transform::translate(&ground)
            .then(&Transform::rotate_y(state.rotation))
    }

    // The chain is built like a matrix stack: every call post-multiplies,
    // so the last translation listed is the first one applied to a vertex.
    pub fn turret_transform(&self, state: &TankState) -> Transform {
        let pivot = self.pivots.turret;
        self.body_transform(state)
            .then(&Transform::translate(&-pivot))
            .then(&Transform::rotate_y(state.turret_rotation))
            .then(&Transform::translate(&pivot))
    }

    pub fn barrel_transform(&self, state: &TankState) -> Transform {
        let pivot = self.pivots.join;
        self.turret_transform(state)
            .then(&Transform::translate(&-pivot))
            .then(&Transform::rotate_z(state.barrel_elevation))
            .then(&Transform::translate(&pivot))
    }

    /// World position of the barrel's end attachment point.
    pub fn barrel_pivot(&self, state: &TankState) -> Vector3f {
        let local = Vector3f::new(self.pivots.barrel.x,
                                  self.pivots.barrel.y - self.height_offset,
                                  self.pivots.barrel.z);
        self.barrel_transform(state).apply_point(local)
    }

    /// Unit direction from the barrel joint towards its end, in world space.
    pub fn aim_direction(&self, state: &TankState) -> Option<Vector3f> {
        let axis = self.pivots.barrel - self.pivots.join;
        let dir = self.barrel_transform(state).apply_vector(axis);
        let len = dir.norm();
        if len > 0.0 {
            Some(dir / len)
        } else {
            None
        }
    }
}

/// [`Articulation::barrel_pivot`] with the reference scene height offset.
pub fn compute_barrel_pivot(state: &TankState,
                            turret_pivot: &Vector3f,
                            barrel_pivot: &Vector3f,
                            join_pivot: &Vector3f) -> Vector3f {
    let pivots = TankPivots {
        turret: *turret_pivot,
        barrel: *barrel_pivot,
        join: *join_pivot,
    };
    Articulation::new(DEFAULT_HEIGHT_OFFSET, pivots).barrel_pivot(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{ FRAC_PI_2, PI };

    fn assert_close(a: &Vector3f, b: &Vector3f) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_rest_pose_returns_barrel_pivot() {
        let bp = Vector3f::new(1.3, 0.9, -0.2);
        let p = compute_barrel_pivot(&TankState::default(), &Vector3f::zeros(), &bp, &Vector3f::zeros());
        assert_close(&p, &bp);
    }

    #[test]
    fn test_turret_half_turn_negates_xz() {
        let bp = Vector3f::new(1.3, 0.9, -0.2);
        let zero = Vector3f::zeros();
        let base = compute_barrel_pivot(&TankState::default(), &zero, &bp, &zero);

        let state = TankState { turret_rotation: PI, ..TankState::default() };
        let turned = compute_barrel_pivot(&state, &zero, &bp, &zero);
        assert!((turned.x + base.x).abs() < 1e-5);
        assert!((turned.y - base.y).abs() < 1e-5);
        assert!((turned.z + base.z).abs() < 1e-5);
    }

    #[test]
    fn test_body_translation_moves_point() {
        let bp = Vector3f::new(1.0, 0.5, 0.0);
        let zero = Vector3f::zeros();
        let state = TankState { position: Vector3f::new(3.0, 100.0, -4.0), ..TankState::default() };
        let p = compute_barrel_pivot(&state, &zero, &bp, &zero);
        // y of the state position is ignored
        assert_close(&p, &Vector3f::new(4.0, 0.5, -4.0));
    }

    #[test]
    fn test_body_and_turret_yaw_add() {
        let rig = Articulation::new(0.46, TankPivots {
            barrel: Vector3f::new(2.0, 1.0, 0.0),
            ..TankPivots::default()
        });
        let a = TankState { rotation: 0.3, turret_rotation: 0.5, ..TankState::default() };
        let b = TankState { rotation: 0.8, ..TankState::default() };
        assert_close(&rig.barrel_pivot(&a), &rig.barrel_pivot(&b));
    }

    #[test]
    fn test_barrel_elevation_pitches_about_z() {
        let rig = Articulation::new(0.0, TankPivots {
            barrel: Vector3f::new(2.0, 0.0, 0.0),
            ..TankPivots::default()
        });
        let state = TankState { barrel_elevation: FRAC_PI_2, ..TankState::default() };
        assert_close(&rig.barrel_pivot(&state), &Vector3f::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_pivot_offsets_follow_stack_order() {
        // T(-p) R T(p) applied to p: p -> 2p -> rotated -> minus p
        let rig = Articulation::new(0.0, TankPivots {
            turret: Vector3f::new(1.0, 0.0, 0.0),
            barrel: Vector3f::new(1.0, 0.0, 0.0),
            join: Vector3f::zeros(),
        });
        let state = TankState { turret_rotation: PI, ..TankState::default() };
        assert_close(&rig.barrel_pivot(&state), &Vector3f::new(-3.0, 0.0, 0.0));
    }

    #[test]
    fn test_height_offset_is_configurable() {
        let bp = Vector3f::new(0.0, 1.0, 0.0);
        let pivots = TankPivots { barrel: bp, ..TankPivots::default() };
        let low = Articulation::new(0.1, pivots);
        let high = Articulation::new(2.0, pivots);
        let state = TankState::default();
        assert_close(&low.barrel_pivot(&state), &high.barrel_pivot(&state));
        assert_close(&low.body_transform(&state).apply_point(Vector3f::zeros()),
                     &Vector3f::new(0.0, 0.1, 0.0));
        assert_close(&high.body_transform(&state).apply_point(Vector3f::zeros()),
                     &Vector3f::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_aim_direction() {
        let rig = Articulation::new(0.46, TankPivots {
            barrel: Vector3f::new(3.0, 1.0, 0.0),
            join: Vector3f::new(1.0, 1.0, 0.0),
            ..TankPivots::default()
        });
        let level = rig.aim_direction(&TankState::default()).unwrap();
        assert_close(&level, &Vector3f::x());

        let state = TankState { rotation: FRAC_PI_2, ..TankState::default() };
        assert_close(&rig.aim_direction(&state).unwrap(), &Vector3f::new(0.0, 0.0, -1.0));

        let up = TankState { barrel_elevation: FRAC_PI_2, ..TankState::default() };
        assert_close(&rig.aim_direction(&up).unwrap(), &Vector3f::y());

        assert!(Articulation::default().aim_direction(&TankState::default()).is_none());
    }
}
