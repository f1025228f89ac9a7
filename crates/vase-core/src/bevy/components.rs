//! ECS Components for the vase scene.

use bevy::prelude::*;

use crate::coin::CoinId;
use crate::shatter::ShardRestPose;
use crate::vase::VaseId;

/// Root entity of one vase, placed at its grid position.
#[derive(Component, Debug, Clone)]
pub struct Vase {
    pub id: VaseId,
    pub slot: usize,
}

/// The unbroken mesh of a vase. Carries the vase's drag spin.
#[derive(Component, Debug, Clone)]
pub struct IntactMesh {
    pub vase: VaseId,
}

/// Parent of every fragment of a vase; hidden until the vase shatters.
#[derive(Component, Debug, Clone)]
pub struct FragmentsRoot {
    pub vase: VaseId,
}

/// One piece of a pre-fractured vase mesh.
///
/// `Transform` is local to the [`FragmentsRoot`], which sits at `origin`.
#[derive(Component, Debug, Clone)]
pub struct Fragment {
    pub vase: VaseId,
    /// Stable ordering within the vase.
    pub index: usize,
    /// Bounding-box centroid of the fragment geometry.
    pub local_center: Vec3,
    /// World position of the vase base.
    pub origin: Vec3,
}

/// Intact transform of a fragment, captured once after it appears.
#[derive(Component, Debug, Clone, Copy)]
pub struct RestPose(pub ShardRestPose);

/// A coin body mirrored from the physics world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Coin {
    pub id: CoinId,
}

/// Marker for the main scene camera.
#[derive(Component, Debug, Clone, Default)]
pub struct MainCamera;
