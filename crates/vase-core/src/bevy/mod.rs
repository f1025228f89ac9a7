//! Bevy integration for the vase scene.
//!
//! Wraps [`crate::scene::VaseScene`] in a resource, feeds it queued input
//! commands and both clocks, and mirrors its state onto ECS entities.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{SceneSet, VaseHeadlessPlugin, VaseScenePlugin};
pub use resources::*;
pub use systems::{FragmentQuery, TransformFragments, VaseVisualConfig};
