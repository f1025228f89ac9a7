//! Bevy plugins for the vase scene.
//!
//! Provides:
//! - `VaseHeadlessPlugin`: Logic-only plugin (no rendering/window dependencies)
//!   for headless runs and tests
//! - `VaseScenePlugin`: `VaseHeadlessPlugin` + meshes, materials, lights and a 3D camera

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::scene::VaseScene;

/// Ordering of the per-frame scene systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Rest pose capture and command processing.
    Input,
    /// Scene tick and event publishing.
    Tick,
    /// ECS mirrors of scene state.
    Sync,
}

// ============================================================================
// Headless Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing all scene logic without rendering or window dependencies.
///
/// Use this plugin with `MinimalPlugins` (plus `StatesPlugin`) to run the
/// scene without a windowing or rendering backend.
///
/// The scene is built by the caller so configuration errors surface before
/// the app exists; the plugin moves it into [`SceneRes`] on build.
pub struct VaseHeadlessPlugin {
    scene: Mutex<Option<VaseScene>>,
    pub command_queue: Option<CommandQueue>,
    pub placeholder_fragments: Option<PlaceholderFragments>,
}

impl VaseHeadlessPlugin {
    pub fn new(scene: VaseScene) -> Self {
        Self {
            scene: Mutex::new(Some(scene)),
            command_queue: None,
            placeholder_fragments: None,
        }
    }

    /// Shares an external command queue with the app.
    pub fn with_command_queue(mut self, queue: CommandQueue) -> Self {
        self.command_queue = Some(queue);
        self
    }

    /// Spawns procedural fragment rings for every vase.
    pub fn with_placeholder_fragments(mut self, placeholder: PlaceholderFragments) -> Self {
        self.placeholder_fragments = Some(placeholder);
        self
    }
}

impl Plugin for VaseHeadlessPlugin {
    fn build(&self, app: &mut App) {
        let Some(scene) = self.scene.lock().take() else {
            tracing::error!("[vase] VaseHeadlessPlugin built twice; scene already moved");
            return;
        };

        // ====================================================================
        // States
        // ====================================================================
        app.init_state::<AppPhase>();

        // ====================================================================
        // Resources
        // ====================================================================
        app.insert_resource(SceneRes::new(scene))
            .insert_resource(self.command_queue.clone().unwrap_or_default());
        if let Some(placeholder) = self.placeholder_fragments {
            app.insert_resource(placeholder);
        }

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<FocusChangedEvent>()
            .add_message::<DestroyStartedEvent>()
            .add_message::<DestroyCompletedEvent>()
            .add_message::<MeshSwapEvent>()
            .add_message::<SensorWindowEvent>()
            .add_message::<CameraSettledEvent>()
            .add_message::<CoinSpawnedEvent>()
            .add_message::<CoinDespawnedEvent>()
            .add_message::<AppearanceChangedEvent>();

        // ====================================================================
        // Startup
        // ====================================================================
        app.add_systems(
            Startup,
            (systems::spawn_vase_entities, systems::spawn_main_camera).chain(),
        );

        // ====================================================================
        // Per-frame systems
        // ====================================================================
        app.configure_sets(
            Update,
            (SceneSet::Input, SceneSet::Tick, SceneSet::Sync).chain(),
        );

        app.add_systems(
            Update,
            (systems::capture_rest_poses, systems::process_commands)
                .chain()
                .in_set(SceneSet::Input),
        );
        app.add_systems(
            Update,
            (systems::advance_scene, systems::publish_scene_events)
                .chain()
                .in_set(SceneSet::Tick),
        );
        app.add_systems(
            Update,
            (
                systems::apply_mesh_swaps,
                systems::sync_coin_entities,
                systems::sync_coin_transforms,
                systems::sync_vase_yaw,
                systems::sync_camera_transform,
                systems::sync_app_phase,
            )
                .chain()
                .in_set(SceneSet::Sync),
        );

        tracing::info!("[vase] headless plugin ready");
    }
}

// ============================================================================
// Scene Plugin (headless + rendering)
// ============================================================================

/// Full plugin: scene logic plus procedural meshes, lighting and a `Camera3d`.
///
/// Requires the rendering plugins (e.g. `DefaultPlugins`).
pub struct VaseScenePlugin {
    scene: Mutex<Option<VaseScene>>,
    pub command_queue: Option<CommandQueue>,
    pub visuals: systems::VaseVisualConfig,
}

impl VaseScenePlugin {
    pub fn new(scene: VaseScene) -> Self {
        Self {
            scene: Mutex::new(Some(scene)),
            command_queue: None,
            visuals: systems::VaseVisualConfig::default(),
        }
    }

    pub fn with_command_queue(mut self, queue: CommandQueue) -> Self {
        self.command_queue = Some(queue);
        self
    }
}

impl Plugin for VaseScenePlugin {
    fn build(&self, app: &mut App) {
        let Some(scene) = self.scene.lock().take() else {
            tracing::error!("[vase] VaseScenePlugin built twice; scene already moved");
            return;
        };

        // ====================================================================
        // Headless logic
        // ====================================================================
        let placeholder = PlaceholderFragments {
            radius: self.visuals.vase_radius,
            height: self.visuals.vase_height,
            ..PlaceholderFragments::default()
        };
        let mut headless = VaseHeadlessPlugin::new(scene).with_placeholder_fragments(placeholder);
        headless.command_queue.clone_from(&self.command_queue);
        app.add_plugins(headless);

        // ====================================================================
        // Rendering
        // ====================================================================
        app.insert_resource(self.visuals.clone());

        app.add_systems(
            Startup,
            (systems::attach_render_camera, systems::spawn_lighting)
                .after(systems::spawn_main_camera),
        );
        app.add_systems(
            Update,
            (
                systems::attach_vase_meshes,
                systems::attach_fragment_meshes,
                systems::attach_coin_meshes,
                systems::apply_appearance_changes,
            )
                .after(SceneSet::Sync),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::bevy::test_utils::TestApp;
    use crate::bevy::{
        Coin, Fragment, FragmentsRoot, IntactMesh, MainCamera, RestPose, SceneCommand,
    };
    use crate::config::SceneConfig;
    use crate::lock::ReleaseReason;
    use crate::vase::NavDirection;

    use super::*;

    fn visibility_of<C: Component>(app: &mut TestApp, pick: impl Fn(&C) -> bool) -> Visibility {
        let mut query = app.world_mut().query::<(&C, &Visibility)>();
        query
            .iter(app.world())
            .find(|(c, _)| pick(c))
            .map(|(_, v)| *v)
            .expect("entity present")
    }

    #[test]
    fn test_startup_spawns_vase_hierarchy() {
        let mut app = TestApp::new();
        let count = app.scene().vase_count();

        let vases = app.count::<crate::bevy::Vase>();
        let intact = app.count::<IntactMesh>();
        let roots = app.count::<FragmentsRoot>();
        let fragments = app.count::<Fragment>();
        let rest = app.count::<RestPose>();

        assert_eq!(vases, count);
        assert_eq!(intact, count);
        assert_eq!(roots, count);
        assert_eq!(fragments, count * 24);
        assert_eq!(rest, fragments);
        assert_eq!(app.count::<MainCamera>(), 1);
    }

    #[test]
    fn test_enter_scene_moves_camera_and_phase() {
        let mut app = TestApp::new();
        app.enter_scene();

        let pose = app.scene().camera_pose();
        let mut query = app.world_mut().query_filtered::<&Transform, With<MainCamera>>();
        let transform = *query.single(app.world()).expect("main camera");
        assert!(transform.translation.distance(pose.position) < 1e-4);
        assert!(!app.scene().is_camera_animating());
        assert_eq!(
            *app.world().resource::<State<AppPhase>>().get(),
            AppPhase::Scene
        );
    }

    #[test]
    fn test_destroy_command_swaps_meshes_and_releases_lock() {
        let mut app = TestApp::new();
        app.enter_scene();
        let vase = app.scene().focused_vase().cloned().expect("focused vase");

        app.push(SceneCommand::Destroy);
        app.update();
        app.update();

        assert!(app.scene().is_locked());
        let target = vase.clone();
        assert_eq!(
            visibility_of::<IntactMesh>(&mut app, |m| m.vase == target),
            Visibility::Hidden
        );
        let target = vase.clone();
        assert_eq!(
            visibility_of::<FragmentsRoot>(&mut app, |r| r.vase == target),
            Visibility::Inherited
        );

        app.run_for(Duration::from_millis(500));
        let mut query = app.world_mut().query::<(&Fragment, &RestPose, &Transform)>();
        let moved = query
            .iter(app.world())
            .filter(|(f, _, _)| f.vase == vase)
            .any(|(_, rest, t)| t.translation.distance(rest.0.position) > 0.05);
        assert!(moved, "fragments should fly apart");

        let duration = app.scene().config().shatter.duration_ms;
        app.run_for(Duration::from_millis(duration));

        assert!(!app.scene().is_locked());
        assert_eq!(app.scene().record(&vase).map(|r| r.destroy_count), Some(1));
        assert_eq!(app.sink.destroy_count(&vase), Some(1));
        let target = vase.clone();
        assert_eq!(
            visibility_of::<IntactMesh>(&mut app, |m| m.vase == target),
            Visibility::Inherited
        );
    }

    #[test]
    fn test_destroy_without_fragments_keeps_scene_unlocked() {
        let mut app = TestApp::without_fragments(SceneConfig::default());
        app.enter_scene();

        app.push(SceneCommand::Destroy);
        app.update();

        assert!(!app.scene().is_locked());
        assert_eq!(app.scene().pending_timers(), 0);
    }

    #[test]
    fn test_yield_defers_commands() {
        let mut app = TestApp::new();
        app.enter_scene();
        let start = app.scene().focused_slot();

        app.push(SceneCommand::Focus { slot: start + 1 });
        app.push(SceneCommand::Yield);
        app.push(SceneCommand::Destroy);
        app.update();

        assert_eq!(app.scene().focused_slot(), start + 1);
        assert!(!app.scene().is_locked());
        assert_eq!(app.world().resource::<CommandQueue>().len(), 1);
    }

    #[test]
    fn test_coin_entities_follow_physics() {
        let mut app = TestApp::new();
        app.enter_scene();

        app.push(SceneCommand::ManifestCoin);
        app.update();
        app.update();
        assert_eq!(app.count::<Coin>(), 1);

        let start_y = app.coin_heights()[0];
        app.run_for(Duration::from_millis(300));
        let later_y = app.coin_heights()[0];
        assert!(later_y < start_y, "coin should fall: {start_y} -> {later_y}");
    }

    #[test]
    fn test_hold_navigation_repeats_until_release() {
        let mut app = TestApp::new();
        app.enter_scene();
        let start = app.scene().focused_slot();
        let count = app.scene().vase_count();

        app.push(SceneCommand::PressNavigation {
            direction: NavDirection::Next,
        });
        app.update();
        assert_eq!(app.scene().focused_slot(), (start + 1) % count);

        let input = app.scene().config().input.clone();
        app.run_for(Duration::from_millis(
            input.repeat_delay_ms + input.repeat_interval_ms,
        ));
        let held = app.scene().focused_slot();
        assert_ne!(held, (start + 1) % count);

        app.push(SceneCommand::ReleaseNavigation);
        app.update();
        let released = app.scene().focused_slot();
        app.run_for(Duration::from_millis(input.repeat_interval_ms * 3));
        assert_eq!(app.scene().focused_slot(), released);
    }

    #[test]
    fn test_vase_drag_spins_intact_mesh() {
        let mut app = TestApp::new();
        app.enter_scene();
        let vase = app.scene().focused_vase().cloned().expect("focused vase");

        app.push(SceneCommand::BeginVaseDrag);
        app.push(SceneCommand::DragVase { dx: 120.0 });
        app.update();

        let yaw = app.scene().record(&vase).map_or(0.0, |r| r.yaw);
        assert!(yaw.abs() > 0.0);
        let mut query = app.world_mut().query::<(&IntactMesh, &Transform)>();
        let rotation = query
            .iter(app.world())
            .find(|(m, _)| m.vase == vase)
            .map(|(_, t)| t.rotation)
            .expect("intact mesh");
        assert!(rotation.angle_between(Quat::from_rotation_y(yaw)) < 1e-4);
    }

    #[test]
    fn test_spun_vase_shatters_at_its_yaw() {
        let mut app = TestApp::new();
        app.enter_scene();
        let vase = app.scene().focused_vase().cloned().expect("focused vase");

        app.push(SceneCommand::BeginVaseDrag);
        app.push(SceneCommand::DragVase { dx: 200.0 });
        app.push(SceneCommand::ReleasePointer {
            reason: ReleaseReason::PointerUp,
        });
        app.update();
        app.push(SceneCommand::Destroy);
        app.update();
        app.update();
        assert!(app.scene().is_locked());

        let yaw = app.scene().record(&vase).map_or(0.0, |r| r.yaw);
        assert!(yaw.abs() > 0.0);
        let mut query = app.world_mut().query::<(&FragmentsRoot, &Transform)>();
        let rotation = query
            .iter(app.world())
            .find(|(r, _)| r.vase == vase)
            .map(|(_, t)| t.rotation)
            .expect("fragments root");
        assert!(rotation.angle_between(Quat::from_rotation_y(yaw)) < 1e-4);
    }
}
