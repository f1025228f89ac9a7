//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `VaseHeadlessPlugin` for testing scene logic
//! without a rendering or windowing backend.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::bevy::plugin::VaseHeadlessPlugin;
use crate::bevy::resources::{CommandQueue, PlaceholderFragments, SceneCommand, SceneRes};
use crate::bevy::Coin;
use crate::config::SceneConfig;
use crate::persistence::MemorySink;
use crate::scene::VaseScene;

/// Fixed frame length fed to both clocks.
pub const FRAME: Duration = Duration::from_micros(16_667);

/// A headless Bevy app wrapper for testing.
///
/// Every update advances real and virtual time by exactly [`FRAME`], so
/// frame-driven motion and wall-clock timers stay deterministic.
pub(crate) struct TestApp {
    pub app: App,
    pub sink: MemorySink,
}

impl TestApp {
    /// Default config with placeholder fragments for every vase.
    pub fn new() -> Self {
        Self::build(SceneConfig::default(), Some(PlaceholderFragments::default()))
    }

    /// Scene whose vases have no fragments loaded.
    pub fn without_fragments(config: SceneConfig) -> Self {
        Self::build(config, None)
    }

    fn build(config: SceneConfig, placeholder: Option<PlaceholderFragments>) -> Self {
        let sink = MemorySink::new();
        let scene = VaseScene::new(config, Box::new(sink.clone())).expect("valid config");

        let mut plugin = VaseHeadlessPlugin::new(scene);
        plugin.placeholder_fragments = placeholder;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(plugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        // Run one update to run startup and capture rest poses
        app.update();
        Self { app, sink }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Run enough frames to cover `duration`, plus one.
    pub fn run_for(&mut self, duration: Duration) {
        let frames = duration.as_micros().div_ceil(FRAME.as_micros()) + 1;
        for _ in 0..frames {
            self.app.update();
        }
    }

    /// Push a command to the command queue.
    pub fn push(&mut self, cmd: SceneCommand) {
        self.app.world().resource::<CommandQueue>().push(cmd);
    }

    /// Leaves the title and waits for the camera to settle.
    pub fn enter_scene(&mut self) {
        self.push(SceneCommand::EnterScene);
        self.update();
        let title = self.scene().config().camera.title.duration_secs;
        self.run_for(Duration::from_secs_f32(title) + Duration::from_millis(100));
    }

    pub fn scene(&self) -> &VaseScene {
        &self.app.world().resource::<SceneRes>().scene
    }

    /// Number of entities carrying `C`.
    pub fn count<C: Component>(&mut self) -> usize {
        let mut query = self.app.world_mut().query::<&C>();
        query.iter(self.app.world()).count()
    }

    /// Heights of every coin entity, in spawn order.
    pub fn coin_heights(&mut self) -> Vec<f32> {
        let mut query = self.app.world_mut().query::<(&Coin, &Transform)>();
        let mut coins: Vec<_> = query
            .iter(self.app.world())
            .map(|(coin, transform)| (coin.id, transform.translation.y))
            .collect();
        coins.sort_by_key(|(id, _)| *id);
        coins.into_iter().map(|(_, y)| y).collect()
    }

    /// Get a reference to the World.
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Get a mutable reference to the World.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
