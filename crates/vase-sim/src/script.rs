//! Scripted headless session.
//!
//! Drives a headless app through title, navigation, destroys, coins and an
//! appearance edit, then reports what the scene ended up with.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use vase_core::bevy::{
    CommandQueue, PlaceholderFragments, SceneCommand, SceneRes, VaseHeadlessPlugin,
};
use vase_core::scene::VaseScene;
use vase_core::vase::{Color, NavDirection, VaseAppearance};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Debug, Clone, Copy)]
pub struct ScriptOptions {
    pub destroys: u32,
    pub coins: u32,
}

/// What the scene looked like after the script.
#[derive(Debug)]
pub struct SessionReport {
    pub frames: u64,
    pub destroy_counts: Vec<(String, u32)>,
    pub coins: usize,
    pub locked: bool,
}

struct Runner {
    app: App,
    queue: CommandQueue,
    frames: u64,
}

impl Runner {
    fn new(scene: VaseScene) -> Self {
        let queue = CommandQueue::new();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(
            VaseHeadlessPlugin::new(scene)
                .with_command_queue(queue.clone())
                .with_placeholder_fragments(PlaceholderFragments::default()),
        );
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        app.update();
        Self {
            app,
            queue,
            frames: 1,
        }
    }

    fn scene(&self) -> &VaseScene {
        &self.app.world().resource::<SceneRes>().scene
    }

    fn send(&mut self, command: SceneCommand) {
        self.queue.push(command);
        self.step();
    }

    fn step(&mut self) {
        self.app.update();
        self.frames += 1;
    }

    fn run_for(&mut self, duration: Duration) {
        let frames = duration.as_micros().div_ceil(FRAME.as_micros());
        for _ in 0..frames {
            self.step();
        }
    }

    /// Steps until the camera settles and no vase is shattering.
    fn settle(&mut self, limit: Duration) {
        let max_frames = limit.as_micros().div_ceil(FRAME.as_micros());
        for _ in 0..max_frames {
            if !self.scene().is_camera_animating() && !self.scene().is_locked() {
                return;
            }
            self.step();
        }
        tracing::warn!("[script] scene did not settle within {:?}", limit);
    }
}

pub fn run(scene: VaseScene, options: ScriptOptions) -> SessionReport {
    let limit = Duration::from_secs(10);
    let mut runner = Runner::new(scene);

    tracing::info!("[script] entering scene");
    runner.send(SceneCommand::EnterScene);
    runner.settle(limit);

    for round in 0..options.destroys {
        tracing::info!("[script] destroy round {}", round + 1);
        runner.send(SceneCommand::Destroy);
        // A second tap while shattering restarts the sequence.
        runner.run_for(Duration::from_millis(200));
        runner.send(SceneCommand::Destroy);
        runner.settle(limit);

        runner.send(SceneCommand::Navigate {
            direction: NavDirection::Next,
        });
        runner.settle(limit);
    }

    for _ in 0..options.coins {
        runner.send(SceneCommand::ManifestCoin);
        runner.run_for(Duration::from_millis(100));
    }
    runner.run_for(Duration::from_secs(2));

    if let Some(vase) = runner.scene().focused_vase().cloned() {
        let appearance = VaseAppearance {
            label: Some("scripted".to_string()),
            ..VaseAppearance::plain(Color::COBALT)
        };
        runner.send(SceneCommand::SetAppearance { vase, appearance });
        runner.send(SceneCommand::FlushAppearances);
    }

    let scene = runner.scene();
    SessionReport {
        frames: runner.frames,
        destroy_counts: scene
            .records()
            .iter()
            .map(|record| (record.id.to_string(), record.destroy_count))
            .collect(),
        coins: scene.coins().coin_count(),
        locked: scene.is_locked(),
    }
}
