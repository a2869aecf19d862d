//! The frame loop.
//!
//! A [`Game`] owns the scene root, the batch renderer, the system schedule and
//! the per-frame state (input, time). The application owns the window: it
//! feeds input, calls [`Game::frame`] once per display refresh, and stops when
//! [`Game::should_exit`] says so.
//!
//! ```ignore
//! let mut game = Game::new(gpu, EngineConfig::load("tessera.json")?)
//!     .add_system(MovementSystem::new("player", Keyboard::default()))
//!     .add_system(CameraSystem::new("player", "camera"))
//!     .add_system(SpriteDrawSystem::with_camera("camera"));
//! build_level(game.scene_mut());
//!
//! while !game.should_exit() {
//!     game.input_mut().refresh(&held_keys());
//!     game.frame();
//! }
//! game.shutdown();
//! ```
//!
//! ## One Frame
//!
//! ```text
//!  time.tick
//!  update phase   every system's update, schedule order
//!  clear          config.clear_color
//!  begin_draw
//!  draw phase     every system's draw, schedule order
//!  end_draw       final flush
//!  display        unbatched leftovers (normally nothing)
//!  present
//! ```
//!
//! The phases never interleave: no system sees a half-drawn frame, and no
//! draw sees a half-updated scene.

use std::time::Duration;

use crate::config::EngineConfig;
use crate::ecs::{Census, Entity, Schedule, System, UpdateContext, census};
use crate::input::{Input, Key};
use crate::logger::{self, Severity};
use crate::render::{BatchRenderer, BatchStats, Gpu};
use crate::time::Time;

pub struct Game {
    scene: Entity,
    renderer: BatchRenderer,
    schedule: Schedule,
    input: Input,
    time: Time,
    config: EngineConfig,
    gpu: Gpu,
    /// Census before the scene existed, to tell our leaks from the caller's.
    baseline: Census,
}

impl Game {
    pub fn new(gpu: Gpu, config: EngineConfig) -> Self {
        let baseline = census::snapshot();
        log::info!(
            "Initializing game {}x{} (tile {}, max sprites {}, {:?} capacity)",
            config.width,
            config.height,
            config.tile_size,
            config.max_sprites,
            config.capacity
        );
        let renderer = BatchRenderer::from_config(gpu.clone(), &config);
        Self {
            scene: Entity::new(),
            renderer,
            schedule: Schedule::new(),
            input: Input::new(),
            time: Time::new(),
            config,
            gpu,
            baseline,
        }
    }

    /// Add a system that runs every frame, after those added before it.
    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.schedule.add_system(system);
        self
    }

    pub fn scene(&self) -> &Entity {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Entity {
        &mut self.scene
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The backend the game's GPU components should be created on.
    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Sprite and draw call counts of the last frame.
    pub fn stats(&self) -> BatchStats {
        self.renderer.stats()
    }

    /// Run one frame, timed by the wall clock.
    pub fn frame(&mut self) {
        self.time.tick();
        self.run_phases();
    }

    /// Run one frame with a fixed time step.
    pub fn step(&mut self, delta: Duration) {
        self.time.advance(delta);
        self.run_phases();
    }

    fn run_phases(&mut self) {
        let mut ctx = UpdateContext {
            scene: &mut self.scene,
            input: &self.input,
            time: &self.time,
            config: &self.config,
        };
        self.schedule.run_update(&mut ctx);

        let [r, g, b, a] = self.config.clear_color.map(f32::from);
        self.renderer.clear(r, g, b, a);
        self.renderer.begin_draw();
        self.schedule.run_draw(&mut self.scene, &mut self.renderer);
        self.renderer.end_draw();
        self.renderer.display();
        self.gpu.with(|backend| backend.present());

        let stats = self.renderer.stats();
        log::trace!(
            "Frame {}: {} sprites in {} draw calls",
            self.time.frame_count(),
            stats.sprites,
            stats.draw_calls
        );
        self.input.clear_just();
    }

    /// An error requested an exit, or Escape is held.
    pub fn should_exit(&self) -> bool {
        logger::exit_requested() || self.input.pressed(Key::Escape)
    }

    /// Tear the scene down and report what is still alive.
    ///
    /// Returns the census relative to when the game was created; anything
    /// non-zero is a leak (an entity or component kept alive elsewhere).
    pub fn shutdown(self) -> Census {
        let Game {
            scene,
            renderer,
            schedule,
            baseline,
            ..
        } = self;
        drop(schedule);
        drop(scene);
        drop(renderer);

        let left = census::snapshot().since(&baseline);
        if left.is_clean() {
            log::info!("Shutdown clean");
        } else {
            logger::warning(
                format!(
                    "{} entities and {} components still alive at shutdown",
                    left.entities, left.components
                ),
                Severity::Medium,
            );
        }
        left
    }
}
