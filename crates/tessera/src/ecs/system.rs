//! # System: Behaviour Attached to a Scene
//!
//! A system reads and writes components of the scene tree once per frame. It
//! has two optional phases:
//!
//! - `update`: game logic, with mutable access to the scene and read access to
//!   input, time and config (bundled in [`UpdateContext`]).
//! - `draw`: submit sprites to a [`Canvas`]. Runs between `begin_draw` and
//!   `end_draw`, after every system's `update`.
//!
//! Any `FnMut(&mut UpdateContext)` is an update-only system, so small pieces
//! of game logic can be closures.
//!
//! ## Schedule
//!
//! A [`Schedule`] is a `Vec` of systems. Both phases visit them in insertion
//! order; that order is the only guarantee. Systems never run in parallel.
//!
//! ```text
//!  run_update:  sys0.update → sys1.update → sys2.update
//!  run_draw:    sys0.draw   → sys1.draw   → sys2.draw
//! ```
//!
//! Systems locate their data by child name on each call instead of holding
//! references into the tree, so adding or removing entities between frames
//! never invalidates a system.

use super::entity::Entity;
use crate::config::EngineConfig;
use crate::input::Input;
use crate::render::Canvas;
use crate::time::Time;

/// What an update phase may touch.
pub struct UpdateContext<'a> {
    pub scene: &'a mut Entity,
    pub input: &'a Input,
    pub time: &'a Time,
    pub config: &'a EngineConfig,
}

pub trait System {
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn draw(&mut self, _scene: &mut Entity, _canvas: &mut dyn Canvas) {}
}

/// Blanket impl: any `FnMut(&mut UpdateContext)` is an update-only `System`.
impl<F: FnMut(&mut UpdateContext<'_>)> System for F {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        (self)(ctx);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// An ordered list of systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
}

impl Schedule {
    pub fn new() -> Self {
        Self { systems: Vec::new() }
    }

    /// Append a system. It runs after every system added before it.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> &mut Self {
        let name = short_system_name(std::any::type_name::<S>());
        log::debug!("Schedule: adding system #{} `{name}`", self.systems.len());
        self.systems.push(NamedSystem {
            name,
            system: Box::new(system),
        });
        self
    }

    pub fn run_update(&mut self, ctx: &mut UpdateContext<'_>) {
        for ns in &mut self.systems {
            ns.system.update(ctx);
        }
    }

    pub fn run_draw(&mut self, scene: &mut Entity, canvas: &mut dyn Canvas) {
        for ns in &mut self.systems {
            ns.system.draw(scene, canvas);
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Short names of the systems, in run order.
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|ns| ns.name.as_str()).collect()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schedule").field("systems", &self.names()).finish()
    }
}

/// Last path segment of a type name, generics stripped
/// (`tessera::systems::MovementSystem` → `MovementSystem`, closures → `<closure>`).
fn short_system_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if full.contains("{{closure}}") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Material;
    use crate::math::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn count_frames(ctx: &mut UpdateContext<'_>) {
        let frames = ctx.scene.named_component::<u32>("frames");
        *frames += 1;
    }

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for Recorder {
        fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
            self.log.borrow_mut().push(format!("update {}", self.tag));
        }

        fn draw(&mut self, _scene: &mut Entity, _canvas: &mut dyn Canvas) {
            self.log.borrow_mut().push(format!("draw {}", self.tag));
        }
    }

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn draw(&mut self, _src: Rect, _dest: Rect, _material: &Material) {}
    }

    fn run_frame(schedule: &mut Schedule, scene: &mut Entity) {
        let (input, time, config) = (Input::new(), Time::new(), EngineConfig::default());
        let mut ctx = UpdateContext {
            scene: &mut *scene,
            input: &input,
            time: &time,
            config: &config,
        };
        schedule.run_update(&mut ctx);
        schedule.run_draw(scene, &mut NullCanvas);
    }

    #[test]
    fn schedule_captures_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(count_frames);
        schedule.add_system(|_ctx: &mut UpdateContext<'_>| {});
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.names(), vec!["count_frames", "<closure>"]);
    }

    #[test]
    fn short_name_strips_path_and_generics() {
        assert_eq!(short_system_name("tessera::systems::MovementSystem"), "MovementSystem");
        assert_eq!(short_system_name("game::Wrapper<alloc::string::String>"), "Wrapper");
        assert_eq!(short_system_name("game::main::{{closure}}"), "<closure>");
    }

    #[test]
    fn function_systems_mutate_scene() {
        let mut scene = Entity::new();
        scene.add_named_component("frames", 0u32);
        let mut schedule = Schedule::new();
        schedule.add_system(count_frames);

        for _ in 0..3 {
            run_frame(&mut schedule, &mut scene);
        }
        assert_eq!(*scene.named_component::<u32>("frames"), 3);
    }

    #[test]
    fn phases_run_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule
            .add_system(Recorder { tag: "a", log: log.clone() })
            .add_system(Recorder { tag: "b", log: log.clone() });

        let mut scene = Entity::new();
        run_frame(&mut schedule, &mut scene);

        assert_eq!(*log.borrow(), vec!["update a", "update b", "draw a", "draw b"]);
    }

    #[test]
    fn empty_schedule() {
        let schedule = Schedule::default();
        assert!(schedule.is_empty());
        assert!(schedule.names().is_empty());
    }
}
