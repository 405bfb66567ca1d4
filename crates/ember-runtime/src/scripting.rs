//! Hooks into the scripting runtime

use ember_core::EntityId;
use ember_ecs::EmberWorld;
use std::path::PathBuf;

/// What a script callback can reach
pub struct ScriptContext<'a> {
    pub world: &'a mut EmberWorld,
    switch_request: Option<PathBuf>,
}

impl<'a> ScriptContext<'a> {
    pub fn new(world: &'a mut EmberWorld) -> Self {
        Self {
            world,
            switch_request: None,
        }
    }

    /// Ask for the scene to be replaced once the current frame finishes
    ///
    /// The last request of a frame wins.
    pub fn request_scene_switch(&mut self, path: impl Into<PathBuf>) {
        self.switch_request = Some(path.into());
    }

    pub fn switch_requested(&self) -> bool {
        self.switch_request.is_some()
    }

    pub fn take_switch_request(&mut self) -> Option<PathBuf> {
        self.switch_request.take()
    }
}

/// The scripting runtime as seen by the scene lifecycle
///
/// Script-bearing entities are the ones carrying the `script` component.
pub trait ScriptRuntime: Send {
    /// The runtime is (re)started against a freshly loaded world
    fn on_runtime_start(&mut self, world: &mut EmberWorld);

    /// Every script instance is discarded
    fn on_runtime_stop(&mut self);

    /// A script instance is created for an entity
    fn on_create_entity(&mut self, ctx: &mut ScriptContext<'_>, entity: EntityId);

    /// First frame the entity's script ticks after a (re)start
    fn on_start_entity(&mut self, ctx: &mut ScriptContext<'_>, entity: EntityId);

    fn on_update_entity(&mut self, ctx: &mut ScriptContext<'_>, entity: EntityId, dt: f64);
}

/// Runtime with no scripts attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScriptRuntime;

impl ScriptRuntime for NullScriptRuntime {
    fn on_runtime_start(&mut self, _world: &mut EmberWorld) {}

    fn on_runtime_stop(&mut self) {}

    fn on_create_entity(&mut self, _ctx: &mut ScriptContext<'_>, _entity: EntityId) {}

    fn on_start_entity(&mut self, _ctx: &mut ScriptContext<'_>, _entity: EntityId) {}

    fn on_update_entity(&mut self, _ctx: &mut ScriptContext<'_>, _entity: EntityId, _dt: f64) {}
}

/// Start the runtime and create an instance for every script-bearing entity
///
/// Returns a scene switch requested by a create callback, if any.
pub fn start_runtime(scripts: &mut dyn ScriptRuntime, world: &mut EmberWorld) -> Option<PathBuf> {
    scripts.on_runtime_start(world);

    let mut ctx = ScriptContext::new(world);
    for entity in ctx.world.script_entities() {
        scripts.on_create_entity(&mut ctx, entity);
    }
    ctx.take_switch_request()
}

/// Edge-triggered flag that fires the per-entity start callbacks once
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StartLatch {
    armed: bool,
}

impl StartLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns true exactly once per `arm`
    pub fn fire(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}
