//! The scene object driven by the lifecycle controller

use crate::scripting::{start_runtime, ScriptContext, ScriptRuntime, StartLatch};
use crate::state::{EngineState, SystemPolicy};
use crate::system::{SubsystemKind, SystemRegistry};
use ember_ecs::EmberWorld;
use std::path::PathBuf;

/// Everything a scene may touch while it runs
pub struct SceneContext<'a> {
    pub world: &'a mut EmberWorld,
    pub systems: &'a mut SystemRegistry,
    pub scripts: &'a mut dyn ScriptRuntime,
    pub state: EngineState,
    pub latch: &'a mut StartLatch,
    /// Scripts tick while stopped (editor preview)
    pub preview: bool,
    /// Scene switch requested by a script, applied after the frame
    pub pending_switch: &'a mut Option<PathBuf>,
}

/// Lifecycle of a loaded scene
///
/// Subsystem `init` is run by the controller before `initialize`, so the
/// scene sees a fully initialized world.
pub trait Scene: Send {
    fn initialize(&mut self, ctx: &mut SceneContext<'_>);

    /// Advance one frame: `dt` is the variable frame delta, `fixed_dt`
    /// the fixed step, `steps` the number of fixed steps owed.
    fn update(&mut self, ctx: &mut SceneContext<'_>, dt: f64, fixed_dt: f64, steps: u32);

    fn exit(&mut self, ctx: &mut SceneContext<'_>);
}

/// The standard gameplay scene
#[derive(Debug, Default)]
pub struct GameScene {
    frames: u64,
}

impl GameScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames updated since the scene was initialized
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Tick every script-bearing entity. Returns false if a script asked
    /// for a scene switch, in which case the rest of the frame is skipped.
    fn run_scripts(ctx: &mut SceneContext<'_>, dt: f64) -> bool {
        let entities = ctx.world.script_entities();
        let mut script_ctx = ScriptContext::new(ctx.world);

        if ctx.latch.fire() {
            for entity in &entities {
                ctx.scripts.on_start_entity(&mut script_ctx, *entity);
            }
        }

        for entity in entities {
            ctx.scripts.on_update_entity(&mut script_ctx, entity, dt);
            if let Some(path) = script_ctx.take_switch_request() {
                log::debug!("script on entity {} requested '{}'", entity, path.display());
                *ctx.pending_switch = Some(path);
                return false;
            }
        }

        true
    }
}

impl Scene for GameScene {
    fn initialize(&mut self, ctx: &mut SceneContext<'_>) {
        self.frames = 0;
        if let Some(path) = start_runtime(ctx.scripts, ctx.world) {
            *ctx.pending_switch = Some(path);
        }
        ctx.latch.arm();
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, dt: f64, fixed_dt: f64, steps: u32) {
        self.frames += 1;

        let scripts_tick = match ctx.state.gameplay_policy() {
            SystemPolicy::Run => {
                for _ in 0..steps {
                    ctx.systems
                        .update_in(&SubsystemKind::FIXED_ORDER, ctx.world, fixed_dt);
                }
                ctx.systems
                    .update_in(&SubsystemKind::GAMEPLAY_ORDER, ctx.world, dt);
                true
            }
            SystemPolicy::Pause => ctx.state == EngineState::Stopped && ctx.preview,
        };

        if scripts_tick && !Self::run_scripts(ctx, dt) {
            return;
        }

        ctx.systems
            .update_in(&SubsystemKind::FRAME_ORDER, ctx.world, dt);
    }

    fn exit(&mut self, ctx: &mut SceneContext<'_>) {
        ctx.systems.exit_all(ctx.world);
    }
}
