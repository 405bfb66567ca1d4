//! Ember Runtime - Simulation clock and scene lifecycle
//!
//! Provides the building blocks the player loop drives each frame:
//! - `Clock` - fixed-timestep accumulator and FPS window
//! - `EngineState` / `StateEvent` - editor play/pause/stop state machine
//! - `Subsystem` / `SystemRegistry` - ordered engine subsystems
//! - `Scene` / `GameScene` - per-scene lifecycle object
//! - `SceneLifecycleController` - load, swap, snapshot and restore scenes
//! - `MainThreadQueue` - work handed to the main thread from other threads
//! - `InputState` - keyboard tracking with action bindings

mod clock;
mod deferred;
mod input;
mod loading;
mod profile;
mod scene;
mod scene_manager;
mod scripting;
mod state;
mod system;

pub use clock::{Clock, ManualTimeSource, MonotonicTimeSource, TimeSource, MAX_FPS_INTERVAL};
pub use deferred::{Deferred, MainThreadQueue, MainThreadSender};
pub use input::{InputState, Key};
pub use loading::{
    loading_entity_name, FadeKeyframe, LoadingConfig, LoadingScreen, FADE_KEYFRAMES,
    LOADING_ENTITY_PREFIX,
};
pub use profile::{FrameBreakdown, FrameProfiler, ProfileCategory};
pub use scene::{GameScene, Scene, SceneContext};
pub use scene_manager::{
    ControllerQueue, FramePresenter, NullPresenter, SceneFactory, SceneLifecycleController,
};
pub use scripting::{start_runtime, NullScriptRuntime, ScriptContext, ScriptRuntime, StartLatch};
pub use state::{BuildMode, EngineState, StateEvent, SystemPolicy};
pub use system::{Subsystem, SubsystemKind, SystemRegistry};
