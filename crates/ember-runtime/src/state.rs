//! Engine state machine for the editor play/pause/stop workflow.
//!
//! [`EngineState`] decides which subsystems run. Transitions are requested
//! with a [`StateEvent`]; the side effects of each transition (snapshots,
//! script hooks) are carried out by the scene controller.

use ember_core::{EmberError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Controls whether a group of systems runs or is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPolicy {
    /// System runs normally.
    Run,
    /// System is paused (state preserved but not ticked).
    Pause,
}

/// Whether the engine is simulating the loaded scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// A request to move the engine between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    /// Enter play mode, or resume from pause.
    Play,
    Pause,
    /// Leave play mode, discarding everything changed since Play.
    Stop,
    /// Restart the current play session from its snapshot.
    Reload,
    /// Run scripts while stopped (editor preview).
    TogglePreview,
}

/// Which kind of build the engine runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Editor build: scenes load stopped and wait for Play.
    #[default]
    Editor,
    /// Shipped game: scenes start playing as soon as they load.
    Shipped,
}

impl EngineState {
    /// Policy for fixed-step and gameplay subsystems.
    pub fn gameplay_policy(self) -> SystemPolicy {
        match self {
            EngineState::Playing => SystemPolicy::Run,
            EngineState::Stopped | EngineState::Paused => SystemPolicy::Pause,
        }
    }

    /// The state an event leads to, or an error if the event is not
    /// valid in this state.
    pub fn next(self, event: StateEvent) -> Result<EngineState> {
        use EngineState::*;
        use StateEvent::*;

        match (self, event) {
            (Stopped, Play) | (Paused, Play) => Ok(Playing),
            (Playing, Pause) => Ok(Paused),
            (Playing, Stop) | (Paused, Stop) => Ok(Stopped),
            (Playing, Reload) | (Paused, Reload) => Ok(self),
            (Stopped, TogglePreview) => Ok(Stopped),
            _ => Err(EmberError::InvalidTransition {
                from: self.to_string(),
                event: event.to_string(),
            }),
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Stopped => "stopped",
            EngineState::Playing => "playing",
            EngineState::Paused => "paused",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateEvent::Play => "play",
            StateEvent::Pause => "pause",
            StateEvent::Stop => "stop",
            StateEvent::Reload => "reload",
            StateEvent::TogglePreview => "toggle-preview",
        };
        f.write_str(name)
    }
}
