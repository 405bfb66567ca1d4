//! Engine subsystems and the order they run in

use crate::profile::{FrameProfiler, ProfileCategory};
use ember_core::{EmberError, Result};
use ember_ecs::EmberWorld;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// The engine subsystems the scene lifecycle knows how to sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsystemKind {
    Transform,
    Render,
    Ui,
    Physics,
    Audio,
    Animation,
    Video,
    StateMachine,
    Camera,
}

impl SubsystemKind {
    /// Order subsystems are initialized in when a scene loads
    pub const INIT_ORDER: [SubsystemKind; 9] = [
        SubsystemKind::Transform,
        SubsystemKind::Render,
        SubsystemKind::Ui,
        SubsystemKind::Physics,
        SubsystemKind::Audio,
        SubsystemKind::Animation,
        SubsystemKind::Video,
        SubsystemKind::StateMachine,
        SubsystemKind::Camera,
    ];

    /// Stepped once per owed fixed step, only while playing
    pub const FIXED_ORDER: [SubsystemKind; 2] = [SubsystemKind::Physics, SubsystemKind::Audio];

    /// Variable-step subsystems that only run while playing
    pub const GAMEPLAY_ORDER: [SubsystemKind; 1] = [SubsystemKind::Video];

    /// Variable-step subsystems that run every frame in every state
    pub const FRAME_ORDER: [SubsystemKind; 6] = [
        SubsystemKind::Camera,
        SubsystemKind::StateMachine,
        SubsystemKind::Transform,
        SubsystemKind::Ui,
        SubsystemKind::Render,
        SubsystemKind::Animation,
    ];

    /// Order subsystems are shut down in when a scene exits
    pub const EXIT_ORDER: [SubsystemKind; 9] = [
        SubsystemKind::Transform,
        SubsystemKind::Ui,
        SubsystemKind::Render,
        SubsystemKind::Camera,
        SubsystemKind::Physics,
        SubsystemKind::Audio,
        SubsystemKind::Animation,
        SubsystemKind::Video,
        SubsystemKind::StateMachine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SubsystemKind::Transform => "transform",
            SubsystemKind::Render => "render",
            SubsystemKind::Ui => "ui",
            SubsystemKind::Physics => "physics",
            SubsystemKind::Audio => "audio",
            SubsystemKind::Animation => "animation",
            SubsystemKind::Video => "video",
            SubsystemKind::StateMachine => "state_machine",
            SubsystemKind::Camera => "camera",
        }
    }

    /// Profiler bucket this subsystem's time is reported under
    pub fn category(self) -> ProfileCategory {
        match self {
            SubsystemKind::Physics => ProfileCategory::Physics,
            SubsystemKind::Render | SubsystemKind::Ui => ProfileCategory::Graphics,
            SubsystemKind::Audio => ProfileCategory::Audio,
            _ => ProfileCategory::Misc,
        }
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A subsystem driven by the scene lifecycle
///
/// Subsystems own their own failure handling; the lifecycle never inspects
/// a result.
pub trait Subsystem: Send {
    fn kind(&self) -> SubsystemKind;

    /// Called when a scene loads, after its entities are in the world
    fn init(&mut self, world: &mut EmberWorld);

    /// Called once per frame, or once per fixed step for fixed-step kinds
    fn update(&mut self, world: &mut EmberWorld, dt: f64);

    /// Called when the scene that was initialized exits
    fn exit(&mut self, world: &mut EmberWorld);

    /// Human-readable name for this subsystem
    fn name(&self) -> &str {
        self.kind().name()
    }
}

/// Registered subsystems, at most one per kind
#[derive(Default)]
pub struct SystemRegistry {
    systems: BTreeMap<SubsystemKind, Box<dyn Subsystem>>,
    profiler: FrameProfiler,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subsystem. Each kind may be registered once.
    pub fn register(&mut self, system: Box<dyn Subsystem>) -> Result<()> {
        let kind = system.kind();
        if self.systems.contains_key(&kind) {
            return Err(EmberError::DuplicateSubsystem(kind.to_string()));
        }
        log::debug!("registered subsystem '{}' as {}", system.name(), kind);
        self.systems.insert(kind, system);
        Ok(())
    }

    pub fn with(mut self, system: Box<dyn Subsystem>) -> Result<Self> {
        self.register(system)?;
        Ok(self)
    }

    pub fn contains(&self, kind: SubsystemKind) -> bool {
        self.systems.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Registered kinds, in init order
    pub fn registered(&self) -> Vec<SubsystemKind> {
        SubsystemKind::INIT_ORDER
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    /// Initialize one subsystem. Unregistered kinds are skipped.
    pub fn init(&mut self, kind: SubsystemKind, world: &mut EmberWorld) {
        if let Some(system) = self.systems.get_mut(&kind) {
            log::debug!("init {}", kind);
            system.init(world);
        }
    }

    /// Update one subsystem and record its time in the profiler
    pub fn update(&mut self, kind: SubsystemKind, world: &mut EmberWorld, dt: f64) {
        if let Some(system) = self.systems.get_mut(&kind) {
            let start = Instant::now();
            system.update(world, dt);
            self.profiler.record(kind.category(), start.elapsed());
        }
    }

    /// Update each kind in `order` once
    pub fn update_in(&mut self, order: &[SubsystemKind], world: &mut EmberWorld, dt: f64) {
        for kind in order {
            self.update(*kind, world, dt);
        }
    }

    pub fn exit(&mut self, kind: SubsystemKind, world: &mut EmberWorld) {
        if let Some(system) = self.systems.get_mut(&kind) {
            log::debug!("exit {}", kind);
            system.exit(world);
        }
    }

    /// Shut down every subsystem in exit order
    pub fn exit_all(&mut self, world: &mut EmberWorld) {
        for kind in SubsystemKind::EXIT_ORDER {
            self.exit(kind, world);
        }
    }

    pub fn profiler(&self) -> &FrameProfiler {
        &self.profiler
    }

    pub fn profiler_mut(&mut self) -> &mut FrameProfiler {
        &mut self.profiler
    }
}
