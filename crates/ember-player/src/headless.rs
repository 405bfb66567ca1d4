//! Window and subsystems for running without a display
//!
//! Used by `--frames` runs, CI smoke tests and the run loop tests.

use crate::run_loop::Window;
use ember_core::Result;
use ember_ecs::{EmberWorld, UI_COMPONENT};
use ember_runtime::{FramePresenter, InputState, Key, Subsystem, SubsystemKind, SystemRegistry};
use std::collections::BTreeMap;
use std::time::Duration;

/// A window that never opens
///
/// Closes itself after a fixed number of polled frames. Key presses can be
/// scripted per frame; a key pressed on frame `n` is released on frame `n + 1`.
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    frame_limit: Option<u64>,
    polls: u64,
    presented: u64,
    minimized: bool,
    focused: bool,
    close_requested: bool,
    frame_pacing: Option<Duration>,
    script: BTreeMap<u64, Vec<Key>>,
    held: Vec<Key>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }

    /// Close after `frames` polls
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Sleep this long after presenting each frame
    pub fn with_frame_pacing(mut self, pacing: Duration) -> Self {
        self.frame_pacing = Some(pacing);
        self
    }

    /// Press `key` during the poll of frame `frame` (0-based)
    pub fn press_on_frame(mut self, frame: u64, key: Key) -> Self {
        self.script.entry(frame).or_default().push(key);
        self
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Frames polled so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl FramePresenter for HeadlessWindow {
    fn present(&mut self) {
        self.presented += 1;
        if let Some(pacing) = self.frame_pacing {
            std::thread::sleep(pacing);
        }
    }
}

impl Window for HeadlessWindow {
    fn poll_events(&mut self, input: &mut InputState) {
        for key in self.held.drain(..) {
            input.process_key_up(key);
        }
        if let Some(keys) = self.script.remove(&self.polls) {
            for key in keys {
                input.process_key_down(key);
                self.held.push(key);
            }
        }
        self.polls += 1;
    }

    fn should_close(&self) -> bool {
        self.close_requested || self.frame_limit.is_some_and(|limit| self.polls >= limit)
    }

    fn is_minimized(&self) -> bool {
        self.minimized
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

/// Stand-in for a subsystem whose backend is not available
pub struct HeadlessSubsystem {
    kind: SubsystemKind,
    updates: u64,
}

impl HeadlessSubsystem {
    pub fn new(kind: SubsystemKind) -> Self {
        Self { kind, updates: 0 }
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Mark every dirty UI element as batched
    fn flush_ui(world: &mut EmberWorld) {
        for id in world.entities_with(UI_COMPONENT) {
            let Some(mut rect) = world.ui_rect(id) else {
                continue;
            };
            if !rect.dirty {
                continue;
            }
            rect.dirty = false;
            if let Err(e) = world.set_ui_rect(id, rect) {
                log::warn!("ui: could not update element {}: {}", id, e);
            }
        }
    }
}

impl Subsystem for HeadlessSubsystem {
    fn kind(&self) -> SubsystemKind {
        self.kind
    }

    fn init(&mut self, world: &mut EmberWorld) {
        log::debug!("{} (headless) init: {} entities", self.kind, world.entity_count());
    }

    fn update(&mut self, world: &mut EmberWorld, _dt: f64) {
        self.updates += 1;
        if self.kind == SubsystemKind::Ui {
            Self::flush_ui(world);
        }
    }

    fn exit(&mut self, _world: &mut EmberWorld) {
        log::debug!("{} (headless) exit after {} updates", self.kind, self.updates);
    }
}

/// A registry with a headless subsystem for every kind
pub fn headless_registry() -> Result<SystemRegistry> {
    let mut registry = SystemRegistry::new();
    for kind in SubsystemKind::INIT_ORDER {
        registry.register(Box::new(HeadlessSubsystem::new(kind)))?;
    }
    Ok(registry)
}
