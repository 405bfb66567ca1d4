//! Application driver: one clock tick and one scene update per frame

use ember_core::Result;
use ember_runtime::{
    BuildMode, Clock, ControllerQueue, FramePresenter, InputState, MainThreadSender,
    SceneLifecycleController, StateEvent,
};
use std::path::Path;

/// The platform window the loop runs in
pub trait Window: FramePresenter {
    /// Pump pending OS events into `input`
    fn poll_events(&mut self, input: &mut InputState);

    fn should_close(&self) -> bool;

    fn is_minimized(&self) -> bool;

    fn is_focused(&self) -> bool;
}

/// Editor actions and the state events they trigger
pub const EDITOR_BINDINGS: [(&str, StateEvent); 5] = [
    ("editor_play", StateEvent::Play),
    ("editor_pause", StateEvent::Pause),
    ("editor_stop", StateEvent::Stop),
    ("editor_reload", StateEvent::Reload),
    ("editor_preview", StateEvent::TogglePreview),
];

/// Owns the clock, the scene controller and the window, and runs frames
/// until the window closes or the loop is stopped.
pub struct RunLoop<W: Window> {
    clock: Clock,
    controller: SceneLifecycleController,
    input: InputState,
    window: W,
    queue: ControllerQueue,
    running: bool,
}

impl<W: Window> RunLoop<W> {
    pub fn new(clock: Clock, controller: SceneLifecycleController, window: W) -> Self {
        Self {
            clock,
            controller,
            input: InputState::new(),
            window,
            queue: ControllerQueue::new(),
            running: false,
        }
    }

    /// Handle for queueing controller work from other threads
    pub fn sender(&self) -> MainThreadSender<SceneLifecycleController> {
        self.queue.sender()
    }

    /// Load the first scene, presenting through the window
    pub fn load_start_scene(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.controller.load_scene(path, &mut self.window)
    }

    /// Run frames until the window closes or [`stop`](Self::stop) is called,
    /// then exit the active scene.
    pub fn run(&mut self) {
        self.clock.start();
        self.running = true;
        log::info!("run loop started ({:?} build)", self.controller.build_mode());

        while self.running && !self.window.should_close() {
            self.step();
        }

        self.running = false;
        self.controller.exit_scene();
        log::info!("run loop finished after {} frames", self.clock.frame_count());
    }

    /// Run a single frame
    pub fn step(&mut self) {
        let editor = self.controller.build_mode() == BuildMode::Editor;

        if !editor && (self.window.is_minimized() || !self.window.is_focused()) {
            self.window.poll_events(&mut self.input);
            return;
        }

        self.window.poll_events(&mut self.input);
        if editor {
            self.controller.systems_mut().profiler_mut().begin_frame();
        }

        self.clock.tick();
        self.controller.update_scene(
            self.clock.delta_seconds(),
            self.clock.fixed_step_seconds(),
            self.clock.steps_this_frame(),
        );

        if let Some(next) = self.controller.take_pending_switch() {
            if let Err(e) = self.controller.load_scene(&next, &mut self.window) {
                log::error!("scene switch to '{}' failed: {}", next.display(), e);
            }
        }

        let drained = self.controller.drain(&self.queue);
        if drained > 0 {
            log::debug!("ran {} main-thread callbacks", drained);
        }

        if editor {
            self.editor_maintenance();
        }

        if self.input.is_action_just_pressed("quit") {
            self.stop();
        }

        self.window.present();
        self.input.end_frame();
    }

    /// Ask the loop to finish after the current frame
    pub fn stop(&mut self) {
        self.running = false;
    }

    fn editor_maintenance(&mut self) {
        for (action, event) in EDITOR_BINDINGS {
            if !self.input.is_action_just_pressed(action) {
                continue;
            }
            if let Err(e) = self.controller.handle_event(event) {
                log::warn!("{} ignored: {}", action, e);
            }
        }

        let breakdown = self.controller.systems_mut().profiler_mut().end_frame();
        if self.clock.fps_updated() {
            log::debug!("{:.1} fps | {}", self.clock.fps(), breakdown);
        }
    }

    // --- Accessors ---

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn controller(&self) -> &SceneLifecycleController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SceneLifecycleController {
        &mut self.controller
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{headless_registry, HeadlessWindow};
    use ember_core::EntityId;
    use ember_ecs::EmberWorld;
    use ember_runtime::{
        EngineState, Key, LoadingConfig, ManualTimeSource, NullScriptRuntime, ScriptContext,
        ScriptRuntime,
    };
    use ember_scene::TomlSceneSerializer;
    use std::fs;
    use std::path::PathBuf;

    /// Headless window that advances a manual clock by a fixed delta per poll
    struct TimedWindow {
        inner: HeadlessWindow,
        time: ManualTimeSource,
        frame_seconds: f64,
    }

    impl FramePresenter for TimedWindow {
        fn present(&mut self) {
            self.inner.present();
        }
    }

    impl Window for TimedWindow {
        fn poll_events(&mut self, input: &mut InputState) {
            self.time.advance(self.frame_seconds);
            self.inner.poll_events(input);
        }

        fn should_close(&self) -> bool {
            self.inner.should_close()
        }

        fn is_minimized(&self) -> bool {
            self.inner.is_minimized()
        }

        fn is_focused(&self) -> bool {
            self.inner.is_focused()
        }
    }

    /// Sends every script entity through the portal named by its `portal` component
    struct Portal;

    impl ScriptRuntime for Portal {
        fn on_runtime_start(&mut self, _world: &mut EmberWorld) {}

        fn on_runtime_stop(&mut self) {}

        fn on_create_entity(&mut self, _ctx: &mut ScriptContext<'_>, _entity: EntityId) {}

        fn on_start_entity(&mut self, _ctx: &mut ScriptContext<'_>, _entity: EntityId) {}

        fn on_update_entity(&mut self, ctx: &mut ScriptContext<'_>, entity: EntityId, _dt: f64) {
            if let Some(target) = ctx
                .world
                .get_component(entity, "portal")
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
            {
                ctx.request_scene_switch(target);
            }
        }
    }

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("ember_player_{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("a.scene.toml"),
                "[scene]\nname = \"a\"\n\n[entities.hero.health]\ncurrent = 100\n",
            )
            .unwrap();
            fs::write(
                dir.join("b.scene.toml"),
                "[scene]\nname = \"b\"\n\n[entities.gate.door]\nlocked = true\n",
            )
            .unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.join(name)
        }

        fn write(&self, name: &str, content: &str) {
            fs::write(self.path(name), content).unwrap();
        }

        fn run_loop(
            &self,
            build_mode: BuildMode,
            scripts: Box<dyn ScriptRuntime>,
            window: HeadlessWindow,
        ) -> RunLoop<TimedWindow> {
            let time = ManualTimeSource::new();
            let clock = Clock::with_time_source(Box::new(time.clone()), 1.0 / 60.0);
            let controller = SceneLifecycleController::new(
                headless_registry().unwrap(),
                scripts,
                Box::new(TomlSceneSerializer::new()),
            )
            .with_build_mode(build_mode)
            .with_loading_config(LoadingConfig {
                enabled: false,
                ..LoadingConfig::default()
            });
            let window = TimedWindow {
                inner: window,
                time,
                frame_seconds: 0.02,
            };
            RunLoop::new(clock, controller, window)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.dir).ok();
        }
    }

    #[test]
    fn runs_until_frame_limit_then_exits_scene() {
        let fx = Fixture::new();
        let mut run = fx.run_loop(
            BuildMode::Editor,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new().with_frame_limit(5),
        );
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();

        run.run();

        assert!(!run.is_running());
        assert_eq!(run.clock().frame_count(), 5);
        assert_eq!(run.window().inner.presented(), 5);
        assert!(!run.controller().has_scene());
        assert!((run.clock().elapsed_seconds() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn editor_keys_drive_state() {
        let fx = Fixture::new();
        let window = HeadlessWindow::new()
            .with_frame_limit(6)
            .press_on_frame(1, Key::F5)
            .press_on_frame(2, Key::F6)
            .press_on_frame(3, Key::F5);
        let mut run = fx.run_loop(BuildMode::Editor, Box::new(NullScriptRuntime), window);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.clock.start();
        run.running = true;

        run.step();
        assert_eq!(run.controller().state(), EngineState::Stopped);

        run.step();
        assert_eq!(run.controller().state(), EngineState::Playing);
        let temp = run.controller().temp_snapshot_path().unwrap();
        assert!(temp.exists());

        run.step();
        assert_eq!(run.controller().state(), EngineState::Paused);

        run.step();
        assert_eq!(run.controller().state(), EngineState::Playing);
    }

    #[test]
    fn stop_key_restores_snapshot() {
        let fx = Fixture::new();
        let window = HeadlessWindow::new()
            .press_on_frame(0, Key::F5)
            .press_on_frame(2, Key::F7);
        let mut run = fx.run_loop(BuildMode::Editor, Box::new(NullScriptRuntime), window);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        run.step();
        assert_eq!(run.controller().state(), EngineState::Playing);
        let hero = run.controller().world().get_id("hero").unwrap();
        run.controller_mut()
            .world_mut()
            .set_component(hero, "health", toml::Value::Integer(1))
            .unwrap();

        run.step();
        run.step();

        assert_eq!(run.controller().state(), EngineState::Stopped);
        let hero = run.controller().world().get_id("hero").unwrap();
        let health = run
            .controller()
            .world()
            .get_component(hero, "health")
            .and_then(|v| v.get("current"))
            .and_then(|v| v.as_integer());
        assert_eq!(health, Some(100));
    }

    #[test]
    fn rejected_transition_keeps_running() {
        let fx = Fixture::new();
        let window = HeadlessWindow::new().press_on_frame(0, Key::F6);
        let mut run = fx.run_loop(BuildMode::Editor, Box::new(NullScriptRuntime), window);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        run.step();

        assert!(run.is_running());
        assert_eq!(run.controller().state(), EngineState::Stopped);
    }

    #[test]
    fn shipped_build_ignores_editor_keys() {
        let fx = Fixture::new();
        let window = HeadlessWindow::new().press_on_frame(0, Key::F7);
        let mut run = fx.run_loop(BuildMode::Shipped, Box::new(NullScriptRuntime), window);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        assert_eq!(run.controller().state(), EngineState::Playing);
        run.step();
        assert_eq!(run.controller().state(), EngineState::Playing);
    }

    #[test]
    fn shipped_build_skips_frames_while_minimized() {
        let fx = Fixture::new();
        let mut run = fx.run_loop(
            BuildMode::Shipped,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new(),
        );
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        run.window_mut().inner.set_minimized(true);
        run.step();
        run.step();
        assert_eq!(run.clock().frame_count(), 0);
        assert_eq!(run.window().inner.polls(), 2);
        assert_eq!(run.window().inner.presented(), 0);

        run.window_mut().inner.set_minimized(false);
        run.window_mut().inner.set_focused(false);
        run.step();
        assert_eq!(run.clock().frame_count(), 0);

        run.window_mut().inner.set_focused(true);
        run.step();
        assert_eq!(run.clock().frame_count(), 1);
    }

    /// Shipped loop on a quarter-second fixed step, minimized for `skipped` frames
    fn minimized_for(fx: &Fixture, skipped: usize, max_steps: Option<u32>) -> RunLoop<TimedWindow> {
        let mut run = fx.run_loop(
            BuildMode::Shipped,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new(),
        );
        run.window_mut().frame_seconds = 0.25;
        run.clock = Clock::with_time_source(Box::new(run.window().time.clone()), 0.25)
            .with_max_steps_per_frame(max_steps);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        run.window_mut().inner.set_minimized(true);
        for _ in 0..skipped {
            run.step();
        }
        run.window_mut().inner.set_minimized(false);
        run
    }

    #[test]
    fn first_frame_after_minimize_catches_up_on_skipped_time() {
        let fx = Fixture::new();
        let mut run = minimized_for(&fx, 4, None);
        assert_eq!(run.clock().frame_count(), 0);

        run.step();

        // four skipped polls plus this frame's, a quarter second each
        assert_eq!(run.clock().frame_count(), 1);
        assert_eq!(run.clock().delta_seconds(), 1.25);
        assert_eq!(run.clock().steps_this_frame(), 5);
        assert_eq!(run.clock().dropped_steps(), 0);
        assert_eq!(run.clock().accumulator(), 0.0);
    }

    #[test]
    fn catch_up_burst_is_capped() {
        let fx = Fixture::new();
        let mut run = minimized_for(&fx, 4, Some(2));

        run.step();

        assert_eq!(run.clock().steps_this_frame(), 2);
        assert_eq!(run.clock().dropped_steps(), 3);
        assert_eq!(run.clock().accumulator(), 0.0);

        run.step();
        assert_eq!(run.clock().steps_this_frame(), 1);
        assert_eq!(run.clock().dropped_steps(), 3);
    }

    #[test]
    fn editor_build_runs_while_unfocused() {
        let fx = Fixture::new();
        let mut run = fx.run_loop(
            BuildMode::Editor,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new(),
        );
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        run.window_mut().inner.set_focused(false);
        run.step();
        assert_eq!(run.clock().frame_count(), 1);
    }

    #[test]
    fn quit_action_stops_loop() {
        let fx = Fixture::new();
        let window = HeadlessWindow::new()
            .with_frame_limit(100)
            .press_on_frame(2, Key::Escape);
        let mut run = fx.run_loop(BuildMode::Editor, Box::new(NullScriptRuntime), window);
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();

        run.run();

        assert_eq!(run.clock().frame_count(), 3);
        assert!(!run.controller().has_scene());
    }

    #[test]
    fn script_switch_loads_next_scene() {
        let fx = Fixture::new();
        let target = fx.path("b.scene.toml");
        fx.write(
            "portal.scene.toml",
            &format!(
                "[scene]\nname = \"portal\"\n\n[entities.door]\nscript = \"Door\"\nportal = {:?}\n",
                target.display().to_string()
            ),
        );
        let mut run = fx.run_loop(BuildMode::Shipped, Box::new(Portal), HeadlessWindow::new());
        run.load_start_scene(fx.path("portal.scene.toml")).unwrap();
        run.running = true;

        run.step();

        assert_eq!(run.controller().current_scene_path(), Some(target.as_path()));
        assert!(run.controller().world().contains_name("gate"));
        assert!(!run.controller().world().contains_name("door"));
    }

    #[test]
    fn script_switch_to_missing_scene_keeps_files_intact() {
        let fx = Fixture::new();
        let missing = fx.path("missing.scene.toml");
        let portal = format!(
            "[scene]\nname = \"portal\"\n\n[entities.door]\nscript = \"Door\"\nportal = {:?}\n",
            missing.display().to_string()
        );
        fx.write("portal.scene.toml", &portal);
        let mut run = fx.run_loop(BuildMode::Shipped, Box::new(Portal), HeadlessWindow::new());
        run.load_start_scene(fx.path("portal.scene.toml")).unwrap();
        run.running = true;

        run.step();
        assert_eq!(run.controller().current_scene_path(), Some(missing.as_path()));
        run.controller_mut().world_mut().spawn("stray").unwrap();

        run.stop();
        run.controller_mut().exit_scene();

        assert!(!missing.exists());
        let saved = fs::read_to_string(fx.path("portal.scene.toml")).unwrap();
        assert!(saved.contains("door"));
        assert!(!saved.contains("stray"));
    }

    #[test]
    fn queued_work_runs_on_next_frame() {
        let fx = Fixture::new();
        let mut run = fx.run_loop(
            BuildMode::Editor,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new(),
        );
        run.load_start_scene(fx.path("a.scene.toml")).unwrap();
        run.running = true;

        let sender = run.sender();
        std::thread::spawn(move || {
            sender.submit(|controller: &mut SceneLifecycleController| {
                controller.world_mut().spawn("from_worker").ok();
            });
        })
        .join()
        .unwrap();

        assert!(!run.controller().world().contains_name("from_worker"));
        run.step();
        assert!(run.controller().world().contains_name("from_worker"));
    }

    #[test]
    fn missing_start_scene_is_reported() {
        let fx = Fixture::new();
        let mut run = fx.run_loop(
            BuildMode::Editor,
            Box::new(NullScriptRuntime),
            HeadlessWindow::new(),
        );
        assert!(run.load_start_scene(fx.path("missing.scene.toml")).is_err());
    }
}
