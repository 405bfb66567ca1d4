//! Scene lifecycle: loading, swapping, play snapshots and restore

use crate::deferred::MainThreadQueue;
use crate::loading::{LoadingConfig, LoadingScreen, FADE_KEYFRAMES};
use crate::scene::{GameScene, Scene, SceneContext};
use crate::scripting::{self, ScriptRuntime, StartLatch};
use crate::state::{BuildMode, EngineState, StateEvent};
use crate::system::{SubsystemKind, SystemRegistry};
use ember_core::{EmberError, Result, SnapshotDigest};
use ember_ecs::EmberWorld;
use ember_scene::SceneSerializer;
use std::path::{Path, PathBuf};

/// Something that can put the current frame on screen
pub trait FramePresenter {
    fn present(&mut self);
}

/// Presenter for runs without a screen
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl FramePresenter for NullPresenter {
    fn present(&mut self) {}
}

/// Builds the scene object for a scene path
pub type SceneFactory = Box<dyn FnMut(&Path) -> Box<dyn Scene> + Send>;

fn game_scene(_path: &Path) -> Box<dyn Scene> {
    Box::new(GameScene::new())
}

/// Callbacks run on the main thread with the controller
pub type ControllerQueue = MainThreadQueue<SceneLifecycleController>;

/// Owns the live scene and drives it through load, play, stop and exit.
///
/// At most one scene object is alive at a time: the outgoing scene has
/// exited and been dropped before the next one is built.
pub struct SceneLifecycleController {
    world: EmberWorld,
    systems: SystemRegistry,
    scripts: Box<dyn ScriptRuntime>,
    serializer: Box<dyn SceneSerializer>,
    factory: SceneFactory,

    scene: Option<Box<dyn Scene>>,
    current_scene_path: Option<PathBuf>,
    /// False when the scene file could not be read; the world then does not
    /// reflect the file and must not be written back over it
    writable: bool,
    state: EngineState,
    build_mode: BuildMode,

    loading_config: LoadingConfig,
    loading: LoadingScreen,
    loading_progress: f32,
    is_loading: bool,
    first_load: bool,

    latch: StartLatch,
    preview: bool,
    runtime_running: bool,
    pending_switch: Option<PathBuf>,
    last_snapshot: Option<SnapshotDigest>,
}

impl SceneLifecycleController {
    pub fn new(
        systems: SystemRegistry,
        scripts: Box<dyn ScriptRuntime>,
        serializer: Box<dyn SceneSerializer>,
    ) -> Self {
        Self {
            world: EmberWorld::new(),
            systems,
            scripts,
            serializer,
            factory: Box::new(game_scene),
            scene: None,
            current_scene_path: None,
            writable: false,
            state: EngineState::Stopped,
            build_mode: BuildMode::Editor,
            loading_config: LoadingConfig::default(),
            loading: LoadingScreen::new(),
            loading_progress: 0.0,
            is_loading: false,
            first_load: true,
            latch: StartLatch::new(),
            preview: false,
            runtime_running: false,
            pending_switch: None,
            last_snapshot: None,
        }
    }

    pub fn with_build_mode(mut self, build_mode: BuildMode) -> Self {
        self.build_mode = build_mode;
        self
    }

    pub fn with_loading_config(mut self, config: LoadingConfig) -> Self {
        self.loading_config = config;
        self
    }

    /// Replace the default [`GameScene`] factory
    pub fn with_scene_factory(
        mut self,
        factory: impl FnMut(&Path) -> Box<dyn Scene> + Send + 'static,
    ) -> Self {
        self.factory = Box::new(factory);
        self
    }

    // --- Accessors ---

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    pub fn world(&self) -> &EmberWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut EmberWorld {
        &mut self.world
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    pub fn current_scene_path(&self) -> Option<&Path> {
        self.current_scene_path.as_deref()
    }

    /// Where the play snapshot of the current scene lives
    pub fn temp_snapshot_path(&self) -> Option<PathBuf> {
        self.current_scene_path.as_ref().map(|path| {
            let mut temp = path.clone().into_os_string();
            temp.push(".temp");
            PathBuf::from(temp)
        })
    }

    /// Digest of the last play snapshot written
    pub fn snapshot_digest(&self) -> Option<SnapshotDigest> {
        self.last_snapshot
    }

    /// Last published load progress, in `[0, 1]`
    pub fn loading_progress(&self) -> f32 {
        self.loading_progress
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    /// Scripts are ticking while stopped
    pub fn is_previewing(&self) -> bool {
        self.preview
    }

    pub fn loading_screen(&self) -> &LoadingScreen {
        &self.loading
    }

    pub fn loading_config(&self) -> &LoadingConfig {
        &self.loading_config
    }

    /// Scene switch requested by a script during the last update
    pub fn take_pending_switch(&mut self) -> Option<PathBuf> {
        self.pending_switch.take()
    }

    // --- Scene lifecycle ---

    /// Replace the active scene with the one stored at `path`.
    ///
    /// The outgoing scene exits and is saved back to its own path before
    /// the world is cleared. Serializer failures are logged; the new scene
    /// is still initialized and the first failure is returned. A scene whose
    /// file failed to load is never saved back to that file.
    pub fn load_scene(
        &mut self,
        path: impl AsRef<Path>,
        presenter: &mut dyn FramePresenter,
    ) -> Result<()> {
        let path = path.as_ref().to_path_buf();

        if self.scene.is_some() {
            self.state = EngineState::Stopped;
            self.run_scene(|scene, ctx| scene.exit(ctx));
            self.stop_runtime();
            if let Some(old) = self.writable_path() {
                if let Err(e) = self.serializer.serialize(&self.world, &old) {
                    log::error!("failed to save '{}' before switching: {}", old.display(), e);
                }
            }
            self.scene = None;
            self.first_load = false;
            self.loading.reset();
        }
        self.world.clear();
        self.preview = false;
        self.pending_switch = None;

        let staged = self.loading_config.enabled
            && !self.loading_config.is_menu_scene(&path)
            && !self.first_load;
        log::info!(
            "loading scene '{}'{}",
            path.display(),
            if staged { " with loading screen" } else { "" }
        );

        self.is_loading = true;
        self.loading_progress = 0.0;

        if staged {
            self.show_loading_screen(presenter);
        }

        self.scene = Some((self.factory)(&path));
        self.current_scene_path = Some(path.clone());

        let loaded = self.serializer.deserialize(&mut self.world, &path);
        self.writable = loaded.is_ok();
        if let Err(e) = &loaded {
            log::error!(
                "failed to load '{}': {}; it will not be saved over",
                path.display(),
                e
            );
        }

        let increment = 1.0 / self.systems.len().max(1) as f32;
        for kind in self.systems.registered() {
            self.systems.init(kind, &mut self.world);
            let progress = self.loading_progress + increment;
            self.update_loading_screen(progress, presenter);
        }

        self.run_scene(|scene, ctx| scene.initialize(ctx));
        self.runtime_running = true;

        if self.loading.is_staged() {
            self.update_loading_screen(1.0, presenter);
            self.play_transition(presenter);
            self.loading.hide(&mut self.world);
            self.loading.finish();
        }

        self.loading_progress = 1.0;
        self.is_loading = false;

        if self.build_mode == BuildMode::Shipped {
            self.state = EngineState::Playing;
        }

        log::info!(
            "scene '{}' ready ({} entities)",
            path.display(),
            self.world.entity_count()
        );
        loaded
    }

    /// Advance the active scene by one frame. No-op without a scene.
    pub fn update_scene(&mut self, dt: f64, fixed_dt: f64, steps: u32) {
        self.run_scene(|scene, ctx| scene.update(ctx, dt, fixed_dt, steps));
    }

    /// Save, exit and drop the active scene. Safe to call repeatedly.
    pub fn exit_scene(&mut self) {
        if self.scene.is_none() {
            return;
        }

        if let Some(path) = self.writable_path() {
            if let Err(e) = self.serializer.serialize(&self.world, &path) {
                log::error!("failed to save '{}' on exit: {}", path.display(), e);
            }
        }
        self.run_scene(|scene, ctx| scene.exit(ctx));
        self.stop_runtime();
        self.scene = None;
        self.preview = false;

        log::info!("scene exited");
    }

    /// Write the world to the scene's own path
    pub fn save_scene(&mut self) -> Result<()> {
        let path = self.require_scene_path()?;
        if !self.writable {
            return Err(EmberError::SceneError(format!(
                "'{}' failed to load, refusing to overwrite it",
                path.display()
            )));
        }
        self.serializer.serialize(&self.world, &path)?;
        log::info!("saved '{}'", path.display());
        Ok(())
    }

    /// Write the world to the play snapshot next to the scene file
    pub fn save_temp_scene(&mut self) -> Result<()> {
        self.require_scene_path()?;
        let temp = self
            .temp_snapshot_path()
            .ok_or_else(|| EmberError::SceneError("no scene loaded".into()))?;

        self.serializer.serialize(&self.world, &temp)?;

        self.last_snapshot = SnapshotDigest::from_file(&temp).ok();
        match self.last_snapshot {
            Some(digest) => log::debug!("play snapshot '{}' {}", temp.display(), digest),
            None => log::debug!("play snapshot '{}'", temp.display()),
        }
        Ok(())
    }

    /// Restore the world from the play snapshot and restart scripts.
    ///
    /// Fails with [`EmberError::MissingSnapshot`] before touching anything
    /// if the snapshot does not exist.
    pub fn reload_scene(&mut self) -> Result<()> {
        let temp = self
            .temp_snapshot_path()
            .ok_or_else(|| EmberError::SceneError("no scene loaded".into()))?;

        if !temp.exists() {
            log::error!("cannot restore scene: '{}' does not exist", temp.display());
            return Err(EmberError::MissingSnapshot(temp));
        }

        self.stop_runtime();
        let restored = self.serializer.reload(&mut self.world, &temp);
        if let Err(e) = &restored {
            log::error!("failed to restore '{}': {}", temp.display(), e);
        }
        self.start_runtime();
        self.latch.arm();
        self.preview = false;

        restored
    }

    /// Apply an editor state transition.
    ///
    /// Invalid transitions and failed restores leave the state unchanged.
    pub fn handle_event(&mut self, event: StateEvent) -> Result<()> {
        let next = self.state.next(event)?;

        match (self.state, event) {
            (EngineState::Stopped, StateEvent::Play) => self.enter_play()?,
            (_, StateEvent::Stop) | (_, StateEvent::Reload) => self.reload_scene()?,
            (_, StateEvent::TogglePreview) => self.toggle_preview(),
            _ => {}
        }

        log::info!("{} -> {} on {}", self.state, next, event);
        self.state = next;
        Ok(())
    }

    /// Publish load progress and redraw the loading screen.
    ///
    /// Only has an effect during a staged load after the first one.
    pub fn update_loading_screen(&mut self, fraction: f32, presenter: &mut dyn FramePresenter) {
        if !self.is_loading {
            return;
        }
        if !self.loading.is_staged() || self.first_load {
            return;
        }

        let fraction = fraction.clamp(0.0, 1.0);
        self.loading_progress = fraction;

        self.loading
            .set_progress(&mut self.world, fraction, self.loading_config.full_bar_width);
        self.systems.update(SubsystemKind::Ui, &mut self.world, 0.0);
        self.systems.update(SubsystemKind::Render, &mut self.world, 0.0);
        presenter.present();
    }

    /// Run queued main-thread callbacks against this controller
    pub fn drain(&mut self, queue: &ControllerQueue) -> usize {
        queue.drain(self)
    }

    // --- Internals ---

    fn run_scene<R>(
        &mut self,
        f: impl FnOnce(&mut dyn Scene, &mut SceneContext<'_>) -> R,
    ) -> Option<R> {
        let scene = self.scene.as_deref_mut()?;
        let mut ctx = SceneContext {
            world: &mut self.world,
            systems: &mut self.systems,
            scripts: self.scripts.as_mut(),
            state: self.state,
            latch: &mut self.latch,
            preview: self.preview,
            pending_switch: &mut self.pending_switch,
        };
        Some(f(scene, &mut ctx))
    }

    /// Path of the active scene, if its world may be written back to it
    fn writable_path(&self) -> Option<PathBuf> {
        self.current_scene_path.clone().filter(|_| self.writable)
    }

    fn require_scene_path(&self) -> Result<PathBuf> {
        match (&self.scene, &self.current_scene_path) {
            (Some(_), Some(path)) => Ok(path.clone()),
            _ => Err(EmberError::SceneError("no scene loaded".into())),
        }
    }

    fn start_runtime(&mut self) {
        if let Some(path) = scripting::start_runtime(self.scripts.as_mut(), &mut self.world) {
            self.pending_switch = Some(path);
        }
        self.runtime_running = true;
    }

    fn stop_runtime(&mut self) {
        self.scripts.on_runtime_stop();
        self.runtime_running = false;
    }

    fn enter_play(&mut self) -> Result<()> {
        self.save_temp_scene()?;
        if !self.runtime_running {
            self.start_runtime();
        }
        self.preview = false;
        self.latch.arm();
        Ok(())
    }

    fn toggle_preview(&mut self) {
        if self.preview {
            self.stop_runtime();
            self.preview = false;
        } else {
            if !self.runtime_running {
                self.start_runtime();
            }
            self.latch.arm();
            self.preview = true;
        }
        log::debug!("script preview {}", if self.preview { "on" } else { "off" });
    }

    fn show_loading_screen(&mut self, presenter: &mut dyn FramePresenter) {
        let screen = self.loading_config.screen_scene.clone();
        let mut screen_world = EmberWorld::new();
        if let Err(e) = self.serializer.deserialize(&mut screen_world, &screen) {
            log::error!("failed to load loading screen '{}': {}", screen.display(), e);
            return;
        }

        self.loading
            .collect(&mut self.world, &screen_world, &self.loading_config);
        self.systems.init(SubsystemKind::Render, &mut self.world);
        self.systems.init(SubsystemKind::Ui, &mut self.world);
        self.update_loading_screen(0.0, presenter);
    }

    fn play_transition(&mut self, presenter: &mut dyn FramePresenter) {
        let frames = self.loading_config.frames_per_phase();
        self.loading.reveal_fade(&mut self.world);

        for keyframe in &FADE_KEYFRAMES {
            self.loading.pose_fade(&mut self.world, keyframe);
            for _ in 0..frames {
                self.loading.touch_fade(&mut self.world);
                self.update_loading_screen(1.0, presenter);
            }
        }
    }
}
