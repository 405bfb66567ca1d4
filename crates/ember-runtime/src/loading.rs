//! Loading screen shown while a scene loads in stages

use ember_core::{EntityId, Vec2, Vec3};
use ember_ecs::{EmberWorld, EntityFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for staged scene loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Show the loading screen when switching scenes
    pub enabled: bool,
    /// Scene holding the loading screen entities
    pub screen_scene: PathBuf,
    /// Scene that always loads without a loading screen
    pub menu_scene: Option<PathBuf>,
    /// Name of the entity whose width shows progress
    pub progress_bar_entity: String,
    /// Name of the entity animated by the closing transition
    pub fade_entity: String,
    /// Progress bar width at 100%
    pub full_bar_width: f32,
    /// Length of each transition phase, in seconds of phase timer
    pub phase_duration: f64,
    /// Amount the phase timer drops per rendered frame
    pub phase_step: f64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            screen_scene: PathBuf::from("scenes/loading_screen.scene.toml"),
            menu_scene: None,
            progress_bar_entity: "Loading Bar".to_string(),
            fade_entity: "Fade".to_string(),
            full_bar_width: 0.68,
            phase_duration: 0.08,
            phase_step: 0.02,
        }
    }
}

impl LoadingConfig {
    pub fn is_menu_scene(&self, path: &Path) -> bool {
        self.menu_scene.as_deref() == Some(path)
    }

    /// Frames rendered per transition phase
    pub fn frames_per_phase(&self) -> u32 {
        if self.phase_step <= 0.0 || self.phase_duration <= 0.0 {
            return 0;
        }
        (self.phase_duration / self.phase_step - 1e-9).ceil() as u32
    }
}

/// One pose of the fade overlay. `None` leaves the field as it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeKeyframe {
    pub position: Option<Vec3>,
    pub size: Option<Vec2>,
}

/// The closing wipe: the overlay jumps around the screen, then covers it
pub const FADE_KEYFRAMES: [FadeKeyframe; 6] = [
    FadeKeyframe {
        position: None,
        size: None,
    },
    FadeKeyframe {
        position: Some(Vec3::new(0.3, 0.5, 0.0)),
        size: None,
    },
    FadeKeyframe {
        position: Some(Vec3::ZERO),
        size: Some(Vec2::new(1.0, 0.75)),
    },
    FadeKeyframe {
        position: Some(Vec3::new(0.0, 0.3, 0.0)),
        size: Some(Vec2::new(0.75, 0.75)),
    },
    FadeKeyframe {
        position: Some(Vec3::new(0.03, 0.0, 0.0)),
        size: Some(Vec2::new(0.97, 0.97)),
    },
    FadeKeyframe {
        position: Some(Vec3::ZERO),
        size: Some(Vec2::new(1.0, 1.0)),
    },
];

/// Prefix reserved for loading screen entities in the live world
pub const LOADING_ENTITY_PREFIX: &str = "loading::";

/// Name a loading screen entity has once copied into the live world
pub fn loading_entity_name(name: &str) -> String {
    format!("{}{}", LOADING_ENTITY_PREFIX, name)
}

/// Bookkeeping for the loading screen of the load in progress
#[derive(Debug, Default)]
pub struct LoadingScreen {
    entities: Vec<EntityId>,
    progress_bar: Option<EntityId>,
    fade: Option<EntityId>,
    staged: bool,
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the entities of `screen` into `world` as the loading screen and
    /// find the progress bar and fade overlay by name.
    ///
    /// Copies are renamed with [`loading_entity_name`] and marked transient,
    /// so they can share the world with a scene using the same names.
    pub(crate) fn collect(
        &mut self,
        world: &mut EmberWorld,
        screen: &EmberWorld,
        config: &LoadingConfig,
    ) {
        self.entities.clear();
        for info in screen.all_entities() {
            let name = loading_entity_name(&info.name);
            let flags = EntityFlags {
                transient: true,
                ..info.flags
            };
            let id = match world.spawn_with_flags(name, flags) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("loading screen entity '{}' skipped: {}", info.name, e);
                    continue;
                }
            };
            if let Some(components) = screen.get_components(info.id) {
                for (component, data) in &components.data {
                    world.set_component(id, component, data.clone()).ok();
                }
            }
            self.entities.push(id);
        }

        self.progress_bar = world.get_id(&loading_entity_name(&config.progress_bar_entity));
        self.fade = world.get_id(&loading_entity_name(&config.fade_entity));

        if self.progress_bar.is_none() {
            log::warn!(
                "loading screen has no '{}' entity, progress will not be shown",
                config.progress_bar_entity
            );
        }
        self.staged = true;
    }

    /// Set the progress bar width. Returns false if there is no bar.
    pub(crate) fn set_progress(&self, world: &mut EmberWorld, fraction: f32, full_width: f32) -> bool {
        let Some(bar) = self.progress_bar else {
            return false;
        };
        let Some(mut rect) = world.ui_rect(bar) else {
            return false;
        };

        rect.size.x = fraction * full_width;
        rect.dirty = true;
        world.set_ui_rect(bar, rect).is_ok()
    }

    /// Show the fade overlay
    pub(crate) fn reveal_fade(&self, world: &mut EmberWorld) {
        if let Some(fade) = self.fade {
            world.set_active(fade, true).ok();
            world.set_visible(fade, true).ok();
        }
    }

    /// Move the fade overlay to a keyframe and flag it for re-batching
    pub(crate) fn pose_fade(&self, world: &mut EmberWorld, keyframe: &FadeKeyframe) {
        let Some(fade) = self.fade else {
            return;
        };
        let Some(mut rect) = world.ui_rect(fade) else {
            return;
        };

        if let Some(position) = keyframe.position {
            rect.position = position;
        }
        if let Some(size) = keyframe.size {
            rect.size = size;
        }
        rect.dirty = true;
        world.set_ui_rect(fade, rect).ok();
    }

    /// Flag the fade overlay for re-batching without moving it
    pub(crate) fn touch_fade(&self, world: &mut EmberWorld) {
        self.pose_fade(world, &FADE_KEYFRAMES[0]);
    }

    /// Deactivate and hide every loading screen entity
    pub(crate) fn hide(&self, world: &mut EmberWorld) {
        for id in &self.entities {
            world.set_active(*id, false).ok();
            world.set_visible(*id, false).ok();
        }
    }

    /// True while a staged load is drawing this screen
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    pub(crate) fn finish(&mut self) {
        self.staged = false;
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn progress_bar(&self) -> Option<EntityId> {
        self.progress_bar
    }

    pub fn fade(&self) -> Option<EntityId> {
        self.fade
    }

    /// Forget the entities of the previous load
    pub fn reset(&mut self) {
        self.entities.clear();
        self.progress_bar = None;
        self.fade = None;
        self.staged = false;
    }
}
