//! The viewer session: which skeleton and background are shown, and how gestures change them.

use crate::camera::{Camera, Viewport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::append_background_quad;
use crate::gesture::Gesture;
use crate::selection::{atlas_name, entry_basename, is_binary_entry};
use crate::storage::Storage;
use image::RgbaImage;
use spine2d::{AnimationState, AnimationStateData, Atlas, DrawList, Skeleton, SkeletonData};
use std::sync::Arc;

/// The platform side of the viewer: where the current files come from and how new ones are
/// picked.
pub trait Platform {
    /// Stored entry file name, empty when nothing has been imported.
    fn current_file(&self) -> &str;

    fn current_background(&self) -> Option<&str>;

    /// Starts the platform's file selection. Its result shows up later through
    /// [`Platform::current_file`] and [`Platform::current_background`].
    fn import_files(&mut self);
}

/// A decoded image, keyed by the name textures are looked up with.
pub struct NamedImage {
    pub name: String,
    pub image: RgbaImage,
}

/// Everything loaded for one skeleton file. Replaced wholesale when the file changes.
pub struct LoadedSkeleton {
    pub file_name: String,
    pub atlas: Atlas,
    pub data: Arc<SkeletonData>,
    pub skeleton: Skeleton,
    pub state: AnimationState,
    /// Skin names in cycling order: `default` first, the rest sorted by name. The runtime
    /// keeps skins in a map, so the order they were exported in is not available.
    pub skins: Vec<String>,
    pub pages: Vec<NamedImage>,
}

impl LoadedSkeleton {
    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.data.animations.iter().map(|a| a.name.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
}

/// What a [`ViewerSession::resume`] call changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResumeOutcome {
    pub skeleton_changed: bool,
    pub background_changed: bool,
}

pub struct ViewerSession<P, S> {
    platform: P,
    storage: S,
    current_file: String,
    current_background: Option<String>,
    loaded: Option<LoadedSkeleton>,
    background: Option<NamedImage>,
    skin_index: usize,
    animation_index: usize,
    camera: Camera,
    skin_tap_threshold: f32,
    asset_generation: u64,
}

impl<P: Platform, S: Storage> ViewerSession<P, S> {
    pub fn new(platform: P, storage: S, config: &Config) -> Self {
        Self {
            platform,
            storage,
            current_file: String::new(),
            current_background: None,
            loaded: None,
            background: None,
            skin_index: 0,
            animation_index: 0,
            camera: Camera::with_limits(config.min_scale, config.max_scale),
            skin_tap_threshold: config.skin_tap_threshold,
            asset_generation: 0,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn state(&self) -> SessionState {
        if self.loaded.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Empty
        }
    }

    pub fn loaded(&self) -> Option<&LoadedSkeleton> {
        self.loaded.as_ref()
    }

    pub fn background(&self) -> Option<&NamedImage> {
        self.background.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    pub fn current_background(&self) -> Option<&str> {
        self.current_background.as_deref()
    }

    pub fn skin_index(&self) -> usize {
        self.skin_index
    }

    pub fn animation_index(&self) -> usize {
        self.animation_index
    }

    pub fn current_skin(&self) -> Option<&str> {
        self.loaded
            .as_ref()
            .and_then(|l| l.skins.get(self.skin_index))
            .map(String::as_str)
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.loaded
            .as_ref()
            .and_then(|l| l.data.animations.get(self.animation_index))
            .map(|a| a.name.as_str())
    }

    #[cfg(test)]
    pub(crate) fn loaded_mut(&mut self) -> Option<&mut LoadedSkeleton> {
        self.loaded.as_mut()
    }

    /// Bumped whenever the loaded images change; renderers re-upload textures when it moves.
    pub fn asset_generation(&self) -> u64 {
        self.asset_generation
    }

    /// Picks up changes to the platform's current files.
    ///
    /// The skeleton is reloaded only when the entry file name differs from the one last seen;
    /// the background likewise. A failed load is returned after both roles were looked at and
    /// leaves the previously shown skeleton or background in place.
    pub fn resume(&mut self) -> Result<ResumeOutcome> {
        let skeleton = self.sync_skeleton();
        let background = self.sync_background();
        Ok(ResumeOutcome {
            skeleton_changed: skeleton?,
            background_changed: background?,
        })
    }

    fn sync_skeleton(&mut self) -> Result<bool> {
        if self.current_file == self.platform.current_file() {
            return Ok(false);
        }
        self.current_file = self.platform.current_file().to_string();
        if self.current_file.is_empty() {
            self.loaded = None;
            self.asset_generation += 1;
            return Ok(true);
        }

        let loaded = load_skeleton(&self.storage, &self.current_file)?;
        log::info!(
            "loaded '{}': {} skin(s), {} animation(s)",
            loaded.file_name,
            loaded.skins.len(),
            loaded.data.animations.len()
        );
        self.camera.reset();
        self.skin_index = 0;
        self.animation_index = 0;
        self.loaded = Some(loaded);
        self.asset_generation += 1;
        Ok(true)
    }

    fn sync_background(&mut self) -> Result<bool> {
        if self.current_background.as_deref() == self.platform.current_background() {
            return Ok(false);
        }
        self.current_background = self.platform.current_background().map(str::to_string);
        self.background = match self.current_background.as_deref() {
            Some(name) => Some(NamedImage {
                name: name.to_string(),
                image: decode_image(name, &self.storage.read(name)?)?,
            }),
            None => None,
        };
        self.asset_generation += 1;
        log::info!("background set to {:?}", self.current_background);
        Ok(true)
    }

    /// Routes a detected gesture; returns whether it was handled.
    pub fn handle_gesture(&mut self, gesture: Gesture) -> bool {
        match gesture {
            Gesture::Tap { x, y } => self.tap(x, y),
            Gesture::LongPress { x, y } => self.long_press(x, y),
            Gesture::Pan {
                delta_x, delta_y, ..
            } => self.pan(delta_x, delta_y),
            Gesture::Zoom {
                initial_distance,
                distance,
            } => self.zoom(initial_distance, distance),
            Gesture::PinchStop => {
                self.pinch_stop();
                true
            }
            Gesture::PanStop { .. } => false,
        }
    }

    /// Right of the threshold a tap cycles skins; anywhere else it asks for an import.
    pub fn tap(&mut self, x: f32, _y: f32) -> bool {
        if !self.current_file.is_empty() && x > self.skin_tap_threshold {
            return self.cycle_skin();
        }
        self.platform.import_files();
        true
    }

    fn cycle_skin(&mut self) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        if loaded.skins.len() <= 1 {
            return false;
        }
        let next = (self.skin_index + 1) % loaded.skins.len();
        let name = &loaded.skins[next];
        if let Err(e) = loaded.skeleton.set_skin(Some(name.as_str())) {
            log::warn!("set_skin({name}) failed: {e:?}");
            return false;
        }
        self.skin_index = next;
        loaded.skeleton.set_to_setup_pose();
        log::debug!("skin -> {name}");
        true
    }

    /// Cycles to the next animation, looping from its start.
    pub fn long_press(&mut self, _x: f32, _y: f32) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let count = loaded.data.animations.len();
        if count <= 1 {
            return false;
        }
        self.animation_index = (self.animation_index + 1) % count;
        let name = loaded.data.animations[self.animation_index].name.clone();
        if let Err(e) = loaded.state.set_animation(0, &name, true) {
            log::warn!("set_animation({name}) failed: {e:?}");
            return false;
        }
        log::debug!("animation -> {name}");
        true
    }

    pub fn pan(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        self.camera.pan(delta_x, delta_y);
        true
    }

    pub fn zoom(&mut self, initial_distance: f32, distance: f32) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        self.camera.zoom_gesture(initial_distance, distance);
        true
    }

    pub fn pinch_stop(&mut self) {
        self.camera.pinch_stop();
    }

    /// Advances the animation by `delta` seconds and poses the skeleton.
    pub fn update(&mut self, delta: f32) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let delta = delta.max(0.0);
        loaded.state.update(delta);
        loaded.skeleton.set_to_setup_pose();
        loaded.state.apply(&mut loaded.skeleton);
        loaded.skeleton.update(delta);
        loaded.skeleton.update_world_transform();
    }

    /// Fills `out` with this frame's geometry: background first, skeleton on top.
    pub fn compose_frame(&self, viewport: Viewport, out: &mut DrawList) {
        out.clear();
        if let Some(background) = self.background.as_ref() {
            let (w, h) = background.image.dimensions();
            append_background_quad(out, &self.camera, viewport, w, h);
        }
        if let Some(loaded) = self.loaded.as_ref() {
            spine2d::append_draw_list_with_atlas(out, &loaded.skeleton, &loaded.atlas);
        }
    }

    /// Column-major projection for the current camera.
    pub fn clip_from_world(&self, viewport: Viewport) -> [[f32; 4]; 4] {
        self.camera.clip_from_world(viewport).to_cols_array_2d()
    }
}

fn load_skeleton(storage: &dyn Storage, file_name: &str) -> Result<LoadedSkeleton> {
    let basename = entry_basename(file_name).ok_or_else(|| Error::MissingFile {
        name: file_name.to_string(),
    })?;
    let atlas_file = atlas_name(basename);
    let atlas_text = String::from_utf8_lossy(&storage.read(&atlas_file)?).into_owned();
    let atlas = Atlas::from_str(&atlas_text)?;

    let bytes = storage.read(file_name)?;
    let data = if is_binary_entry(file_name) {
        SkeletonData::from_skel_bytes(&bytes)?
    } else {
        let text = std::str::from_utf8(&bytes).map_err(|_| Error::NotUtf8 {
            name: file_name.to_string(),
        })?;
        SkeletonData::from_json_str(text)?
    };

    let mut pages = Vec::with_capacity(atlas.pages.len());
    for page in &atlas.pages {
        let image = decode_image(&page.name, &storage.read(&page.name)?)?;
        pages.push(NamedImage {
            name: page.name.clone(),
            image,
        });
    }

    let skins = skin_order(&data);
    let mut skeleton = Skeleton::new(data.clone());
    if let Some(first) = skins.first() {
        skeleton.set_skin(Some(first.as_str()))?;
    }
    skeleton.set_to_setup_pose();
    skeleton.update_world_transform();

    let mut state = AnimationState::new(AnimationStateData::new(data.clone()));
    if let Some(first) = data.animations.first() {
        state.set_animation(0, &first.name, true)?;
    }

    Ok(LoadedSkeleton {
        file_name: file_name.to_string(),
        atlas,
        data,
        skeleton,
        state,
        skins,
        pages,
    })
}

fn skin_order(data: &SkeletonData) -> Vec<String> {
    let mut skins = data.skins.keys().cloned().collect::<Vec<_>>();
    skins.sort_by(|a, b| (a != "default", a).cmp(&(b != "default", b)));
    skins
}

fn decode_image(name: &str, bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).map_err(|source| Error::Image {
        name: name.to_string(),
        source,
    })?;
    Ok(image.to_rgba8())
}
