//! The viewer context: one scene, one camera with its orbit controls, at most
//! one animation mixer and the state of the single model load.
//!
//! Everything here is plain CPU state so the render loop and the tests drive
//! it the same way: `poll_load` at the start of a frame, `step` with the frame
//! delta, then hand `scene()` and `camera()` to the renderer.

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::error::LoadError;
use crate::framing::{frame_model, Framing, FramingOptions};
use crate::loaders::{LoadEvent, LoadState, LoadTask, Progress};
use crate::materials::normalize_materials;
use crate::scene::{AnimationMixer, Model, SceneGraph};

/// Drawable area in physical pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Terminal outcome of the model load, reported once by `poll_load`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

pub struct Viewer {
    config: ViewerConfig,
    scene: SceneGraph,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    mixer: Option<AnimationMixer>,
    task: Option<LoadTask>,
    state: LoadState,
    viewport: Viewport,
    framing: Option<Framing>,
    /// Bumped whenever the scene's model is replaced
    model_generation: u64,
}

impl Viewer {
    pub fn new(config: ViewerConfig, width: u32, height: u32) -> Self {
        let scene = SceneGraph::new(config.background_color.0, config.lighting_rig);
        let mut camera = PerspectiveCamera::from_config(&config, width, height);
        let mut controls = OrbitControls::from_config(&config);
        controls.update(&mut camera);

        log::info!(
            "Viewer created: {}x{}, {:?} lighting, background {}",
            width,
            height,
            config.lighting_rig,
            config.background_color
        );

        Self {
            config,
            scene,
            camera,
            controls,
            mixer: None,
            task: None,
            state: LoadState::default(),
            viewport: Viewport { width, height },
            framing: None,
            model_generation: 0,
        }
    }

    /// Starts loading the configured model on a worker thread
    pub fn begin_load(&mut self) {
        let path = self.config.model_path.clone();
        log::info!("Loading model {:?}", path);
        self.attach_load(LoadTask::spawn(path));
    }

    /// Observes an already running load
    pub fn attach_load(&mut self, task: LoadTask) {
        self.task = Some(task);
        self.state = LoadState::default();
    }

    /// Drains pending load events. A loaded model is prepared and inserted
    /// within this call; the terminal outcome is returned exactly once.
    pub fn poll_load(&mut self) -> Option<LoadOutcome> {
        let events = self.task.as_mut().map(LoadTask::poll).unwrap_or_default();

        let mut outcome = None;
        for event in events {
            match event {
                LoadEvent::Progress(progress) => self.on_progress(progress),
                LoadEvent::Loaded(model) => {
                    self.apply_model(model);
                    self.state = LoadState::Succeeded;
                    outcome = Some(LoadOutcome::Loaded);
                }
                LoadEvent::Failed(error) => {
                    log::error!("Failed to load model: {}", error);
                    self.state = LoadState::Failed(error);
                    outcome = Some(LoadOutcome::Failed);
                }
            }
        }

        if self.task.as_ref().is_some_and(LoadTask::is_finished) {
            self.task = None;
        }
        outcome
    }

    fn on_progress(&mut self, progress: Progress) {
        if !self.state.is_pending() {
            return;
        }
        if !self.config.show_loading_overlay {
            match progress.percent() {
                Some(percent) => log::info!("{:.2}% loaded", percent),
                None => log::info!("{}", progress.label()),
            }
        }
        self.state = LoadState::Pending {
            progress: Some(progress),
        };
    }

    /// Normalizes, frames and animates `model`, then inserts it into the scene
    pub fn apply_model(&mut self, mut model: Model) {
        if self.config.normalize_materials {
            normalize_materials(&mut model);
        }

        let framing = frame_model(&mut model, &FramingOptions::from_config(&self.config));

        self.controls.reset();
        self.controls.target = Vec3::ZERO;
        if let Some(min_distance) = framing.min_distance {
            self.controls.min_distance = min_distance;
        }
        self.camera.position = framing.camera_position;
        self.camera.look_at(Vec3::ZERO);

        self.mixer = AnimationMixer::for_model(&model);
        if let Some(mixer) = &mut self.mixer {
            mixer.play(&mut model);
            log::info!(
                "Playing clip {:?} ({:.2}s)",
                mixer.action().clip,
                mixer.duration()
            );
        }

        self.framing = Some(framing);
        self.scene.insert_model(model);
        self.model_generation += 1;
    }

    /// Matches the camera aspect and viewport to a new window size.
    /// The camera position is left alone.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.viewport = Viewport { width, height };
        self.camera.set_aspect(width, height);
    }

    /// One frame of simulation: animation by `delta` seconds, then orbit input
    pub fn step(&mut self, delta: f32) {
        if let (Some(mixer), Some(model)) = (&mut self.mixer, self.scene.model_mut()) {
            mixer.update(delta, model);
        }
        self.controls.update(&mut self.camera);
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Camera and controls together, for feeding pointer input
    pub fn camera_controls(&mut self) -> (&PerspectiveCamera, &mut OrbitControls) {
        (&self.camera, &mut self.controls)
    }

    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn framing(&self) -> Option<&Framing> {
        self.framing.as_ref()
    }

    pub fn model_generation(&self) -> u64 {
        self.model_generation
    }
}
