pub mod entity;
pub mod manager;
pub mod node_adder;
pub mod snapshot;

pub use entity::{ConnectPoint, Edge, Entity, EntityId, EntityKind, Section, TextNode};
pub use manager::{StageError, StageManager};
pub use node_adder::TextTree;
pub use snapshot::StageSnapshot;

use crate::camera::Camera2D;
use crate::compute::{AutoComputeEngine, ComputeEnvironment, TickReport};
use crate::config::StageConfig;
use crate::events::{EventBus, StageEvent};
use crate::input::Input;
use crate::time::Time;
use glam::Vec2;
use tracing::{debug, warn};

/// The single stage instance: entity graph plus the collaborators the compute engine
/// reads from (camera, input, clock) and writes to (event bus).
pub struct Stage {
    pub manager: StageManager,
    pub camera: Camera2D,
    pub input: Input,
    pub time: Time,
    pub events: EventBus,
    pub viewport: Vec2,
    engine: AutoComputeEngine,
    config: StageConfig,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        let mut camera = Camera2D::new();
        if !camera.set_zoom_limits(config.camera.zoom_min, config.camera.zoom_max) {
            warn!(
                zoom_min = config.camera.zoom_min,
                zoom_max = config.camera.zoom_max,
                "ignoring invalid camera zoom limits"
            );
        }
        let engine = match config.compute.random_seed {
            Some(seed) => AutoComputeEngine::with_seed(seed),
            None => AutoComputeEngine::new(),
        };
        Self {
            manager: StageManager::new(),
            camera,
            input: Input::new(),
            time: Time::new(),
            events: EventBus::default(),
            viewport: Vec2::new(1280.0, 720.0),
            engine,
            config,
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Per-frame entry point. Runs the compute engine only while the configured trigger
    /// key is held, or on every frame when no key is configured.
    pub fn tick(&mut self) -> Option<TickReport> {
        self.time.tick();
        let triggered = match self.config.compute.trigger_key.as_deref() {
            Some(key) => self.input.is_key_held(key),
            None => true,
        };
        let report = triggered.then(|| self.auto_compute_engine_tick());
        self.input.clear_frame();
        report
    }

    /// One ungated evaluation pass over the whole graph.
    pub fn auto_compute_engine_tick(&mut self) -> TickReport {
        let mouse_world = self.mouse_world_location();
        let mut env = ComputeEnvironment {
            camera: &mut self.camera,
            mouse_world,
            now_millis: self.time.unix_millis(),
            events: &mut self.events,
        };
        self.engine.tick(&mut self.manager, &mut env)
    }

    pub fn mouse_world_location(&self) -> Vec2 {
        match self.input.cursor_position() {
            Some(screen) => self.camera.screen_to_world(screen, self.viewport),
            None => self.camera.position,
        }
    }

    pub fn add_node_by_click(&mut self, location: Vec2) -> Result<EntityId, StageError> {
        let now = chrono::Local::now().naive_local();
        node_adder::add_node_by_click(&mut self.manager, location, &self.config.nodes, now)
    }

    pub fn add_node_by_text(&mut self, text: &str, indent_unit: usize, offset: Vec2) -> Result<TextTree, StageError> {
        node_adder::add_node_by_text(
            &mut self.manager,
            text,
            indent_unit,
            offset,
            &self.config.text_tree,
            self.config.nodes.default_size(),
        )
    }

    pub fn add_connect_point(&mut self, location: Vec2, sections: &[EntityId]) -> Result<EntityId, StageError> {
        node_adder::add_connect_point(&mut self.manager, location, sections)
    }

    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        self.events.drain()
    }

    /// Reset the stage to an empty graph. Pending events and input state are dropped so
    /// no collaborator keeps ids from the old graph.
    pub fn destroy(&mut self) {
        debug!("stage reset");
        self.manager.destroy();
        self.events.clear();
        self.input.reset();
    }
}
