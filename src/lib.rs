pub mod camera;
pub mod cli;
pub mod compute;
pub mod config;
pub mod events;
pub mod geometry;
pub mod input;
pub mod stage;
pub mod time;

pub use compute::{AutoComputeEngine, TickReport};
pub use config::StageConfig;
pub use geometry::Rectangle;
pub use stage::{Stage, StageError, StageManager};
