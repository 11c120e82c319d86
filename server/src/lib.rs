pub mod config;
pub mod error;
pub mod movement_tick;
pub mod world;

pub use config::ServerConfig;
pub use error::ServerError;
pub use movement_tick::{AuthoritativeSnapshot, ServerSim};
pub use world::{LevelDef, build_world, is_valid_line};
