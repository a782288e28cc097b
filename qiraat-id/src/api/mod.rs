//! HTTP API handlers for qiraat-id

pub mod health;
pub mod predict;

pub use health::health_routes;
pub use predict::predict;
