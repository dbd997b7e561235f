//! HTTP API handlers for medrec-ip

pub mod health;
pub mod predict;

pub use health::health_routes;
pub use predict::predict_premium;
