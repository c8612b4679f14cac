pub mod camera_models;
pub mod config;
pub mod detection;
pub mod error;
pub mod state;
