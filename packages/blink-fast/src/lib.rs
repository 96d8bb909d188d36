pub mod app;
pub mod config;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod scoring;
pub mod sensor;
pub mod state;
pub mod sync;
