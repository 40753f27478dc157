//! Client for a bulk media extraction backend: load metadata for a list of
//! URLs, show it, and save single files or whole-batch archives.

// HTTP contracts with the extraction backend
pub mod client;
// Startup configuration
pub mod config;
// Busy/idle state of action buttons
pub mod control;
// Single and batch download flows
pub mod downloader;
pub mod error;
// Metadata loading into the session
pub mod loader;
// Video records and session state
pub mod model;
// Pure projection of the session into list rows
pub mod render;
// Writing payloads to disk
pub mod save;

pub use error::{Error, Result};
