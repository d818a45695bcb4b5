//! Configuration module for Syssel.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{AgentSettings, BackendSettings, GeneralSettings, ServerSettings, Settings};
