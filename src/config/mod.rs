//! Configuration module for Recap.
//!
//! Handles loading and saving the TOML settings file.

mod settings;

pub use settings::{ClientSettings, GatewaySettings, GeneralSettings, Settings};
