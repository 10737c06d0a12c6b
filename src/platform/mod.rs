// LogVista - platform/mod.rs
//
// Platform integration: config/data directory resolution and
// config.toml loading.

pub mod config;
