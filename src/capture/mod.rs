#[cfg(feature = "desktop")]
pub mod audio;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod content_provider;
pub mod host;
pub mod stream;
