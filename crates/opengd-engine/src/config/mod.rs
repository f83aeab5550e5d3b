//! Configuration collaborators.
//!
//! The engine reads settings through [`ConfigSource`], a `(section, key,
//! default) -> String` lookup. [`TomlConfig`] is the file-backed source the
//! binary uses; typed views such as [`GraphicsConfig`] parse the strings.

mod graphics;
mod manifest;
mod source;

pub use graphics::GraphicsConfig;
pub use manifest::AssetManifest;
pub use source::{ConfigError, ConfigSource, MapConfig, TomlConfig};
