//! Asset registry and loaders.
//!
//! Paths are pushed into a [`Registry`] up front and receive a stable index.
//! A load pass then turns each pending slot into a loaded value or a
//! recorded failure, so indices never shift when a file is missing.

mod error;
mod images;
mod loader;
mod model;
mod registry;
mod sound;

pub use error::AssetError;
pub use images::{GpuTextureLoader, ImageLoader};
pub use loader::AssetLoader;
pub use model::ObjLoader;
pub use registry::{AssetRegistry, LoadReport, Registry, RegistryError, Slot};
pub use sound::{SoundData, SoundLoader};
