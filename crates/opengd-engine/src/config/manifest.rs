use std::path::PathBuf;

use super::ConfigSource;

const SECTION: &str = "ASSETS";

/// Asset paths listed in the `ASSETS` section.
///
/// Order matters: the registry assigns identifiers by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    pub textures: Vec<PathBuf>,
    pub sounds: Vec<PathBuf>,
    pub fonts: Vec<PathBuf>,
}

impl AssetManifest {
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let paths = |key| {
            source
                .load_list(SECTION, key)
                .into_iter()
                .map(PathBuf::from)
                .collect()
        };
        Self {
            textures: paths("textures"),
            sounds: paths("sounds"),
            fonts: paths("fonts"),
        }
    }
}
