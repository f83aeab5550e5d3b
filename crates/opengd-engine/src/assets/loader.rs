use std::path::Path;

use super::AssetError;

/// Turns a file path into a loaded asset.
pub trait AssetLoader<T> {
    fn load(&mut self, path: &Path) -> Result<T, AssetError>;
}

impl<T, F> AssetLoader<T> for F
where
    F: FnMut(&Path) -> Result<T, AssetError>,
{
    fn load(&mut self, path: &Path) -> Result<T, AssetError> {
        self(path)
    }
}
