use std::path::{Path, PathBuf};

use crate::render::{MeshData, Texture, Vertex3D};

use super::{AssetError, AssetLoader, ObjLoader, SoundData};

/// State of one registered asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Pending(PathBuf),
    Loaded(T),
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("asset id {id} out of range ({len} registered)")]
    OutOfRange { id: usize, len: usize },
    #[error("asset id {id} ({path}) has not been loaded yet")]
    Pending { id: usize, path: PathBuf },
    #[error("asset id {id} ({path}) failed to load: {reason}")]
    Failed { id: usize, path: PathBuf, reason: String },
}

/// Outcome of one load pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Ordered list of assets addressed by insertion index.
///
/// An id handed out by [`push`](Self::push) always refers to the same path,
/// whatever happens to other slots.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` and returns its id.
    pub fn push(&mut self, path: impl Into<PathBuf>) -> usize {
        self.slots.push(Slot::Pending(path.into()));
        self.slots.len() - 1
    }

    /// Loads every pending slot with `loader`. Failures are logged and kept
    /// in their slot.
    pub fn load_pending(&mut self, kind: &str, loader: &mut impl AssetLoader<T>) -> LoadReport {
        let mut report = LoadReport::default();
        for (id, slot) in self.slots.iter_mut().enumerate() {
            let Slot::Pending(path) = slot else { continue };

            *slot = match loader.load(path) {
                Ok(value) => {
                    log::info!("loaded {kind} {id}: {}", path.display());
                    report.loaded += 1;
                    Slot::Loaded(value)
                }
                Err(e) => {
                    log::error!("failed to load {kind} {id}: {e}");
                    report.failed += 1;
                    Slot::Failed {
                        path: std::mem::take(path),
                        reason: e.to_string(),
                    }
                }
            };
        }
        report
    }

    pub fn get(&self, id: usize) -> Result<&T, RegistryError> {
        match self.slots.get(id) {
            None => Err(RegistryError::OutOfRange {
                id,
                len: self.slots.len(),
            }),
            Some(Slot::Loaded(value)) => Ok(value),
            Some(Slot::Pending(path)) => Err(RegistryError::Pending {
                id,
                path: path.clone(),
            }),
            Some(Slot::Failed { path, reason }) => Err(RegistryError::Failed {
                id,
                path: path.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn slot(&self, id: usize) -> Option<&Slot<T>> {
        self.slots.get(id)
    }

    /// Path of a pending or failed slot.
    pub fn path(&self, id: usize) -> Option<&Path> {
        self.slots.get(id).and_then(|slot| match slot {
            Slot::Pending(path) | Slot::Failed { path, .. } => Some(path.as_path()),
            Slot::Loaded(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Pending(_))).count()
    }
}

/// Textures and sounds by id, plus on-demand model import.
///
/// `T` is the texture representation: [`Texture`] handles when loading
/// through the GPU, or decoded pixels in tools and tests.
#[derive(Debug)]
pub struct AssetRegistry<T = Texture> {
    textures: Registry<T>,
    sounds: Registry<SoundData>,
}

impl<T> Default for AssetRegistry<T> {
    fn default() -> Self {
        Self {
            textures: Registry::new(),
            sounds: Registry::new(),
        }
    }
}

impl<T> AssetRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_texture_path(&mut self, path: impl Into<PathBuf>) -> usize {
        self.textures.push(path)
    }

    pub fn push_sound_path(&mut self, path: impl Into<PathBuf>) -> usize {
        self.sounds.push(path)
    }

    pub fn load_textures(&mut self, loader: &mut impl AssetLoader<T>) -> LoadReport {
        self.textures.load_pending("texture", loader)
    }

    pub fn load_sounds(&mut self, loader: &mut impl AssetLoader<SoundData>) -> LoadReport {
        self.sounds.load_pending("sound", loader)
    }

    /// Textures first, then sounds.
    pub fn load_everything(
        &mut self,
        textures: &mut impl AssetLoader<T>,
        sounds: &mut impl AssetLoader<SoundData>,
    ) -> LoadReport {
        let t = self.load_textures(textures);
        let s = self.load_sounds(sounds);
        LoadReport {
            loaded: t.loaded + s.loaded,
            failed: t.failed + s.failed,
        }
    }

    pub fn texture(&self, id: usize) -> Result<&T, RegistryError> {
        self.textures.get(id)
    }

    pub fn sound(&self, id: usize) -> Result<&SoundData, RegistryError> {
        self.sounds.get(id)
    }

    pub fn textures(&self) -> &Registry<T> {
        &self.textures
    }

    pub fn sounds(&self) -> &Registry<SoundData> {
        &self.sounds
    }

    /// Imports a model file. Models are not registered.
    pub fn load_model(&self, path: impl AsRef<Path>) -> Result<MeshData<Vertex3D>, AssetError> {
        ObjLoader.load(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageLoader;
    use crate::render::CpuTexture;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        ::image::RgbaImage::new(w, h).save(&path).unwrap();
        path
    }

    fn fail_on(bad: &'static str) -> impl FnMut(&Path) -> Result<u32, AssetError> {
        move |path: &Path| {
            if path.ends_with(bad) {
                Err(AssetError::EmptyImage {
                    path: path.to_path_buf(),
                })
            } else {
                Ok(path.to_string_lossy().len() as u32)
            }
        }
    }

    #[test]
    fn ids_follow_push_order() {
        let mut reg: AssetRegistry<CpuTexture> = AssetRegistry::new();
        assert_eq!(reg.push_texture_path("a.png"), 0);
        assert_eq!(reg.push_texture_path("b.png"), 1);
        assert_eq!(reg.push_sound_path("a.ogg"), 0);
    }

    #[test]
    fn loads_two_pngs_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 2);
        let b = write_png(dir.path(), "b.png", 8, 8);

        let mut reg: AssetRegistry<CpuTexture> = AssetRegistry::new();
        reg.push_texture_path(&a);
        reg.push_texture_path(&b);
        let report = reg.load_textures(&mut ImageLoader);

        assert_eq!(report, LoadReport { loaded: 2, failed: 0 });
        let t0 = reg.texture(0).unwrap();
        let t1 = reg.texture(1).unwrap();
        assert_eq!((t0.width, t0.height), (4, 2));
        assert_eq!((t1.width, t1.height), (8, 8));
    }

    #[test]
    fn failed_load_keeps_later_ids_aligned() {
        let mut reg = Registry::new();
        reg.push("first");
        reg.push("broken");
        reg.push("third");

        let report = reg.load_pending("test", &mut fail_on("broken"));
        assert_eq!(report, LoadReport { loaded: 2, failed: 1 });

        assert_eq!(reg.get(0), Ok(&5));
        assert!(matches!(reg.get(1), Err(RegistryError::Failed { id: 1, .. })));
        assert_eq!(reg.get(2), Ok(&5));
        assert_eq!(reg.path(1), Some(Path::new("broken")));
    }

    #[test]
    fn missing_png_becomes_failed_slot() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 1, 1);

        let mut reg: AssetRegistry<CpuTexture> = AssetRegistry::new();
        reg.push_texture_path(dir.path().join("gone.png"));
        reg.push_texture_path(&a);
        reg.load_textures(&mut ImageLoader);

        assert!(matches!(reg.texture(0), Err(RegistryError::Failed { .. })));
        assert!(reg.texture(1).is_ok());
    }

    #[test]
    fn out_of_range_and_pending_are_errors() {
        let mut reg: Registry<u32> = Registry::new();
        assert_eq!(reg.get(0), Err(RegistryError::OutOfRange { id: 0, len: 0 }));

        reg.push("x");
        assert!(matches!(reg.get(0), Err(RegistryError::Pending { .. })));
        assert_eq!(reg.pending(), 1);
    }

    #[test]
    fn push_after_load_appends_without_reloading() {
        let mut reg = Registry::new();
        reg.push("one");
        let mut calls = 0;
        let mut loader = |_: &Path| {
            calls += 1;
            Ok::<_, AssetError>(calls)
        };
        reg.load_pending("test", &mut loader);

        let id = reg.push("two");
        assert_eq!(id, 1);
        reg.load_pending("test", &mut loader);

        assert_eq!(reg.get(0), Ok(&1));
        assert_eq!(reg.get(1), Ok(&2));
    }

    #[test]
    fn load_everything_covers_both_kinds() {
        let mut reg: AssetRegistry<u32> = AssetRegistry::new();
        reg.push_texture_path("t");
        reg.push_sound_path("missing.wav");

        let report = reg.load_everything(&mut fail_on("never"), &mut crate::assets::SoundLoader);
        assert_eq!(report, LoadReport { loaded: 1, failed: 1 });
        assert!(reg.texture(0).is_ok());
        assert!(matches!(reg.sound(0), Err(RegistryError::Failed { .. })));
    }

    #[test]
    fn load_model_reads_obj() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let reg: AssetRegistry<u32> = AssetRegistry::new();
        let mesh = reg.load_model(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }
}
