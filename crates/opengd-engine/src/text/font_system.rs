use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Glyph, GlyphCache, GlyphCacheConfig, GlyphKey, Rasterizer};

/// Error returned by font loading and text drawing.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("no font face loaded")]
    NoActiveFace,
    #[error("unknown font face {0:?}")]
    UnknownFace(FontId),
}

/// Caller-chosen slot for a font face.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub u32);

/// Owns the loaded font faces and the glyph cache.
///
/// Text is always drawn with the *active* face: the most recently loaded
/// one, or the one picked with [`select`](Self::select).
pub struct FontSystem {
    faces: HashMap<FontId, Box<dyn Rasterizer>>,
    /// Bumped each time a slot is reloaded; part of every [`GlyphKey`].
    generations: HashMap<FontId, u32>,
    active: Option<FontId>,
    cache: GlyphCache,
}

impl FontSystem {
    pub fn new() -> Self {
        Self::with_cache(GlyphCacheConfig::default())
    }

    pub fn with_cache(config: GlyphCacheConfig) -> Self {
        Self {
            faces: HashMap::new(),
            generations: HashMap::new(),
            active: None,
            cache: GlyphCache::new(config),
        }
    }

    /// Loads a TrueType/OpenType file into slot `id` and makes it active.
    ///
    /// On failure the previous face (if any) stays active.
    pub fn load_font(&mut self, path: impl AsRef<Path>, id: FontId) -> Result<(), TextError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |message| TextError::Parse {
                path: path.to_path_buf(),
                message: message.to_string(),
            },
        )?;

        self.insert_face(id, font);
        log::info!("loaded font {} into slot {}", path.display(), id.0);
        Ok(())
    }

    /// Stores `face` in slot `id`, replacing any previous face there, and
    /// makes it active.
    ///
    /// Replacing a face moves the slot to a new generation, so glyph keys
    /// handed out before (and any GPU textures cached under them) go stale.
    pub fn insert_face(&mut self, id: FontId, face: impl Rasterizer + 'static) {
        if self.faces.insert(id, Box::new(face)).is_some() {
            let generation = self.generations.entry(id).or_insert(0);
            *generation = generation.wrapping_add(1);
            self.cache.purge_face(id);
        }
        self.active = Some(id);
    }

    /// Makes an already loaded face active.
    pub fn select(&mut self, id: FontId) -> Result<(), TextError> {
        if !self.faces.contains_key(&id) {
            return Err(TextError::UnknownFace(id));
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn active(&self) -> Option<FontId> {
        self.active
    }

    pub fn has_face(&self, id: FontId) -> bool {
        self.faces.contains_key(&id)
    }

    /// Rasterizes `ch` with the active face at `px` pixels, through the cache.
    pub fn glyph(&mut self, ch: char, px: u32) -> Result<(GlyphKey, Arc<Glyph>), TextError> {
        let face_id = self.active.ok_or(TextError::NoActiveFace)?;
        let face = self
            .faces
            .get(&face_id)
            .ok_or(TextError::UnknownFace(face_id))?;

        let generation = self.generations.get(&face_id).copied().unwrap_or(0);
        let key = GlyphKey {
            face: face_id,
            generation,
            px,
            ch,
        };
        let glyph = self
            .cache
            .get_or_insert_with(key, || face.rasterize(ch, px as f32));
        Ok((key, glyph))
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::GlyphMetrics;

    /// Square glyph whose side equals the pixel size.
    struct Blocks;

    impl Rasterizer for Blocks {
        fn rasterize(&self, _ch: char, px: f32) -> Glyph {
            let side = px as u32;
            Glyph {
                metrics: GlyphMetrics { left: 0, top: side as i32, width: side, height: side },
                bitmap: vec![255; (side * side) as usize],
            }
        }
    }

    #[test]
    fn glyph_without_face_is_an_error() {
        let mut fonts = FontSystem::new();
        assert!(matches!(fonts.glyph('a', 16), Err(TextError::NoActiveFace)));
    }

    #[test]
    fn last_inserted_face_is_active() {
        let mut fonts = FontSystem::new();
        fonts.insert_face(FontId(3), Blocks);
        fonts.insert_face(FontId(7), Blocks);
        assert_eq!(fonts.active(), Some(FontId(7)));

        fonts.select(FontId(3)).unwrap();
        assert_eq!(fonts.active(), Some(FontId(3)));
        assert!(matches!(fonts.select(FontId(9)), Err(TextError::UnknownFace(FontId(9)))));
    }

    #[test]
    fn pixel_size_is_per_call() {
        let mut fonts = FontSystem::new();
        fonts.insert_face(FontId(0), Blocks);
        let (_, small) = fonts.glyph('a', 8).unwrap();
        let (_, large) = fonts.glyph('a', 32).unwrap();
        let (_, small_again) = fonts.glyph('a', 8).unwrap();
        assert_eq!(small.metrics.width, 8);
        assert_eq!(large.metrics.width, 32);
        assert_eq!(small_again.metrics.width, 8);
    }

    /// Every glyph is a filled square of one coverage value.
    struct Flat(u8);

    impl Rasterizer for Flat {
        fn rasterize(&self, _ch: char, _px: f32) -> Glyph {
            Glyph {
                metrics: GlyphMetrics { left: 0, top: 2, width: 2, height: 2 },
                bitmap: vec![self.0; 4],
            }
        }
    }

    #[test]
    fn reloading_a_slot_invalidates_gpu_side_glyphs() {
        use crate::render::FrameCache;

        let mut fonts = FontSystem::new();
        let mut uploaded: FrameCache<GlyphKey, Vec<u8>> = FrameCache::new(120);

        fonts.insert_face(FontId(0), Flat(10));
        let (old_key, old) = fonts.glyph('a', 16).unwrap();
        uploaded.get_or_insert_with(old_key, || old.bitmap.clone());

        fonts.insert_face(FontId(0), Flat(200));
        let (new_key, new) = fonts.glyph('a', 16).unwrap();
        assert_ne!(old_key, new_key);
        assert_eq!(new.bitmap, vec![200; 4]);

        let texture = uploaded.get_or_insert_with(new_key, || new.bitmap.clone());
        assert_eq!(texture, &vec![200; 4]);
    }

    #[test]
    fn inserting_a_new_slot_keeps_other_keys() {
        let mut fonts = FontSystem::new();
        fonts.insert_face(FontId(0), Flat(10));
        let (before, _) = fonts.glyph('a', 16).unwrap();
        fonts.insert_face(FontId(1), Flat(20));
        fonts.select(FontId(0)).unwrap();
        let (after, _) = fonts.glyph('a', 16).unwrap();
        assert_eq!(before, after);
        assert_eq!(fonts.cache().stats(), (1, 1));
    }

    #[test]
    fn missing_font_file_reports_read_error() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_font("does/not/exist.ttf", FontId(0)).unwrap_err();
        assert!(matches!(err, TextError::Read { .. }));
        assert_eq!(fonts.active(), None);
    }

    #[test]
    fn garbage_font_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let mut fonts = FontSystem::new();
        let err = fonts.load_font(&path, FontId(0)).unwrap_err();
        assert!(matches!(err, TextError::Parse { .. }));
    }
}
