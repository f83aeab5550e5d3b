use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::{FontId, Glyph};

/// Cache key: one glyph of one face at one pixel size.
///
/// `generation` changes every time the face slot is reloaded, so glyphs of
/// a replaced face never match keys of its successor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GlyphKey {
    pub face: FontId,
    pub generation: u32,
    pub px: u32,
    pub ch: char,
}

#[derive(Debug, Clone)]
pub struct GlyphCacheConfig {
    /// Maximum number of glyphs kept. The least recently used glyph is
    /// evicted when a new one would exceed it.
    pub capacity: usize,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// LRU cache of rasterized glyphs.
///
/// Glyphs are shared as `Arc<Glyph>` so recorded draw commands can keep
/// one alive after it was evicted.
pub struct GlyphCache {
    entries: LruCache<GlyphKey, Arc<Glyph>>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    pub fn new(config: GlyphCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached glyph for `key`, rasterizing with `raster` on a miss.
    pub fn get_or_insert_with(
        &mut self,
        key: GlyphKey,
        raster: impl FnOnce() -> Glyph,
    ) -> Arc<Glyph> {
        if let Some(glyph) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(glyph);
        }

        self.misses += 1;
        let glyph = Arc::new(raster());
        self.entries.put(key, Arc::clone(&glyph));
        glyph
    }

    /// Presence check that does not count as a use.
    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Drops every glyph of `face` (used when a face slot is replaced).
    pub fn purge_face(&mut self, face: FontId) {
        let stale: Vec<GlyphKey> = self
            .entries
            .iter()
            .filter(|(k, _)| k.face == face)
            .map(|(k, _)| *k)
            .collect();
        for key in stale {
            self.entries.pop(&key);
        }
    }
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new(GlyphCacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ch: char) -> GlyphKey {
        GlyphKey { face: FontId(0), generation: 0, px: 16, ch }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache = GlyphCache::default();
        let mut rasterized = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(key('a'), || {
                rasterized += 1;
                Glyph::default()
            });
        }
        assert_eq!(rasterized, 1);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn size_is_part_of_the_key() {
        let mut cache = GlyphCache::default();
        cache.get_or_insert_with(key('a'), Glyph::default);
        cache.get_or_insert_with(GlyphKey { px: 32, ..key('a') }, Glyph::default);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = GlyphCache::new(GlyphCacheConfig { capacity: 2 });
        cache.get_or_insert_with(key('a'), Glyph::default);
        cache.get_or_insert_with(key('b'), Glyph::default);
        // touch 'a' so 'b' is the oldest
        cache.get_or_insert_with(key('a'), Glyph::default);
        cache.get_or_insert_with(key('c'), Glyph::default);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key('a')));
        assert!(!cache.contains(&key('b')));
        assert!(cache.contains(&key('c')));
    }

    #[test]
    fn purge_face_only_touches_that_face() {
        let mut cache = GlyphCache::default();
        cache.get_or_insert_with(key('a'), Glyph::default);
        cache.get_or_insert_with(GlyphKey { face: FontId(1), ..key('a') }, Glyph::default);
        cache.purge_face(FontId(0));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&GlyphKey { face: FontId(1), ..key('a') }));
    }

    #[test]
    fn zero_capacity_keeps_one_glyph() {
        let mut cache = GlyphCache::new(GlyphCacheConfig { capacity: 0 });
        cache.get_or_insert_with(key('a'), Glyph::default);
        cache.get_or_insert_with(key('b'), Glyph::default);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key('b')));
    }
}
