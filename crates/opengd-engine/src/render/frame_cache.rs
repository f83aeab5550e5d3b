use std::collections::HashMap;
use std::hash::Hash;

/// Map whose entries expire after going unused for a number of frames.
///
/// Call [`end_frame`](Self::end_frame) once per presented frame.
#[derive(Debug)]
pub struct FrameCache<K, V> {
    entries: HashMap<K, (V, u64)>,
    frame: u64,
    max_idle_frames: u64,
}

impl<K: Eq + Hash, V> FrameCache<K, V> {
    pub fn new(max_idle_frames: u64) -> Self {
        Self {
            entries: HashMap::new(),
            frame: 0,
            max_idle_frames,
        }
    }

    /// Returns the entry for `key`, creating it with `make` if absent, and
    /// marks it used this frame.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &V {
        let frame = self.frame;
        let entry = self.entries.entry(key).or_insert_with(|| (make(), frame));
        entry.1 = frame;
        &entry.0
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(v, _)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances the frame counter and drops entries idle for longer than the
    /// limit. Returns how many were dropped.
    pub fn end_frame(&mut self) -> usize {
        let before = self.entries.len();
        let frame = self.frame;
        let max_idle = self.max_idle_frames;
        self.entries.retain(|_, (_, last)| frame - *last <= max_idle);
        self.frame += 1;
        before - self.entries.len()
    }
}
