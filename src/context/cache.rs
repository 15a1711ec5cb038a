use std::sync::Arc;

use crate::foundation::core::{Frame, Viewport};
use crate::foundation::hash::StableHasher;
use crate::render::image::MaskImage;

/// Identity of a rendered mask: the edit age plus the render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaskKey {
    /// Context age at sampling time.
    pub age: u64,
    /// Frame.
    pub time: Frame,
    /// Mipmap level.
    pub mip_level: u32,
    /// Requested full-resolution viewport.
    pub viewport: Viewport,
}

impl MaskKey {
    /// Stable 64-bit fingerprint of the key.
    pub fn fingerprint(&self) -> u64 {
        let mut h = StableHasher::new();
        h.write_u64(self.age);
        h.write_i32(self.time.0);
        h.write_u32(self.mip_level);
        h.write_i32(self.viewport.x);
        h.write_i32(self.viewport.y);
        h.write_u32(self.viewport.width);
        h.write_u32(self.viewport.height);
        h.finish()
    }
}

/// Hit/miss counters of the mask memo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from the memo.
    pub hits: u64,
    /// Requests that rendered.
    pub misses: u64,
}

struct Entry {
    key: MaskKey,
    fingerprint: u64,
    image: Arc<MaskImage>,
}

/// Single-slot memo of the last rendered mask.
#[derive(Default)]
pub(crate) struct MaskCache {
    slot: Option<Entry>,
    stats: CacheStats,
}

impl MaskCache {
    pub(crate) fn lookup(&mut self, key: &MaskKey) -> Option<Arc<MaskImage>> {
        let fingerprint = key.fingerprint();
        match &self.slot {
            Some(e) if e.fingerprint == fingerprint && e.key == *key => {
                self.stats.hits += 1;
                tracing::debug!(fingerprint = format_args!("{fingerprint:016x}"), "mask cache hit");
                Some(Arc::clone(&e.image))
            }
            _ => {
                self.stats.misses += 1;
                tracing::debug!(fingerprint = format_args!("{fingerprint:016x}"), "mask cache miss");
                None
            }
        }
    }

    pub(crate) fn store(&mut self, key: MaskKey, image: Arc<MaskImage>) {
        self.slot = Some(Entry {
            fingerprint: key.fingerprint(),
            key,
            image,
        });
    }

    pub(crate) fn clear(&mut self) {
        self.slot = None;
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/cache.rs"]
mod tests;
