use crate::foundation::error::{RotoError, RotoResult};

/// Polyline samples per cubic segment at full resolution.
pub const DEFAULT_SEGMENTS_PER_BEZIER: usize = 50;
/// Lower bound on samples per segment at coarse mip levels.
pub const DEFAULT_MIN_SEGMENTS: usize = 4;

/// Rasterization settings.
///
/// `ROTOMASK_SEGMENTS` and `ROTOMASK_THREADS` override the defaults through
/// [`RenderConfig::from_env`]; unparsable or zero values are ignored.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    /// Samples per cubic segment at mip level 0.
    pub segments_per_bezier: usize,
    /// Minimum samples per segment at any mip level.
    pub min_segments: usize,
    /// Worker threads for a dedicated rayon pool. `None` uses the global pool.
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            segments_per_bezier: DEFAULT_SEGMENTS_PER_BEZIER,
            min_segments: DEFAULT_MIN_SEGMENTS,
            threads: None,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `ROTOMASK_SEGMENTS` / `ROTOMASK_THREADS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
        };
        let defaults = Self::default();
        Self {
            segments_per_bezier: positive("ROTOMASK_SEGMENTS")
                .unwrap_or(defaults.segments_per_bezier),
            min_segments: defaults.min_segments,
            threads: positive("ROTOMASK_THREADS"),
        }
    }

    /// Samples per cubic segment at `mip_level`: halved per level, never below `min_segments`.
    pub fn segments_at_mip(&self, mip_level: u32) -> usize {
        let halved = self
            .segments_per_bezier
            .checked_shr(mip_level)
            .unwrap_or(0);
        halved.max(self.min_segments).max(1)
    }

    /// Reject settings the renderer cannot honour.
    pub fn validate(&self) -> RotoResult<()> {
        if self.segments_per_bezier == 0 {
            return Err(RotoError::validation("segments_per_bezier must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(RotoError::validation(
                "render 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
