use rayon::prelude::*;

use crate::foundation::core::Viewport;
use crate::foundation::error::{RotoError, RotoResult};
use crate::render::config::RenderConfig;
use crate::render::image::MaskImage;
use crate::render::raster::{PreparedShape, RowScratch, composite_row};
use crate::render::sample::ShapeSample;

/// Area and resolution a mask is rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    /// Area in mip-level pixels.
    pub viewport: Viewport,
    /// Mipmap level; level `L` renders at `1 / 2^L` scale.
    pub mip_level: u32,
}

impl RenderTarget {
    /// Target covering the full-resolution `viewport` at `mip_level`.
    pub fn new(viewport: Viewport, mip_level: u32) -> Self {
        Self {
            viewport: viewport.at_mip(mip_level),
            mip_level,
        }
    }
}

/// Rasterizes flattened shapes into a [`MaskImage`].
///
/// Shapes arrive bottom first and already scaled to the target's mip level.
pub trait MaskRenderer: Send + Sync {
    /// Render `shapes` over `target`.
    fn render(&self, shapes: &[ShapeSample], target: &RenderTarget) -> RotoResult<MaskImage>;
}

/// Default CPU renderer: even-odd scanline fill with sub-scanline antialiasing, rows in parallel.
#[derive(Debug, Default)]
pub struct ScanlineRenderer {
    pool: Option<rayon::ThreadPool>,
}

impl ScanlineRenderer {
    /// Renderer using the global rayon pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer honouring `config.threads`.
    pub fn from_config(config: &RenderConfig) -> RotoResult<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(_) => Some(build_thread_pool(config.threads)?),
            None => None,
        };
        Ok(Self { pool })
    }
}

impl MaskRenderer for ScanlineRenderer {
    #[tracing::instrument(
        skip_all,
        fields(
            shapes = shapes.len(),
            width = target.viewport.width,
            height = target.viewport.height,
            mip = target.mip_level
        )
    )]
    fn render(&self, shapes: &[ShapeSample], target: &RenderTarget) -> RotoResult<MaskImage> {
        let viewport = target.viewport;
        let width = viewport.width as usize;
        if width == 0 || viewport.height == 0 {
            return Err(RotoError::render("render target must not be empty"));
        }
        let prepared: Vec<PreparedShape<'_>> = shapes.iter().map(PreparedShape::new).collect();
        let mut data = vec![0.0f32; viewport.area()];

        let fill = |data: &mut [f32]| {
            data.par_chunks_mut(width).enumerate().for_each_init(
                RowScratch::default,
                |scratch, (row, out)| composite_row(&prepared, viewport, row, out, scratch),
            );
        };
        match &self.pool {
            Some(pool) => pool.install(|| fill(&mut data)),
            None => fill(&mut data),
        }

        MaskImage::from_data(viewport, target.mip_level, data)
    }
}

fn build_thread_pool(threads: Option<usize>) -> RotoResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RotoError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RotoError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
