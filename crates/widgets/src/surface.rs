use dash_core::Rect;
use dash_graph::{Dirty, Point};
use tracing::trace;

/// Renderer-facing sink the widgets draw into.
///
/// Implementations own the GPU buffers; `upload` says how much of the
/// retained vertex data is stale.
pub trait Surface {
    /// Draw a polyline. `points` is the whole visible window; x values must be
    /// translated by `-scroll_offset`. `upload` is `None` when nothing changed
    /// since the previous draw.
    fn line(
        &mut self,
        id: &str,
        viewport: Rect,
        points: &[Point],
        scroll_offset: f32,
        upload: Option<Dirty>,
    );

    fn text(&mut self, id: &str, viewport: Rect, text: &str);
}

/// Surface that only traces what would have been drawn.
#[derive(Debug, Default)]
pub struct TraceSurface {
    frames: u64,
}

impl TraceSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for TraceSurface {
    fn line(
        &mut self,
        id: &str,
        _viewport: Rect,
        points: &[Point],
        _scroll_offset: f32,
        upload: Option<Dirty>,
    ) {
        if let Some(upload) = upload {
            let newest = points.last().map_or(0.0, |p| p.y);
            trace!(widget = id, ?upload, points = points.len(), newest, "line");
        }
    }

    fn text(&mut self, id: &str, _viewport: Rect, text: &str) {
        trace!(widget = id, text, "text");
    }
}
