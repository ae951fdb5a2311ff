use crate::buffer::{Dirty, GraphPointBuffer, Point};
use dash_core::Result;

/// Value range mapped onto the graph's `[0, 1]` y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min: f32,
    pub max: f32,
}

impl Viewport {
    pub const UNIT: Viewport = Viewport { min: 0.0, max: 1.0 };
    pub const PERCENT: Viewport = Viewport {
        min: 0.0,
        max: 100.0,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Map `value` into `[0, 1]`, clamping anything outside the range.
    #[must_use]
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if !(span > 0.0) || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Shared push/update interface of the plain and smoothed graphs.
pub trait Graph {
    /// Feed one raw sample; reports which vertices the renderer must re-upload.
    fn push_sample(&mut self, value: f32) -> Result<Dirty>;

    /// Replace the whole history with `values` (oldest first).
    fn set_samples(&mut self, values: &[f32]) -> Result<Dirty>;

    /// Clear the history and show `sample_count` raw samples from now on.
    fn reset(&mut self, sample_count: usize) -> Dirty;

    /// Raw samples visible at once.
    fn sample_count(&self) -> usize;

    fn viewport(&self) -> Viewport;

    fn buffer(&self) -> &GraphPointBuffer;

    /// Vertices to draw, see [`GraphPointBuffer::line`].
    fn line(&self) -> &[Point] {
        self.buffer().line()
    }
}

/// One buffer point per raw sample.
#[derive(Debug, Clone)]
pub struct LineGraph {
    buffer: GraphPointBuffer,
    viewport: Viewport,
}

impl LineGraph {
    pub fn new(sample_count: usize, viewport: Viewport) -> Self {
        Self {
            buffer: GraphPointBuffer::new(sample_count),
            viewport,
        }
    }
}

impl Graph for LineGraph {
    fn push_sample(&mut self, value: f32) -> Result<Dirty> {
        let rolled = self.buffer.push_point(self.viewport.normalize(value))?;
        Ok(if rolled { Dirty::All } else { Dirty::Tail(1) })
    }

    fn set_samples(&mut self, values: &[f32]) -> Result<Dirty> {
        let normalized: Vec<f32> = values.iter().map(|v| self.viewport.normalize(*v)).collect();
        self.buffer.set_points(&normalized);
        Ok(Dirty::All)
    }

    fn reset(&mut self, sample_count: usize) -> Dirty {
        self.buffer.reset_points(sample_count);
        Dirty::All
    }

    fn sample_count(&self) -> usize {
        self.buffer.num_points()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn buffer(&self) -> &GraphPointBuffer {
        &self.buffer
    }
}
