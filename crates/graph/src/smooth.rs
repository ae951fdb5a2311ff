use crate::buffer::{Dirty, GraphPointBuffer};
use crate::graph::{Graph, Viewport};
use crate::spline::Segment;
use dash_core::{DashError, Result};
use std::collections::VecDeque;

/// Raw samples kept for curve fitting: the newest segment plus one neighbour on each side.
const CONTROL_POINTS: usize = 4;

/// Where a smoothed graph is in filling its control window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    /// Fewer than four raw samples seen since the last reset.
    Warming,
    /// Sliding window of four raw samples.
    Steady,
}

/// Graph that draws a Catmull-Rom curve through its raw samples.
///
/// Every raw sample becomes `precision` buffer points. Because a segment's
/// shape depends on the sample after it, each new sample also rewrites the
/// points of the segment before it; older history is never touched.
#[derive(Debug, Clone)]
pub struct SmoothGraph {
    buffer: GraphPointBuffer,
    viewport: Viewport,
    precision: usize,
    sample_count: usize,
    window: VecDeque<f32>,
}

impl SmoothGraph {
    pub fn new(sample_count: usize, precision: usize, viewport: Viewport) -> Self {
        let precision = precision.max(1);
        Self {
            buffer: GraphPointBuffer::new(sample_count * precision),
            viewport,
            precision,
            sample_count,
            window: VecDeque::with_capacity(CONTROL_POINTS),
        }
    }

    pub fn phase(&self) -> Phase {
        match self.window.len() {
            0 => Phase::Empty,
            n if n < CONTROL_POINTS => Phase::Warming,
            _ => Phase::Steady,
        }
    }

    fn control_points(&self) -> ([f32; CONTROL_POINTS], usize) {
        let mut points = [0.0; CONTROL_POINTS];
        for (slot, value) in points.iter_mut().zip(&self.window) {
            *slot = *value;
        }
        (points, self.window.len())
    }

    fn rewrite_previous_segment(&mut self, segment: Segment) -> Result<()> {
        let start = self.buffer.num_points() - self.precision;
        for (k, y) in segment.sample(self.precision).enumerate() {
            self.buffer.set_y(start + k, y.clamp(0.0, 1.0))?;
        }
        Ok(())
    }
}

impl Graph for SmoothGraph {
    fn push_sample(&mut self, value: f32) -> Result<Dirty> {
        if self.buffer.is_empty() {
            return Err(DashError::Graph("smooth graph has no samples to show".into()));
        }

        if self.window.len() == CONTROL_POINTS {
            self.window.pop_front();
        }
        self.window.push_back(self.viewport.normalize(value));

        let (points, n) = self.control_points();
        let window = &points[..n];
        let mut rolled = false;

        let Some(newest) = n.checked_sub(2).and_then(|i| Segment::from_window(window, i)) else {
            let floor = self.buffer.floor();
            for _ in 0..self.precision {
                rolled |= self.buffer.push_point(floor)?;
            }
            return Ok(if rolled { Dirty::All } else { Dirty::Tail(self.precision) });
        };

        let mut dirty = Dirty::Tail(self.precision);
        if let Some(previous) = n.checked_sub(3).and_then(|i| Segment::from_window(window, i)) {
            self.rewrite_previous_segment(previous)?;
            dirty = Dirty::Tail(2 * self.precision);
        }

        for y in newest.sample(self.precision) {
            rolled |= self.buffer.push_point(y.clamp(0.0, 1.0))?;
        }

        Ok(if rolled { Dirty::All } else { dirty })
    }

    fn set_samples(&mut self, values: &[f32]) -> Result<Dirty> {
        self.reset(values.len());
        for value in values {
            self.push_sample(*value)?;
        }
        // Live pushes start from the floor; a known history starts at its first value.
        if let [first, _, ..] = values {
            let first = self.viewport.normalize(*first);
            for k in 0..self.precision {
                self.buffer.set_y(k, first)?;
            }
        }
        Ok(Dirty::All)
    }

    fn reset(&mut self, sample_count: usize) -> Dirty {
        self.sample_count = sample_count;
        self.buffer.reset_points(sample_count * self.precision);
        self.window.clear();
        Dirty::All
    }

    fn sample_count(&self) -> usize {
        self.sample_count
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn buffer(&self) -> &GraphPointBuffer {
        &self.buffer
    }
}
