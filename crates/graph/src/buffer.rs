//! Rolling point storage for scrolling line graphs.
//!
//! The buffer keeps `2 * n` physical slots for an `n`-point window. Each slot
//! has a fixed x coordinate computed at layout time; scrolling only moves the
//! `[tail, head]` window forward and writes the new y value. When the head
//! reaches the last physical slot the live window is copied back to the front
//! (a rollover), which happens once every `n` pushes.

use dash_core::{DashError, Result};
use std::ops::Index;
use tracing::trace;

/// y value given to slots that have not received a sample yet.
pub const DEFAULT_Y: f32 = 0.0;

/// x distance to the synthetic second point of a single-sample window.
pub const SINGLE_POINT_SPAN: f32 = 1.0;

/// A graph vertex. `x` is the normalised time position, `y` the normalised sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Which part of a graph's vertices must be re-uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirty {
    /// Only the last `n` points of the window changed.
    Tail(usize),
    /// Everything changed (rollover, resize or reset).
    All,
}

impl Dirty {
    /// Combine two pending upload hints.
    #[must_use]
    pub fn merge(self, other: Dirty) -> Dirty {
        match (self, other) {
            (Dirty::Tail(a), Dirty::Tail(b)) => Dirty::Tail(a + b),
            _ => Dirty::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphPointBuffer {
    points: Vec<Point>,
    head: usize,
    tail: usize,
    len: usize,
    floor: f32,
}

impl GraphPointBuffer {
    /// A window of `capacity` points, all at [`DEFAULT_Y`].
    pub fn new(capacity: usize) -> Self {
        Self::with_floor(capacity, DEFAULT_Y)
    }

    /// Like [`new`](Self::new) but with a custom placeholder y value.
    pub fn with_floor(capacity: usize, floor: f32) -> Self {
        let mut buffer = Self {
            points: Vec::new(),
            head: 0,
            tail: 0,
            len: 0,
            floor,
        };
        buffer.reset_points(capacity);
        buffer
    }

    /// Re-lay the buffer for `capacity` points and reset every y to the floor.
    pub fn reset_points(&mut self, capacity: usize) {
        self.layout(capacity);
    }

    /// Replace the window with `values`, oldest first.
    ///
    /// A single value gets a synthetic second point [`SINGLE_POINT_SPAN`] to
    /// its right so the window still renders as a (flat) line.
    pub fn set_points(&mut self, values: &[f32]) {
        self.layout(values.len());
        for (point, &y) in self.points.iter_mut().zip(values) {
            point.y = y;
        }
        if let [only] = values {
            self.points[1].y = *only;
        }
    }

    /// Append `y` as the newest point and drop the oldest one.
    ///
    /// Returns `true` when the push caused a rollover, in which case every
    /// point of the window moved and the whole range must be re-uploaded.
    pub fn push_point(&mut self, y: f32) -> Result<bool> {
        if self.len == 0 {
            return Err(DashError::Graph("push into an empty point buffer".into()));
        }

        self.head += 1;
        self.tail += 1;
        self.points[self.head].y = y;

        if self.head + 1 < self.points.len() {
            return Ok(false);
        }

        // Slots keep their x; only the y values travel back to the front.
        for i in 0..self.len {
            self.points[i].y = self.points[self.tail + i].y;
        }
        self.tail = 0;
        self.head = self.len - 1;
        trace!(points = self.len, "point buffer rolled over");
        Ok(true)
    }

    /// Overwrite the y value at logical offset `index` from the tail.
    pub fn set_y(&mut self, index: usize, y: f32) -> Result<()> {
        if index >= self.len {
            return Err(DashError::Graph(format!(
                "index {index} out of range for {} points",
                self.len
            )));
        }
        self.points[self.tail + index].y = y;
        if self.len == 1 {
            self.points[self.tail + 1].y = y;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        (index < self.len).then(|| &self.points[self.tail + index])
    }

    /// Oldest point of the window.
    pub fn front(&self) -> Option<&Point> {
        self.get(0)
    }

    /// Newest point of the window.
    pub fn back(&self) -> Option<&Point> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// The valid window `[tail, head]`, contiguous and ordered by x.
    pub fn points(&self) -> &[Point] {
        if self.len == 0 {
            return &[];
        }
        &self.points[self.tail..=self.head]
    }

    /// The range a renderer should draw: the window, plus the synthetic
    /// second point when the window holds a single sample.
    pub fn line(&self) -> &[Point] {
        match self.len {
            0 => &[],
            1 => &self.points[self.tail..self.tail + 2],
            _ => self.points(),
        }
    }

    /// x of the oldest point; renderers translate by `-scroll_offset()`.
    pub fn scroll_offset(&self) -> f32 {
        self.front().map_or(0.0, |p| p.x)
    }

    pub fn num_points(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical slot count, `2 * num_points()`.
    pub fn buffer_size(&self) -> usize {
        self.points.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    fn layout(&mut self, len: usize) {
        self.points.clear();
        self.len = len;
        self.tail = 0;
        self.head = len.saturating_sub(1);
        if len == 0 {
            return;
        }

        let step = if len == 1 {
            SINGLE_POINT_SPAN
        } else {
            1.0 / (len - 1) as f32
        };
        let floor = self.floor;
        self.points
            .extend((0..2 * len).map(|i| Point::new(i as f32 * step, floor)));
    }
}

impl Index<usize> for GraphPointBuffer {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        assert!(
            index < self.len,
            "point index {index} out of range for {} points",
            self.len
        );
        &self.points[self.tail + index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ys(buffer: &GraphPointBuffer) -> Vec<f32> {
        buffer.points().iter().map(|p| p.y).collect()
    }

    #[test]
    fn fresh_buffer_is_full_of_defaults() {
        for capacity in [1, 2, 3, 17, 120] {
            let buffer = GraphPointBuffer::new(capacity);
            assert_eq!(buffer.num_points(), capacity);
            assert_eq!(buffer.head(), capacity - 1);
            assert_eq!(buffer.tail(), 0);
            assert_eq!(buffer.buffer_size(), 2 * capacity);
            assert!(buffer.points().iter().all(|p| p.y == DEFAULT_Y));
        }
    }

    #[test]
    fn zero_capacity_is_empty() {
        let mut buffer = GraphPointBuffer::new(0);
        assert!(buffer.is_empty());
        assert_eq!((buffer.head(), buffer.tail()), (0, 0));
        assert!(buffer.front().is_none());
        assert!(buffer.line().is_empty());
        assert!(matches!(buffer.push_point(1.0), Err(DashError::Graph(_))));
    }

    #[test]
    fn push_without_rollover_changes_only_the_newest_point() {
        let mut buffer = GraphPointBuffer::new(6);
        buffer.set_points(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

        for (i, y) in [0.7, 0.8, 0.9, 1.0, 0.0].into_iter().enumerate() {
            let before = ys(&buffer);
            assert!(!buffer.push_point(y).unwrap(), "push {i} rolled over early");
            let after = ys(&buffer);
            assert_eq!(after[..after.len() - 1], before[1..]);
            assert_eq!(buffer.back().unwrap().y, y);
        }
    }

    #[test]
    fn capacity_pushes_trigger_exactly_one_rollover() {
        let capacity = 8;
        let mut buffer = GraphPointBuffer::new(capacity);

        for n in 1..=capacity {
            let rolled = buffer.push_point(n as f32).unwrap();
            assert_eq!(rolled, n == capacity, "push {n}");
        }
        assert_eq!(buffer.tail(), 0);
        assert_eq!(buffer.head(), capacity - 1);
        assert_eq!(buffer.num_points(), capacity);
        assert_eq!(ys(&buffer), (1..=capacity).map(|n| n as f32).collect::<Vec<_>>());
    }

    #[test]
    fn rollover_keeps_x_positions_ordered() {
        let mut buffer = GraphPointBuffer::new(4);
        for n in 0..11 {
            buffer.push_point(n as f32).unwrap();
            let xs: Vec<f32> = buffer.points().iter().map(|p| p.x).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
            assert!((xs[3] - xs[0] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sliding_window_of_three() {
        let mut buffer = GraphPointBuffer::new(3);
        for y in [1.0, 2.0, 3.0, 4.0] {
            buffer.push_point(y).unwrap();
        }
        assert_eq!([buffer[0].y, buffer[1].y, buffer[2].y], [2.0, 3.0, 4.0]);
    }

    #[test]
    fn single_point_window_rolls_on_every_push() {
        let mut buffer = GraphPointBuffer::new(1);
        assert!(buffer.push_point(1.0).unwrap());
        assert!(buffer.push_point(2.0).unwrap());
        assert_eq!(buffer.front(), buffer.back());
        assert_eq!(buffer.back().unwrap().y, 2.0);

        let line = buffer.line();
        assert_eq!(line.len(), 2);
        assert_eq!(line[0].y, line[1].y);
    }

    #[test]
    fn set_points_empty() {
        let mut buffer = GraphPointBuffer::new(5);
        buffer.set_points(&[]);
        assert_eq!(buffer.num_points(), 0);
        assert_eq!((buffer.head(), buffer.tail()), (0, 0));
        assert_eq!(buffer.buffer_size(), 0);
    }

    #[test]
    fn set_points_single_value_renders_as_flat_line() {
        let mut buffer = GraphPointBuffer::new(5);
        buffer.set_points(&[0.4]);
        assert_eq!(buffer.num_points(), 1);

        let line = buffer.line();
        assert_eq!(line, &[Point::new(0.0, 0.4), Point::new(SINGLE_POINT_SPAN, 0.4)]);
    }

    #[test]
    fn set_points_reads_back_in_order() {
        let values = [0.5, 0.25, 1.0, 0.0, 0.75];
        let mut buffer = GraphPointBuffer::new(2);
        buffer.set_points(&values);

        let read: Vec<f32> = (0..values.len()).map(|i| buffer[i].y).collect();
        assert_eq!(read, values);
        assert_eq!(buffer.head(), values.len() - 1);
        assert_eq!(buffer.buffer_size(), 2 * values.len());
    }

    #[test]
    fn resize_mid_life_uses_new_threshold() {
        let mut buffer = GraphPointBuffer::new(4);
        buffer.push_point(1.0).unwrap();
        buffer.push_point(2.0).unwrap();

        buffer.reset_points(2);
        assert_eq!(buffer.num_points(), 2);
        assert!(!buffer.push_point(3.0).unwrap());
        assert!(buffer.push_point(4.0).unwrap());
        assert_eq!(ys(&buffer), vec![3.0, 4.0]);
    }

    #[test]
    fn set_y_rewrites_inside_window_only() {
        let mut buffer = GraphPointBuffer::new(3);
        buffer.set_y(2, 0.9).unwrap();
        assert_eq!(buffer.back().unwrap().y, 0.9);
        assert!(buffer.set_y(3, 0.1).is_err());
    }

    #[test]
    fn custom_floor_fills_placeholders() {
        let buffer = GraphPointBuffer::with_floor(3, 0.5);
        assert!(buffer.points().iter().all(|p| p.y == 0.5));
        assert_eq!(buffer.floor(), 0.5);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_past_window_panics() {
        let buffer = GraphPointBuffer::new(3);
        let _point = buffer[3];
    }

    #[test]
    fn dirty_merge() {
        assert_eq!(Dirty::Tail(2).merge(Dirty::Tail(3)), Dirty::Tail(5));
        assert_eq!(Dirty::Tail(2).merge(Dirty::All), Dirty::All);
        assert_eq!(Dirty::All.merge(Dirty::Tail(1)), Dirty::All);
    }
}
