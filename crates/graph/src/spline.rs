//! Cubic Hermite and uniform Catmull-Rom evaluation.

/// Cubic Hermite curve from `p1` (tangent `m1`) to `p2` (tangent `m2`) at `t ∈ [0, 1]`.
#[must_use]
pub fn hermite(p1: f32, p2: f32, m1: f32, m2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p1 + h10 * m1 + h01 * p2 + h11 * m2
}

/// Uniform Catmull-Rom segment between `p1` and `p2`; `p0` and `p3` shape the tangents.
#[must_use]
pub fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    hermite(p1, p2, (p2 - p0) * 0.5, (p3 - p1) * 0.5, t)
}

/// Four control points around one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: f32,
    pub p1: f32,
    pub p2: f32,
    pub p3: f32,
}

impl Segment {
    /// Segment from `window[i]` to `window[i + 1]`, duplicating the endpoints
    /// where a neighbour is missing.
    ///
    /// Returns `None` unless both `window[i]` and `window[i + 1]` exist.
    pub fn from_window(window: &[f32], i: usize) -> Option<Self> {
        let p1 = *window.get(i)?;
        let p2 = *window.get(i + 1)?;
        let p0 = i.checked_sub(1).and_then(|j| window.get(j)).copied().unwrap_or(p1);
        let p3 = window.get(i + 2).copied().unwrap_or(p2);
        Some(Self { p0, p1, p2, p3 })
    }

    pub fn at(&self, t: f32) -> f32 {
        catmull_rom(self.p0, self.p1, self.p2, self.p3, t)
    }

    /// `count` evenly spaced samples covering `(0, 1]`, so the last one lands on `p2`.
    pub fn sample(&self, count: usize) -> impl Iterator<Item = f32> + '_ {
        (1..=count).map(move |k| self.at(k as f32 / count as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn segment(p0: f32, p1: f32, p2: f32, p3: f32) -> Segment {
        Segment { p0, p1, p2, p3 }
    }

    #[test]
    fn hermite_hits_endpoints() {
        assert!((hermite(0.2, 0.8, 3.0, -1.0, 0.0) - 0.2).abs() < EPS);
        assert!((hermite(0.2, 0.8, 3.0, -1.0, 1.0) - 0.8).abs() < EPS);
    }

    #[test]
    fn collinear_points_interpolate_linearly() {
        for k in 0..=10 {
            let t = k as f32 / 10.0;
            assert!((catmull_rom(0.0, 1.0, 2.0, 3.0, t) - (1.0 + t)).abs() < EPS);
        }
    }

    #[test]
    fn catmull_rom_overshoots_near_a_spike() {
        // Between a flat run and a spike the curve dips below the flat level.
        let dip = catmull_rom(1.0, 0.0, 0.0, 1.0, 0.5);
        assert!(dip < 0.0);
    }

    #[test]
    fn window_edges_duplicate_endpoints() {
        let window = [0.1, 0.5, 0.9];
        let first = Segment::from_window(&window, 0).unwrap();
        assert_eq!(first, segment(0.1, 0.1, 0.5, 0.9));

        let last = Segment::from_window(&window, 1).unwrap();
        assert_eq!(last, segment(0.1, 0.5, 0.9, 0.9));

        assert!(Segment::from_window(&window, 2).is_none());
        assert!(Segment::from_window(&[0.3], 0).is_none());
    }

    #[test]
    fn sample_ends_on_segment_target() {
        let curve = segment(0.0, 0.2, 0.6, 0.3);
        let points: Vec<f32> = curve.sample(4).collect();
        assert_eq!(points.len(), 4);
        assert!((points[3] - 0.6).abs() < EPS);
    }
}
