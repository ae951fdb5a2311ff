//! Scrolling line graphs: rolling point storage and spline smoothing.

pub mod buffer;
pub mod graph;
pub mod smooth;
pub mod spline;

pub use buffer::{Dirty, GraphPointBuffer, Point, DEFAULT_Y};
pub use graph::{Graph, LineGraph, Viewport};
pub use smooth::{Phase, SmoothGraph};
