//! Reactive dashboard widgets: they subscribe to measures and draw into a [`Surface`].

pub mod graph;
pub mod label;
pub mod surface;

#[cfg(test)]
mod testing;

pub use graph::{GraphSettings, GraphWidget, NO_DATA};
pub use label::LabelWidget;
pub use surface::{Surface, TraceSurface};
