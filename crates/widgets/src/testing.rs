use crate::surface::Surface;
use dash_core::Rect;
use dash_graph::{Dirty, Point};

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: Vec<(String, usize, Option<Dirty>)>,
    pub texts: Vec<String>,
}

impl Recorder {
    pub fn uploads(&self) -> Vec<Option<Dirty>> {
        self.lines.iter().map(|(_, _, upload)| *upload).collect()
    }
}

impl Surface for Recorder {
    fn line(&mut self, id: &str, _: Rect, points: &[Point], _: f32, upload: Option<Dirty>) {
        self.lines.push((id.to_string(), points.len(), upload));
    }

    fn text(&mut self, _: &str, _: Rect, text: &str) {
        self.texts.push(text.to_string());
    }
}
