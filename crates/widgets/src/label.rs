use crate::graph::NO_DATA;
use crate::surface::Surface;
use dash_core::{DataSource, Measure, Rect, Subscription, Widget};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Displays one measure as a line of text, re-formatted only when the value changes.
pub struct LabelWidget {
    id: String,
    viewport: Rect,
    visible: bool,
    text: Rc<RefCell<Option<String>>>,
    enabled: Rc<Cell<bool>>,
    _subscriptions: [Subscription; 2],
}

impl LabelWidget {
    pub fn new<D, F>(id: impl Into<String>, measure: &Measure<D>, format: F) -> Self
    where
        D: DataSource,
        F: Fn(&D::Snapshot) -> String + 'static,
    {
        let text = Rc::new(RefCell::new(measure.value().map(&format)));
        let enabled = Rc::new(Cell::new(measure.is_enabled()));

        let on_changed = measure.on_changed({
            let text = Rc::clone(&text);
            move |value| *text.borrow_mut() = Some(format(value))
        });
        let on_update = measure.on_post_update({
            let enabled = Rc::clone(&enabled);
            move |reading| enabled.set(reading.enabled)
        });

        Self {
            id: id.into(),
            viewport: Rect::default(),
            visible: true,
            text,
            enabled,
            _subscriptions: [on_changed, on_update],
        }
    }

    /// The text the next draw will show.
    pub fn text(&self) -> String {
        if !self.enabled.get() {
            return NO_DATA.to_string();
        }
        self.text.borrow().clone().unwrap_or_default()
    }
}

impl Widget<dyn Surface> for LabelWidget {
    fn id(&self) -> &str {
        &self.id
    }

    fn draw(&mut self, surface: &mut (dyn Surface + 'static)) {
        if self.visible && !self.viewport.is_empty() {
            surface.text(&self.id, self.viewport, &self.text());
        }
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use dash_core::{Cadence, DashError, Result};
    use std::time::{Duration, Instant};

    /// Replays a script of readings, one per refresh.
    struct Script(Vec<Result<u64>>, u64);

    impl DataSource for Script {
        type Snapshot = u64;

        fn refresh(&mut self) -> Result<()> {
            let next = if self.0.is_empty() { Ok(self.1) } else { self.0.remove(0) };
            self.1 = next?;
            Ok(())
        }

        fn snapshot(&self) -> Result<u64> {
            Ok(self.1)
        }
    }

    fn label(script: Vec<Result<u64>>, formats: Rc<Cell<u32>>) -> (Measure<Script>, LabelWidget) {
        let measure = Measure::new("bytes", Script(script, 0), Cadence::Once, Instant::now());
        let mut widget = LabelWidget::new("bytes-label", &measure, move |v| {
            formats.set(formats.get() + 1);
            format!("{v} B")
        });
        widget.set_viewport(Rect::new(0.0, 0.0, 80.0, 16.0));
        (measure, widget)
    }

    #[test]
    fn formats_on_change_only() {
        let formats = Rc::new(Cell::new(0));
        let (mut measure, mut widget) = label(vec![Ok(512)], Rc::clone(&formats));
        assert_eq!(widget.text(), "");

        let now = Instant::now();
        measure.update(now);
        measure.update(now + Duration::from_secs(1));
        assert_eq!(formats.get(), 1);

        let mut surface = Recorder::default();
        widget.draw(&mut surface);
        widget.draw(&mut surface);
        assert_eq!(surface.texts, vec!["512 B".to_string(), "512 B".to_string()]);
        assert_eq!(formats.get(), 1);
    }

    #[test]
    fn mixed_widgets_draw_through_one_surface() {
        use crate::graph::{GraphSettings, GraphWidget};
        use dash_graph::Viewport;

        let formats = Rc::new(Cell::new(0));
        let (mut measure, label) = label(vec![Ok(40)], formats);
        let settings = GraphSettings {
            samples: 8,
            smooth: false,
            precision: 1,
        };
        let mut graph =
            GraphWidget::new("bytes-graph", &measure, settings, Viewport::PERCENT, |v| *v as f32);
        graph.set_viewport(Rect::new(0.0, 16.0, 80.0, 32.0));

        let mut widgets: Vec<Box<dyn Widget<dyn Surface>>> = vec![Box::new(label), Box::new(graph)];
        measure.update(Instant::now());

        let mut surface = Recorder::default();
        for widget in &mut widgets {
            widget.draw(&mut surface);
        }
        assert_eq!(surface.texts, vec!["40 B".to_string()]);
        assert_eq!(surface.lines.len(), 1);
        assert_eq!(surface.lines[0].0, "bytes-graph");
    }

    #[test]
    fn lost_source_shows_fallback() {
        let formats = Rc::new(Cell::new(0));
        let (mut measure, widget) =
            label(vec![Err(DashError::Unavailable("gone".into()))], formats);
        measure.update(Instant::now());
        assert_eq!(widget.text(), NO_DATA);
    }
}
