//! A scrolling graph fed by one measure.

use crate::surface::Surface;
use dash_core::{DataSource, Measure, Rect, Signal, Subscription, Widget};
use dash_graph::{Dirty, Graph, LineGraph, SmoothGraph, Viewport};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

pub const NO_DATA: &str = "No Data";

/// History length and smoothing of a graph widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSettings {
    pub samples: usize,
    pub smooth: bool,
    pub precision: usize,
}

impl GraphSettings {
    fn build(&self, viewport: Viewport) -> Box<dyn Graph> {
        if self.smooth {
            Box::new(SmoothGraph::new(self.samples, self.precision, viewport))
        } else {
            Box::new(LineGraph::new(self.samples, viewport))
        }
    }
}

struct GraphState {
    graph: Box<dyn Graph>,
    settings: GraphSettings,
    pending: Option<Dirty>,
    enabled: bool,
}

impl GraphState {
    fn mark(&mut self, dirty: Dirty) {
        let merged = self.pending.map_or(dirty, |pending| pending.merge(dirty));
        let visible = self.graph.buffer().num_points();
        self.pending = Some(match merged {
            Dirty::Tail(n) if n >= visible => Dirty::All,
            other => other,
        });
    }

    fn apply(&mut self, settings: GraphSettings) {
        if settings == self.settings {
            return;
        }
        let dirty = if settings.smooth == self.settings.smooth
            && settings.precision == self.settings.precision
        {
            debug!(samples = settings.samples, "resizing graph");
            self.graph.reset(settings.samples)
        } else {
            debug!(?settings, "rebuilding graph");
            self.graph = settings.build(self.graph.viewport());
            Dirty::All
        };
        self.settings = settings;
        self.pending = Some(dirty);
    }
}

pub struct GraphWidget {
    id: String,
    viewport: Rect,
    visible: bool,
    state: Rc<RefCell<GraphState>>,
    subscriptions: Vec<Subscription>,
}

impl GraphWidget {
    /// Push `select(snapshot)` into the graph every time `measure` refreshes.
    pub fn new<D, F>(
        id: impl Into<String>,
        measure: &Measure<D>,
        settings: GraphSettings,
        range: Viewport,
        select: F,
    ) -> Self
    where
        D: DataSource,
        F: Fn(&D::Snapshot) -> f32 + 'static,
    {
        let id = id.into();
        let state = Rc::new(RefCell::new(GraphState {
            graph: settings.build(range),
            settings,
            pending: Some(Dirty::All),
            enabled: measure.is_enabled(),
        }));

        let subscription = measure.on_post_update({
            let state = Rc::clone(&state);
            let id = id.clone();
            move |reading| {
                let mut state = state.borrow_mut();
                state.enabled = reading.enabled;
                if !reading.refreshed {
                    return;
                }
                let Some(value) = reading.value.as_ref() else {
                    return;
                };
                match state.graph.push_sample(select(value)) {
                    Ok(dirty) => state.mark(dirty),
                    Err(e) => warn!(widget = %id, "dropping sample: {e}"),
                }
            }
        });

        Self {
            id,
            viewport: Rect::default(),
            visible: true,
            state,
            subscriptions: vec![subscription],
        }
    }

    /// Rebuild the graph whenever `signal` fires with new settings.
    pub fn follow<T: 'static>(
        &mut self,
        signal: &Signal<T>,
        settings: impl Fn(&T) -> GraphSettings + 'static,
    ) {
        let state = Rc::clone(&self.state);
        self.subscriptions
            .push(signal.subscribe(move |value| state.borrow_mut().apply(settings(value))));
    }

    pub fn apply(&mut self, settings: GraphSettings) {
        self.state.borrow_mut().apply(settings);
    }

    pub fn settings(&self) -> GraphSettings {
        self.state.borrow().settings
    }

    /// Read access to the graph, e.g. for inspection in tests or overlays.
    pub fn graph(&self) -> Ref<'_, dyn Graph> {
        Ref::map(self.state.borrow(), |state| state.graph.as_ref())
    }

    pub fn has_data(&self) -> bool {
        self.state.borrow().enabled
    }
}

impl Widget<dyn Surface> for GraphWidget {
    fn id(&self) -> &str {
        &self.id
    }

    fn draw(&mut self, surface: &mut (dyn Surface + 'static)) {
        if !self.visible || self.viewport.is_empty() {
            return;
        }

        let mut state = self.state.borrow_mut();
        if !state.enabled {
            surface.text(&self.id, self.viewport, NO_DATA);
            return;
        }

        let upload = state.pending.take();
        let buffer = state.graph.buffer();
        surface.line(
            &self.id,
            self.viewport,
            buffer.line(),
            buffer.scroll_offset(),
            upload,
        );
    }

    fn set_viewport(&mut self, viewport: Rect) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.state.borrow_mut().pending = Some(Dirty::All);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
