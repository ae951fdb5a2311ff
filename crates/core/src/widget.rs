/// Screen-space placement of a widget, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Capability interface shared by every draw target on the dashboard.
///
/// Widgets are reactive: they subscribe to measures at construction, keep
/// whatever derived state they need, and emit it to `S` (the renderer) on
/// [`draw`](Widget::draw). Drawing itself is the renderer's business.
pub trait Widget<S: ?Sized> {
    /// Unique string identifier, e.g. `"cpu-graph"`.
    fn id(&self) -> &str;

    fn draw(&mut self, surface: &mut S);

    fn set_viewport(&mut self, viewport: Rect);

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}
