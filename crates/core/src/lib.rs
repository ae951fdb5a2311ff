pub mod error;
pub mod event;
pub mod measure;
pub mod scheduler;
pub mod snapshot;
pub mod timer;
pub mod widget;

pub use error::{DashError, Result};
pub use event::{Signal, Subscription};
pub use measure::{DataSource, Measure, Reading, Shared, Update};
pub use scheduler::Scheduler;
pub use timer::{Cadence, Timer};
pub use widget::{Rect, Widget};
