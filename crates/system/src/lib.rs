//! Concrete data sources, one per telemetry kind.
//!
//! Each source implements [`dash_core::DataSource`]. Constructors return
//! [`DashError::Unavailable`](dash_core::DashError::Unavailable) when the
//! hardware or tool is missing, which the owning measure turns into its
//! disabled state.

pub mod clock;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod info;
pub mod memory;
pub mod music;
pub mod network;

pub use clock::TimeSource;
pub use cpu::{CpuSource, CpuTicks, LoadTracker};
pub use disk::{root_drive, DriveSource};
pub use gpu::GpuSource;
pub use info::SystemSource;
pub use memory::{format_bytes, RamSource};
pub use music::MusicSource;
pub use network::{format_rate, ConnectivityMonitor, NetSource};
