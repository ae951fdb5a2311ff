//! Immutable telemetry values handed from data sources to measures.
//!
//! Every snapshot compares by value; a measure only announces a change when
//! the new snapshot differs from the cached one.

use chrono::{DateTime, Local};

/// CPU load at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CpuSnapshot {
    /// Aggregate load across all cores, in `[0, 1]`.
    pub usage: f32,
    /// Per-core load, in `[0, 1]`.
    pub per_core: Vec<f32>,
    /// Core temperatures in °C; `None` when no sensor is readable.
    pub temperatures: Option<Vec<f32>>,
}

impl CpuSnapshot {
    /// Hottest reported core, if any sensor is available.
    #[must_use]
    pub fn max_temperature(&self) -> Option<f32> {
        self.temperatures
            .as_ref()?
            .iter()
            .copied()
            .reduce(f32::max)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpuSnapshot {
    /// Busy fraction in `[0, 1]`.
    pub usage: f32,
    pub vram_used: u64,
    pub vram_total: u64,
    pub temperature: Option<f32>,
}

impl GpuSnapshot {
    #[must_use]
    pub fn vram_fraction(&self) -> f32 {
        fraction(self.vram_used, self.vram_total)
    }
}

/// Physical memory and swap, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RamSnapshot {
    pub used: u64,
    pub total: u64,
    pub swap_used: u64,
    pub swap_total: u64,
}

impl RamSnapshot {
    /// RAM usage as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        fraction(self.used, self.total)
    }

    #[must_use]
    pub fn swap_fraction(&self) -> f32 {
        fraction(self.swap_used, self.swap_total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetSnapshot {
    /// Receive rate in bytes/second.
    pub down_rate: u64,
    /// Transmit rate in bytes/second.
    pub up_rate: u64,
    /// Bytes received since the interfaces came up.
    pub total_down: u64,
    pub total_up: u64,
    /// Result of the most recent connectivity probe.
    pub connected: bool,
}

/// One mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfo {
    pub name: String,
    pub mount_point: String,
    pub total: u64,
    pub available: u64,
}

impl DriveInfo {
    #[must_use]
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        fraction(self.used(), self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriveSnapshot {
    pub drives: Vec<DriveInfo>,
}

/// Local wall-clock time, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSnapshot {
    pub now: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MusicSnapshot {
    pub status: PlaybackStatus,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
}

impl MusicSnapshot {
    /// `"artist - title"`, or just the title; `None` when nothing is loaded.
    #[must_use]
    pub fn display_title(&self) -> Option<String> {
        let title = self.title.as_deref()?;
        match self.artist.as_deref() {
            Some(artist) if !artist.is_empty() => Some(format!("{artist} - {title}")),
            _ => Some(title.to_string()),
        }
    }
}

/// Static facts about the machine, queried once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemInfo {
    pub os_name: String,
    pub os_version: String,
    pub kernel: String,
    pub host: String,
    pub cpu_brand: String,
    pub logical_cores: usize,
    pub total_memory: u64,
}

fn fraction(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    used as f32 / total as f32
}
