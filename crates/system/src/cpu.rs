//! CPU load from kernel tick counters, temperatures from hardware sensors.

use dash_core::snapshot::CpuSnapshot;
use dash_core::{DashError, DataSource, Result};
use std::path::{Path, PathBuf};
use sysinfo::Components;
use tracing::debug;

/// Cumulative tick counters of one CPU (or the aggregate line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTicks {
    /// Ticks spent doing nothing, including waiting on I/O.
    pub idle: u64,
    /// All ticks.
    pub total: u64,
}

impl CpuTicks {
    /// From idle/kernel/user times where kernel time already includes idle time.
    pub fn from_times(idle: u64, kernel: u64, user: u64) -> Self {
        Self {
            idle,
            total: kernel + user,
        }
    }

    /// Parse one `cpu`/`cpuN` line of `/proc/stat`.
    ///
    /// Fields: user nice system idle iowait irq softirq steal [guest guest_nice].
    /// Guest time is already counted in user/nice and is left out of the total.
    pub fn parse_line(line: &str) -> Option<(&str, Self)> {
        let mut fields = line.split_whitespace();
        let label = fields.next().filter(|l| l.starts_with("cpu"))?;
        let values: Vec<u64> = fields
            .take(8)
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        if values.len() < 4 {
            return None;
        }

        let idle = values[3] + values.get(4).copied().unwrap_or(0);
        let total = values.iter().sum();
        Some((label, Self { idle, total }))
    }
}

/// Aggregate and per-core ticks from the text of `/proc/stat`.
pub fn parse_proc_stat(text: &str) -> Result<(CpuTicks, Vec<CpuTicks>)> {
    let mut aggregate = None;
    let mut cores = Vec::new();

    for (label, ticks) in text.lines().filter_map(CpuTicks::parse_line) {
        if label == "cpu" {
            aggregate = Some(ticks);
        } else {
            cores.push(ticks);
        }
    }

    aggregate
        .map(|a| (a, cores))
        .ok_or_else(|| DashError::Query("no aggregate cpu line in stat file".into()))
}

/// Turns successive tick readings into a load fraction.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    previous: Option<CpuTicks>,
}

impl LoadTracker {
    /// Load since the previous reading, `1 - Δidle / Δtotal`.
    ///
    /// `None` for the first reading, or when no ticks elapsed.
    pub fn load(&mut self, ticks: CpuTicks) -> Option<f32> {
        let previous = self.previous.replace(ticks)?;
        let total = ticks.total.checked_sub(previous.total)?;
        let idle = ticks.idle.saturating_sub(previous.idle);
        if total == 0 {
            return None;
        }
        Some((1.0 - idle as f64 / total as f64).clamp(0.0, 1.0) as f32)
    }
}

pub struct CpuSource {
    stat_path: PathBuf,
    aggregate: LoadTracker,
    cores: Vec<LoadTracker>,
    components: Option<Components>,
    current: CpuSnapshot,
}

impl CpuSource {
    pub fn new() -> Result<Self> {
        Self::with_stat_path("/proc/stat", true)
    }

    /// Read ticks from `path`; `sensors` enables temperature lookup.
    pub fn with_stat_path(path: impl AsRef<Path>, sensors: bool) -> Result<Self> {
        let stat_path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&stat_path).map_err(|e| {
            DashError::Unavailable(format!("cannot read '{}': {e}", stat_path.display()))
        })?;
        let (aggregate_ticks, core_ticks) = parse_proc_stat(&text)
            .map_err(|e| DashError::Unavailable(e.to_string()))?;

        let mut aggregate = LoadTracker::default();
        aggregate.load(aggregate_ticks);
        let cores = core_ticks
            .iter()
            .map(|ticks| {
                let mut tracker = LoadTracker::default();
                tracker.load(*ticks);
                tracker
            })
            .collect::<Vec<_>>();

        let components = sensors.then(Components::new_with_refreshed_list);
        debug!(cores = cores.len(), "cpu source ready");

        Ok(Self {
            stat_path,
            current: CpuSnapshot {
                per_core: vec![0.0; cores.len()],
                ..Default::default()
            },
            aggregate,
            cores,
            components,
        })
    }

    fn temperatures(&mut self) -> Option<Vec<f32>> {
        let components = self.components.as_mut()?;
        components.refresh(false);

        let temps: Vec<f32> = components
            .list()
            .iter()
            .filter(|c| {
                let label = c.label().to_ascii_lowercase();
                ["core", "cpu", "package", "tctl", "tdie"]
                    .iter()
                    .any(|k| label.contains(k))
            })
            .filter_map(|c| c.temperature())
            .filter(|t| t.is_finite())
            .collect();

        (!temps.is_empty()).then_some(temps)
    }
}

impl DataSource for CpuSource {
    type Snapshot = CpuSnapshot;

    fn refresh(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.stat_path)
            .map_err(|e| DashError::Query(format!("read '{}': {e}", self.stat_path.display())))?;
        let (aggregate, cores) = parse_proc_stat(&text)?;

        // Hot-plugged cores get a fresh tracker; they report 0 until their second reading.
        self.cores.resize_with(cores.len(), LoadTracker::default);

        let usage = self.aggregate.load(aggregate).unwrap_or(self.current.usage);
        let per_core = self
            .cores
            .iter_mut()
            .zip(&cores)
            .enumerate()
            .map(|(i, (tracker, ticks))| {
                let fallback = self.current.per_core.get(i).copied().unwrap_or(0.0);
                tracker.load(*ticks).unwrap_or(fallback)
            })
            .collect();

        self.current = CpuSnapshot {
            usage,
            per_core,
            temperatures: self.temperatures(),
        };
        Ok(())
    }

    fn snapshot(&self) -> Result<CpuSnapshot> {
        Ok(self.current.clone())
    }
}
