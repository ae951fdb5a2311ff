use dash_core::snapshot::RamSnapshot;
use dash_core::{DataSource, Result};
use sysinfo::System;

/// Physical memory and swap usage.
pub struct RamSource {
    sys: System,
}

impl RamSource {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for RamSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for RamSource {
    type Snapshot = RamSnapshot;

    fn refresh(&mut self) -> Result<()> {
        self.sys.refresh_memory();
        Ok(())
    }

    fn snapshot(&self) -> Result<RamSnapshot> {
        Ok(RamSnapshot {
            used: self.sys.used_memory(),
            total: self.sys.total_memory(),
            swap_used: self.sys.used_swap(),
            swap_total: self.sys.total_swap(),
        })
    }
}

/// Format a byte count with binary units (e.g. `"7.3 GiB"`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(&str, u64); 4] = [
        ("TiB", 1 << 40),
        ("GiB", 1 << 30),
        ("MiB", 1 << 20),
        ("KiB", 1 << 10),
    ];

    UNITS
        .iter()
        .find(|(_, size)| bytes >= *size)
        .map(|(unit, size)| format!("{:.1} {unit}", bytes as f64 / *size as f64))
        .unwrap_or_else(|| format!("{bytes} B"))
}
