use dash_core::snapshot::SystemInfo;
use dash_core::{DataSource, Result};
use sysinfo::System;

/// Static machine description; meant for a `Cadence::Once` measure.
pub struct SystemSource {
    info: SystemInfo,
}

impl SystemSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let info = SystemInfo {
            os_name: System::name().unwrap_or_default(),
            os_version: System::long_os_version().unwrap_or_default(),
            kernel: System::kernel_version().unwrap_or_default(),
            host: System::host_name().unwrap_or_default(),
            cpu_brand: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_default(),
            logical_cores: sys.cpus().len(),
            total_memory: sys.total_memory(),
        };
        Self { info }
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for SystemSource {
    type Snapshot = SystemInfo;

    fn snapshot(&self) -> Result<SystemInfo> {
        Ok(self.info.clone())
    }
}
