//! GPU load, from NVML on NVIDIA hardware or the amdgpu sysfs interface.

use dash_core::snapshot::GpuSnapshot;
use dash_core::{DashError, DataSource, Result};
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DRM_ROOT: &str = "/sys/class/drm";

enum Backend {
    Nvml { nvml: Nvml, index: u32 },
    Sysfs {
        device: PathBuf,
        hwmon: Option<PathBuf>,
    },
}

pub struct GpuSource {
    backend: Backend,
    current: GpuSnapshot,
}

impl GpuSource {
    /// First NVIDIA GPU through NVML, falling back to the first amdgpu card.
    pub fn new() -> Result<Self> {
        let nvml_err = match Self::with_nvml(0) {
            Ok(source) => return Ok(source),
            Err(e) => e,
        };
        debug!("nvml backend unavailable: {nvml_err}");

        Self::first_sysfs_card().map_err(|sysfs_err| {
            DashError::Unavailable(format!("no supported GPU ({nvml_err}; {sysfs_err})"))
        })
    }

    /// NVIDIA GPU number `index`.
    pub fn with_nvml(index: u32) -> Result<Self> {
        let nvml = Nvml::init()
            .map_err(|e| DashError::Unavailable(format!("NVML init failed: {e}")))?;
        let count = nvml
            .device_count()
            .map_err(|e| DashError::Unavailable(format!("NVML device count: {e}")))?;
        if index >= count {
            return Err(DashError::Unavailable(format!(
                "NVML reports {count} GPU(s), no index {index}"
            )));
        }

        let name = nvml
            .device_by_index(index)
            .and_then(|device| device.name())
            .unwrap_or_else(|_| format!("GPU {index}"));
        info!(gpu = %name, index, "gpu source ready (nvml)");

        Ok(Self {
            backend: Backend::Nvml { nvml, index },
            current: GpuSnapshot::default(),
        })
    }

    fn first_sysfs_card() -> Result<Self> {
        let cards = fs::read_dir(DRM_ROOT)
            .map_err(|e| DashError::Unavailable(format!("cannot list {DRM_ROOT}: {e}")))?;

        let mut devices: Vec<PathBuf> = cards
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with("card") && !name.contains('-')
            })
            .map(|entry| entry.path().join("device"))
            .filter(|device| device.join("gpu_busy_percent").exists())
            .collect();
        devices.sort();

        let device = devices
            .into_iter()
            .next()
            .ok_or_else(|| DashError::Unavailable("no card reporting gpu_busy_percent".into()))?;
        Self::with_device(device)
    }

    /// amdgpu card at an explicit `…/device` directory.
    pub fn with_device(device: impl AsRef<Path>) -> Result<Self> {
        let device = device.as_ref().to_path_buf();
        if !device.join("gpu_busy_percent").exists() {
            return Err(DashError::Unavailable(format!(
                "'{}' does not report GPU load",
                device.display()
            )));
        }

        let hwmon = fs::read_dir(device.join("hwmon"))
            .ok()
            .and_then(|mut dirs| dirs.find_map(|d| d.ok()))
            .map(|d| d.path());

        info!(device = %device.display(), "gpu source ready (sysfs)");
        Ok(Self {
            backend: Backend::Sysfs { device, hwmon },
            current: GpuSnapshot::default(),
        })
    }
}

fn query_nvml(nvml: &Nvml, index: u32) -> Result<GpuSnapshot> {
    let device = nvml
        .device_by_index(index)
        .map_err(|e| DashError::Query(format!("NVML device {index}: {e}")))?;
    let utilization = device
        .utilization_rates()
        .map_err(|e| DashError::Query(format!("NVML utilization: {e}")))?;
    let (vram_used, vram_total) = device
        .memory_info()
        .map(|mem| (mem.used, mem.total))
        .unwrap_or((0, 0));
    let temperature = device
        .temperature(TemperatureSensor::Gpu)
        .ok()
        .map(|celsius| celsius as f32);

    Ok(GpuSnapshot {
        usage: percent(u64::from(utilization.gpu)),
        vram_used,
        vram_total,
        temperature,
    })
}

fn query_sysfs(device: &Path, hwmon: Option<&Path>) -> Result<GpuSnapshot> {
    let busy = read_u64(&device.join("gpu_busy_percent"))?;
    let vram_used = read_u64(&device.join("mem_info_vram_used")).unwrap_or(0);
    let vram_total = read_u64(&device.join("mem_info_vram_total")).unwrap_or(0);
    let temperature = hwmon
        .and_then(|hwmon| read_u64(&hwmon.join("temp1_input")).ok())
        .map(|milli| milli as f32 / 1000.0);

    Ok(GpuSnapshot {
        usage: percent(busy),
        vram_used,
        vram_total,
        temperature,
    })
}

fn percent(value: u64) -> f32 {
    value.min(100) as f32 / 100.0
}

fn read_u64(path: &Path) -> Result<u64> {
    let raw = fs::read_to_string(path)
        .map_err(|e| DashError::Query(format!("read '{}': {e}", path.display())))?;
    raw.trim()
        .parse()
        .map_err(|e| DashError::Query(format!("parse '{}': {e}", path.display())))
}

impl DataSource for GpuSource {
    type Snapshot = GpuSnapshot;

    fn refresh(&mut self) -> Result<()> {
        self.current = match &self.backend {
            Backend::Nvml { nvml, index } => query_nvml(nvml, *index)?,
            Backend::Sysfs { device, hwmon } => query_sysfs(device, hwmon.as_deref())?,
        };
        Ok(())
    }

    fn snapshot(&self) -> Result<GpuSnapshot> {
        Ok(self.current.clone())
    }
}
