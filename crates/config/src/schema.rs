use serde::{Deserialize, Serialize};

/// Root configuration structure parsed from `dash.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashConfig {
    pub global: GlobalConfig,
    /// Per-measure update intervals.
    pub measures: MeasureConfig,
    /// Graph history and smoothing.
    pub graph: GraphConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Frames per second of the update/draw loop.
    pub frame_rate: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self { frame_rate: 30 }
    }
}

/// Update intervals in milliseconds; `0` queries once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    pub cpu: u64,
    pub gpu: u64,
    pub ram: u64,
    pub net: u64,
    pub drive: u64,
    pub time: u64,
    pub music: u64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            cpu: 1_000,
            gpu: 1_000,
            ram: 2_000,
            net: 1_000,
            drive: 30_000,
            time: 250,
            music: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Raw samples visible in each graph.
    pub samples: usize,
    /// Draw Catmull-Rom curves instead of straight segments.
    pub smooth: bool,
    /// Interpolated points per raw sample when smoothing.
    pub precision: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            samples: 60,
            smooth: true,
            precision: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// `host:port` the connectivity probe connects to.
    pub probe_host: String,
    pub probe_timeout_ms: u64,
    pub probe_interval_ms: u64,
    /// Rate (bytes/s) mapped to the top of the network graph.
    pub max_rate: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_host: "1.1.1.1:53".to_string(),
            probe_timeout_ms: 2_000,
            probe_interval_ms: 10_000,
            max_rate: 12_500_000, // 100 Mbit/s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: DashConfig = toml::from_str(
            r#"
            [graph]
            samples = 120

            [measures]
            cpu = 500
            "#,
        )
        .unwrap();

        assert_eq!(cfg.graph.samples, 120);
        assert_eq!(cfg.graph.precision, GraphConfig::default().precision);
        assert_eq!(cfg.measures.cpu, 500);
        assert_eq!(cfg.measures.ram, MeasureConfig::default().ram);
        assert_eq!(cfg.network, NetworkConfig::default());
    }

    #[test]
    fn empty_file_is_default() {
        let cfg: DashConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, DashConfig::default());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string(&DashConfig::default()).unwrap();
        let back: DashConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, DashConfig::default());
    }
}
