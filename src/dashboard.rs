use anyhow::{Context, Result};
use dash_config::{
    default_path, load as load_config, ConfigWatcher, DashConfig, GraphConfig, MAX_FRAME_RATE,
};
use dash_core::snapshot::{
    CpuSnapshot, DriveSnapshot, GpuSnapshot, MusicSnapshot, NetSnapshot, RamSnapshot,
    SystemInfo, TimeSnapshot,
};
use dash_core::{Cadence, DataSource, Measure, Rect, Scheduler, Shared, Signal, Widget};
use dash_graph::Viewport;
use dash_system::{
    format_bytes, format_rate, root_drive, ConnectivityMonitor, CpuSource, DriveSource,
    GpuSource, MusicSource, NetSource, RamSource, SystemSource, TimeSource,
};
use dash_widgets::{GraphSettings, GraphWidget, LabelWidget, Surface, TraceSurface};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

const COLUMN_WIDTH: f32 = 320.0;
const GRAPH_HEIGHT: f32 = 48.0;
const LABEL_HEIGHT: f32 = 18.0;

type BoxedWidget = Box<dyn Widget<dyn Surface>>;

/// Measures, the widgets observing them, and the config broadcast.
struct Dashboard {
    scheduler: Scheduler,
    widgets: Vec<BoxedWidget>,
    config_changed: Signal<DashConfig>,
}

impl Dashboard {
    fn new(config: &DashConfig, now: Instant) -> Self {
        let every = Cadence::from_millis;
        let intervals = &config.measures;

        let cpu = Measure::from_init("cpu", CpuSource::new(), every(intervals.cpu), now).shared();
        let gpu = Measure::from_init("gpu", GpuSource::new(), every(intervals.gpu), now).shared();
        let net_source = NetSource::new(connectivity(config));
        let net = Measure::new("net", net_source, every(intervals.net), now).shared();
        let system = Measure::new("system", SystemSource::new(), Cadence::Once, now).shared();

        // Slow measures would stay blank for a whole interval otherwise.
        let ram = Measure::new("ram", RamSource::new(), every(intervals.ram), now)
            .primed()
            .shared();
        let drive = Measure::new("drive", DriveSource::new(), every(intervals.drive), now)
            .primed()
            .shared();
        let time = Measure::new("time", TimeSource::new(), every(intervals.time), now)
            .primed()
            .shared();
        let music = Measure::from_init("music", MusicSource::new(), every(intervals.music), now)
            .primed()
            .shared();

        let mut scheduler = Scheduler::new();
        scheduler.add(cpu.clone());
        scheduler.add(gpu.clone());
        scheduler.add(ram.clone());
        scheduler.add(net.clone());
        scheduler.add(drive.clone());
        scheduler.add(time.clone());
        scheduler.add(music.clone());
        scheduler.add(system.clone());

        let config_changed = Signal::new();
        let rate = Viewport::new(0.0, config.network.max_rate as f32);
        let signal = &config_changed;
        let graph = move |id, range| GraphSlot { id, range, config, signal };

        let mut widgets: Vec<BoxedWidget> = vec![
            Box::new(LabelWidget::new("time", &time.borrow(), |t: &TimeSnapshot| {
                t.now.format("%a %d %b  %H:%M:%S").to_string()
            })),
            graph("cpu-graph", Viewport::UNIT).build(&cpu, |s: &CpuSnapshot| s.usage),
            Box::new(LabelWidget::new("cpu", &cpu.borrow(), cpu_label)),
            graph("gpu-graph", Viewport::UNIT).build(&gpu, |s: &GpuSnapshot| s.usage),
            Box::new(LabelWidget::new("gpu", &gpu.borrow(), gpu_label)),
            graph("ram-graph", Viewport::UNIT).build(&ram, RamSnapshot::fraction),
            Box::new(LabelWidget::new("ram", &ram.borrow(), ram_label)),
            graph("net-down-graph", rate).build(&net, |s: &NetSnapshot| s.down_rate as f32),
            graph("net-up-graph", rate).build(&net, |s: &NetSnapshot| s.up_rate as f32),
            Box::new(LabelWidget::new("net", &net.borrow(), net_label)),
            Box::new(LabelWidget::new("drive", &drive.borrow(), drive_label)),
            Box::new(LabelWidget::new("music", &music.borrow(), |m: &MusicSnapshot| {
                m.display_title().unwrap_or_default()
            })),
            Box::new(LabelWidget::new("system", &system.borrow(), |s: &SystemInfo| {
                format!("{} {} · {}", s.os_name, s.os_version, s.cpu_brand)
            })),
        ];
        layout(&mut widgets);

        let disabled = scheduler.disabled();
        if !disabled.is_empty() {
            warn!(?disabled, "some measures have no data source on this machine");
        }

        Self {
            scheduler,
            widgets,
            config_changed,
        }
    }

    fn frame(&mut self, now: Instant, surface: &mut TraceSurface) {
        self.scheduler.tick(now);
        for widget in &mut self.widgets {
            widget.draw(surface);
        }
        surface.end_frame();
    }
}

/// Everything a graph widget needs besides its measure.
struct GraphSlot<'a> {
    id: &'static str,
    range: Viewport,
    config: &'a DashConfig,
    signal: &'a Signal<DashConfig>,
}

impl GraphSlot<'_> {
    fn build<D, F>(self, measure: &Shared<D>, select: F) -> BoxedWidget
    where
        D: DataSource + 'static,
        F: Fn(&D::Snapshot) -> f32 + 'static,
    {
        let settings = graph_settings(&self.config.graph);
        let mut widget = GraphWidget::new(self.id, &measure.borrow(), settings, self.range, select);
        widget.follow(self.signal, |config: &DashConfig| graph_settings(&config.graph));
        Box::new(widget)
    }
}

fn graph_settings(graph: &GraphConfig) -> GraphSettings {
    GraphSettings {
        samples: graph.samples,
        smooth: graph.smooth,
        precision: graph.precision,
    }
}

fn connectivity(config: &DashConfig) -> Option<ConnectivityMonitor> {
    let network = &config.network;
    ConnectivityMonitor::tcp(
        &network.probe_host,
        Duration::from_millis(network.probe_timeout_ms),
        Duration::from_millis(network.probe_interval_ms),
    )
    .map_err(|e| warn!("connectivity probe disabled: {e}"))
    .ok()
}

/// Stack widgets in a single column.
fn layout(widgets: &mut [BoxedWidget]) {
    let mut y = 0.0;
    for widget in widgets {
        let height = if widget.id().ends_with("-graph") {
            GRAPH_HEIGHT
        } else {
            LABEL_HEIGHT
        };
        widget.set_viewport(Rect::new(0.0, y, COLUMN_WIDTH, height));
        y += height;
    }
}

fn cpu_label(cpu: &CpuSnapshot) -> String {
    match cpu.max_temperature() {
        Some(temp) => format!("CPU {:.0}%  {temp:.0}°C", cpu.usage * 100.0),
        None => format!("CPU {:.0}%", cpu.usage * 100.0),
    }
}

fn gpu_label(gpu: &GpuSnapshot) -> String {
    let mut label = format!(
        "GPU {:.0}%  {} / {}",
        gpu.usage * 100.0,
        format_bytes(gpu.vram_used),
        format_bytes(gpu.vram_total)
    );
    if let Some(temp) = gpu.temperature {
        label.push_str(&format!("  {temp:.0}°C"));
    }
    label
}

fn ram_label(ram: &RamSnapshot) -> String {
    let label = format!("RAM {} / {}", format_bytes(ram.used), format_bytes(ram.total));
    if ram.swap_total == 0 {
        return label;
    }
    format!("{label}  swap {:.0}%", ram.swap_fraction() * 100.0)
}

fn net_label(net: &NetSnapshot) -> String {
    let link = if net.connected { "" } else { "  offline" };
    format!("↓{}  ↑{}{link}", format_rate(net.down_rate), format_rate(net.up_rate))
}

fn drive_label(drives: &DriveSnapshot) -> String {
    root_drive(drives).map_or_else(String::new, |root| {
        format!(
            "{} {} / {} ({:.0}%)",
            root.mount_point,
            format_bytes(root.used()),
            format_bytes(root.total),
            root.fraction() * 100.0
        )
    })
}

fn frames(frame_rate: u32) -> tokio::time::Interval {
    let period = Duration::from_secs(1) / frame_rate.clamp(1, MAX_FRAME_RATE);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn load_or_default(path: &Path) -> DashConfig {
    load_config(path).unwrap_or_else(|e| {
        error!("{e}; falling back to defaults");
        DashConfig::default()
    })
}

/// Drive the dashboard until Ctrl-C.
pub async fn run() -> Result<()> {
    let path = default_path();
    let mut config = load_or_default(&path);

    let mut dashboard = Dashboard::new(&config, Instant::now());
    let mut surface = TraceSurface::new();
    let mut ticker = frames(config.global.frame_rate);

    let (watcher, mut reloads) = ConfigWatcher::spawn(&path);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => dashboard.frame(Instant::now(), &mut surface),
            Some(()) = reloads.recv() => match load_config(watcher.path()) {
                Ok(next) => {
                    info!("config reloaded");
                    if next.global.frame_rate != config.global.frame_rate {
                        ticker = frames(next.global.frame_rate);
                    }
                    if next.measures != config.measures || next.network != config.network {
                        info!("measure and network settings take effect after restart");
                    }
                    dashboard.config_changed.emit(&next);
                    config = next;
                }
                Err(e) => warn!("keeping previous config: {e}"),
            },
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    info!(frames = surface.frames(), "hwdash stopped");
    Ok(())
}
