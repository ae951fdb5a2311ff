//! Network throughput plus a background connectivity probe.
//!
//! The probe can block for its whole timeout, so it runs on its own thread
//! and only publishes a status flag. A `Condvar` lets shutdown wake the
//! thread out of its wait immediately.

use dash_core::snapshot::NetSnapshot;
use dash_core::{DataSource, Result};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use sysinfo::Networks;
use tracing::{debug, info, warn};

struct ProbeState {
    running: Mutex<bool>,
    wake: Condvar,
    connected: AtomicBool,
    changed: AtomicBool,
}

/// Owns the connectivity thread; dropping it stops and joins the thread.
pub struct ConnectivityMonitor {
    state: Arc<ProbeState>,
    handle: Option<JoinHandle<()>>,
}

impl ConnectivityMonitor {
    /// Run `probe` every `interval` on a dedicated thread.
    pub fn spawn<P>(mut probe: P, interval: Duration) -> Result<Self>
    where
        P: FnMut() -> bool + Send + 'static,
    {
        let state = Arc::new(ProbeState {
            running: Mutex::new(true),
            wake: Condvar::new(),
            connected: AtomicBool::new(false),
            changed: AtomicBool::new(false),
        });

        let thread_state = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("net-probe".into())
            .spawn(move || loop {
                let up = probe();
                if thread_state.connected.swap(up, Ordering::AcqRel) != up {
                    thread_state.changed.store(true, Ordering::Release);
                    debug!(connected = up, "connectivity changed");
                }

                let running = thread_state
                    .running
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let (running, _) = thread_state
                    .wake
                    .wait_timeout_while(running, interval, |running| *running)
                    .unwrap_or_else(PoisonError::into_inner);
                if !*running {
                    break;
                }
            })?;

        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    /// Probe by opening a TCP connection to `target` (`host:port`).
    pub fn tcp(target: &str, timeout: Duration, interval: Duration) -> Result<Self> {
        let target = target.to_string();
        info!(%target, "starting connectivity probe");
        Self::spawn(move || probe_tcp(&target, timeout), interval)
    }

    /// Result of the most recent probe.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    /// `true` once after every status flip.
    pub fn take_changed(&self) -> bool {
        self.state.changed.swap(false, Ordering::AcqRel)
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        *self
            .state
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = false;
        self.state.wake.notify_all();
        if handle.join().is_err() {
            warn!("connectivity thread panicked");
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn probe_tcp(target: &str, timeout: Duration) -> bool {
    let addrs: Vec<SocketAddr> = match target.to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            debug!(%target, "cannot resolve probe target: {e}");
            return false;
        }
    };
    addrs
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}

/// Throughput summed over all interfaces.
pub struct NetSource {
    networks: Networks,
    last_refresh: Instant,
    monitor: Option<ConnectivityMonitor>,
    current: NetSnapshot,
}

impl NetSource {
    /// `monitor` is optional; without one the link is reported as connected.
    pub fn new(monitor: Option<ConnectivityMonitor>) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            last_refresh: Instant::now(),
            monitor,
            current: NetSnapshot::default(),
        }
    }
}

impl DataSource for NetSource {
    type Snapshot = NetSnapshot;

    fn refresh(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refresh);
        self.last_refresh = now;
        self.networks.refresh(false); // false = keep existing interfaces list

        // `received()` / `transmitted()` are deltas since the last refresh.
        let (rx, tx, total_rx, total_tx) = self.networks.iter().fold(
            (0u64, 0u64, 0u64, 0u64),
            |(rx, tx, trx, ttx), (_, data)| {
                (
                    rx + data.received(),
                    tx + data.transmitted(),
                    trx + data.total_received(),
                    ttx + data.total_transmitted(),
                )
            },
        );

        let connected = self.monitor.as_ref().map_or(true, |m| {
            if m.take_changed() {
                info!(connected = m.is_connected(), "network status changed");
            }
            m.is_connected()
        });

        self.current = NetSnapshot {
            down_rate: per_second(rx, elapsed),
            up_rate: per_second(tx, elapsed),
            total_down: total_rx,
            total_up: total_tx,
            connected,
        };
        Ok(())
    }

    fn snapshot(&self) -> Result<NetSnapshot> {
        Ok(self.current)
    }
}

fn per_second(bytes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= f64::EPSILON {
        return 0;
    }
    (bytes as f64 / secs) as u64
}

/// Format a bytes-per-second rate into a compact string (`"1.2M"`, `"340K"`).
pub fn format_rate(bps: u64) -> String {
    const MB: u64 = 1_000_000;
    const KB: u64 = 1_000;

    if bps >= MB {
        format!("{:.1}M", bps as f64 / MB as f64)
    } else if bps >= KB {
        format!("{:.0}K", bps as f64 / KB as f64)
    } else {
        format!("{bps}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn monitor_publishes_probe_result() {
        let monitor = ConnectivityMonitor::spawn(|| true, Duration::from_secs(60)).unwrap();
        assert!(wait_for(|| monitor.is_connected()));
        assert!(monitor.take_changed());
        assert!(!monitor.take_changed());
    }

    #[test]
    fn shutdown_interrupts_long_wait() {
        let mut monitor = ConnectivityMonitor::spawn(|| false, Duration::from_secs(3600)).unwrap();
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        monitor.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!monitor.is_connected());
    }

    #[test]
    fn flapping_link_sets_changed_flag() {
        let mut up = false;
        let monitor = ConnectivityMonitor::spawn(
            move || {
                up = !up;
                up
            },
            Duration::from_millis(1),
        )
        .unwrap();
        assert!(wait_for(|| monitor.take_changed()));
        drop(monitor);
    }

    #[test]
    fn unresolvable_target_is_offline() {
        assert!(!probe_tcp("not a host", Duration::from_millis(10)));
    }

    #[test]
    fn rates_scale_by_elapsed_time() {
        assert_eq!(per_second(3000, Duration::from_millis(1500)), 2000);
        assert_eq!(per_second(3000, Duration::ZERO), 0);
    }

    #[test]
    fn format_rate_units() {
        assert_eq!(format_rate(2_500_000), "2.5M");
        assert_eq!(format_rate(340_000), "340K");
        assert_eq!(format_rate(999), "999B");
    }
}
