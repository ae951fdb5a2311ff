//! Now-playing information from MPRIS players via `playerctl`.

use dash_core::snapshot::{MusicSnapshot, PlaybackStatus};
use dash_core::{DashError, DataSource, Result};
use std::process::Command;
use tracing::debug;

const FORMAT: &str = "{{status}}\t{{artist}}\t{{title}}\t{{album}}";

pub struct MusicSource {
    program: String,
    current: MusicSnapshot,
}

impl MusicSource {
    pub fn new() -> Result<Self> {
        Self::with_program("playerctl")
    }

    /// Use a specific `playerctl`-compatible executable.
    pub fn with_program(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        let found = Command::new(&program)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !found {
            return Err(DashError::Unavailable(format!("'{program}' not found")));
        }
        Ok(Self {
            program,
            current: MusicSnapshot::default(),
        })
    }
}

impl DataSource for MusicSource {
    type Snapshot = MusicSnapshot;

    fn refresh(&mut self) -> Result<()> {
        let out = Command::new(&self.program)
            .args(["metadata", "--format", FORMAT])
            .output()
            .map_err(|e| DashError::Query(format!("run '{}': {e}", self.program)))?;

        // playerctl exits non-zero with "No players found" when nothing is running.
        self.current = if out.status.success() {
            parse_metadata(&String::from_utf8_lossy(&out.stdout))
        } else {
            debug!("no active media player");
            MusicSnapshot::default()
        };
        Ok(())
    }

    fn snapshot(&self) -> Result<MusicSnapshot> {
        Ok(self.current.clone())
    }
}

/// Parse one line of `status\tartist\ttitle\talbum`.
pub fn parse_metadata(line: &str) -> MusicSnapshot {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');
    let status = match fields.next().map(str::trim) {
        Some("Playing") => PlaybackStatus::Playing,
        Some("Paused") => PlaybackStatus::Paused,
        _ => PlaybackStatus::Stopped,
    };
    let mut text = || {
        fields
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    MusicSnapshot {
        status,
        artist: text(),
        title: text(),
        album: text(),
    }
}
