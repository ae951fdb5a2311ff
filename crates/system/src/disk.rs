use dash_core::snapshot::{DriveInfo, DriveSnapshot};
use dash_core::{DataSource, Result};
use sysinfo::Disks;

/// Capacity of every mounted filesystem with a non-zero size.
#[derive(Default)]
pub struct DriveSource {
    current: DriveSnapshot,
}

impl DriveSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSource for DriveSource {
    type Snapshot = DriveSnapshot;

    fn refresh(&mut self) -> Result<()> {
        let disks = Disks::new_with_refreshed_list();
        let mut drives: Vec<DriveInfo> = disks
            .iter()
            .filter(|d| d.total_space() > 0)
            .map(|d| DriveInfo {
                name: d.name().to_string_lossy().into_owned(),
                mount_point: d.mount_point().display().to_string(),
                total: d.total_space(),
                available: d.available_space(),
            })
            .collect();
        drives.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
        drives.dedup_by(|a, b| a.mount_point == b.mount_point);

        self.current = DriveSnapshot { drives };
        Ok(())
    }

    fn snapshot(&self) -> Result<DriveSnapshot> {
        Ok(self.current.clone())
    }
}

/// The root filesystem, if it is among `snapshot`'s drives.
pub fn root_drive(snapshot: &DriveSnapshot) -> Option<&DriveInfo> {
    snapshot.drives.iter().find(|d| d.mount_point == "/")
}
