//! Volume capacity via `sysinfo`

use bridge_traits::{
    error::{BridgeError, Result},
    storage::{VolumeInfo, VolumeStats},
};
use sysinfo::Disks;
use tracing::debug;

/// Volume information backed by `sysinfo::Disks`
#[derive(Debug, Default)]
pub struct SysinfoVolumes;

impl SysinfoVolumes {
    pub fn new() -> Self {
        Self
    }
}

impl VolumeInfo for SysinfoVolumes {
    fn volumes(&self) -> Result<Vec<VolumeStats>> {
        let disks = Disks::new_with_refreshed_list();
        let volumes: Vec<VolumeStats> = disks
            .list()
            .iter()
            .map(|disk| VolumeStats {
                mount_point: disk.mount_point().to_path_buf(),
                available_space: disk.available_space(),
                total_space: disk.total_space(),
            })
            .collect();

        if volumes.is_empty() {
            return Err(BridgeError::NotAvailable(
                "The system reported no mounted volumes".to_string(),
            ));
        }

        debug!(count = volumes.len(), "Enumerated volumes");
        Ok(volumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumes_are_consistent() {
        // Containers can hide every mount from sysinfo; only check what we get
        if let Ok(volumes) = SysinfoVolumes::new().volumes() {
            for volume in volumes {
                assert!(volume.available_space <= volume.total_space);
            }
        }
    }
}
