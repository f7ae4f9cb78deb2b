//! Free and total space of the primary storage volume

use crate::error::{FileAccessError, Result};
use bridge_traits::{VolumeInfo, VolumeStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsStat {
    pub free_space: u64,
    pub total_space: u64,
}

/// Report the volume holding `document_dir`
///
/// The platform query can block, so it runs on the blocking pool.
pub async fn df(volumes: Arc<dyn VolumeInfo>, document_dir: PathBuf) -> Result<FsStat> {
    let stat = core_async::task::spawn_blocking(move || {
        let target = std::fs::canonicalize(&document_dir).unwrap_or(document_dir);
        let list = volumes
            .volumes()
            .map_err(|e| FileAccessError::Unavailable(format!("Cannot list volumes: {}", e)))?;

        containing_volume(&list, &target)
            .map(|volume| FsStat {
                free_space: volume.available_space,
                total_space: volume.total_space,
            })
            .ok_or_else(|| {
                FileAccessError::Unavailable(format!(
                    "No mounted volume contains {}",
                    target.display()
                ))
            })
    })
    .await
    .map_err(|e| FileAccessError::Unavailable(format!("Volume query failed: {}", e)))??;

    debug!(free = stat.free_space, total = stat.total_space, "Queried disk space");
    Ok(stat)
}

/// Volume with the longest mount point that is a prefix of `path`
fn containing_volume<'a>(volumes: &'a [VolumeStats], path: &Path) -> Option<&'a VolumeStats> {
    volumes
        .iter()
        .filter(|volume| path.starts_with(&volume.mount_point))
        .max_by_key(|volume| volume.mount_point.components().count())
}
