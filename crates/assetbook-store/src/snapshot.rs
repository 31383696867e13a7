use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::ChangeRecord;
use crate::error::{StoreError, StoreResult};

/// Serializable image of a world state: every key's change log.
///
/// Current values are not stored separately; they are derived from the last
/// change of each log when the state is rebuilt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStateSnapshot {
    pub logs: BTreeMap<String, Vec<ChangeRecord>>,
}

impl WorldStateSnapshot {
    /// Load a snapshot from a JSON file. A missing file yields an empty
    /// snapshot.
    pub async fn load(path: &Path) -> StoreResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write the snapshot as JSON, replacing `path` atomically.
    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        let json =
            serde_json::to_vec_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), keys = self.logs.len(), "snapshot saved");
        Ok(())
    }
}
