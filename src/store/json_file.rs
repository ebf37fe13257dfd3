use crate::errors::{TrackerError, TrackerResult};
use crate::store::model::RawRecord;
use crate::store::Gateway;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Persists the store as a single pretty-printed JSON array.
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: PathBuf) -> Self {
        JsonFileGateway { path }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn write_failure(&self, reason: impl ToString) -> TrackerError {
        TrackerError::PersistenceWriteFailure {
            location: self.location(),
            reason: reason.to_string(),
        }
    }
}

impl Gateway for JsonFileGateway {
    fn read(&self) -> TrackerResult<Option<Vec<RawRecord>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| TrackerError::PersistedStateCorrupt {
                location: self.location(),
                reason: e.to_string(),
            })
    }

    fn write(&self, records: &[RawRecord]) -> TrackerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_failure(e))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|e| self.write_failure(e))?;
        // Write next to the target and rename over it, so readers never see half a file.
        let tmp = self.sibling(".tmp");
        fs::write(&tmp, json).map_err(|e| self.write_failure(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_failure(e))?;
        debug!(path = %self.path.display(), count = records.len(), "wrote transactions");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn quarantine(&self) -> TrackerResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.sibling(".corrupt");
        fs::rename(&self.path, &target).map_err(|e| TrackerError::QuarantineFailure {
            location: self.location(),
            reason: format!("can't rename to {}: {e}", target.display()),
        })?;
        Ok(Some(target.display().to_string()))
    }
}
