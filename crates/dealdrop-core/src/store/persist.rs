// State file IO: read the whole document, or write it atomically through
// a sibling temp file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::state::{ClientState, STATE_VERSION};
use crate::error::CoreError;

/// Load client state. A missing file is an empty state.
pub(crate) fn load(path: &Path) -> Result<ClientState, CoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no state file yet");
            return Ok(ClientState::default());
        }
        Err(source) => {
            return Err(CoreError::StateIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| format_error(path, e.to_string()))?;

    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| format_error(path, "missing schema version".into()))?;
    if version != u64::from(STATE_VERSION) {
        return Err(format_error(
            path,
            format!("unsupported schema version {version} (expected {STATE_VERSION})"),
        ));
    }

    serde_json::from_value(value).map_err(|e| format_error(path, e.to_string()))
}

/// Serialize state to pretty JSON.
pub(crate) fn encode(state: &ClientState) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec_pretty(state)
        .map_err(|e| CoreError::Internal(format!("cannot serialize client state: {e}")))
}

/// Write state bytes to `path` via `<path>.tmp` + rename.
pub(crate) fn save(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let io_err = |source| CoreError::StateIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    if let Err(source) = std::fs::rename(&tmp, path) {
        if let Err(e) = std::fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "cannot remove temp state file");
        }
        return Err(io_err(source));
    }
    debug!(path = %path.display(), bytes = bytes.len(), "client state saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn format_error(path: &Path, message: String) -> CoreError {
    CoreError::StateFormat {
        path: path.to_path_buf(),
        message,
    }
}
