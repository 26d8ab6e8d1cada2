//! `<artifact>.provenance.json` sidecars: which code and which parameters
//! produced a file.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Serialize)]
struct Provenance<'a> {
    code_rev: String,
    fineltra: &'static str,
    params: Value,
    artifact: &'a Path,
}

/// Record code revision, library version and `params` next to `artifact`.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, params: Value) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let doc = Provenance {
        code_rev: current_git_rev(),
        fineltra: fineltra::VERSION,
        params,
        artifact,
    };
    let path = sidecar_path(artifact);
    std::fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

/// `dir/name.ext` → `dir/name.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`.
pub fn current_git_rev() -> String {
    let pinned = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    if let Some(rev) = pinned {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_artifact() {
        assert_eq!(
            sidecar_path(Path::new("runs/lv95/parcels.json")),
            Path::new("runs/lv95/parcels.provenance.json")
        );
        assert_eq!(
            sidecar_path(Path::new("mesh")),
            Path::new("mesh.provenance.json")
        );
    }

    #[test]
    fn sidecar_records_params_and_version() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("mesh.csv");
        let path = write_sidecar(&artifact, json!({ "nx": 4, "seed": 7 })).unwrap();
        assert_eq!(path, dir.path().join("mesh.provenance.json"));
        let doc: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["params"]["seed"], 7);
        assert_eq!(doc["fineltra"], fineltra::VERSION);
        assert_eq!(doc["artifact"], artifact.to_string_lossy().as_ref());
        assert!(doc["code_rev"].as_str().is_some_and(|rev| !rev.is_empty()));
    }
}
