// src/status/tracker.rs
use crate::probe::Status;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Last observed status per endpoint name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(BTreeMap<String, Status>);

impl StatusSnapshot {
    pub fn get(&self, name: &str) -> Option<Status> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, status: Status) {
        self.0.insert(name.into(), status);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read status snapshot {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse status snapshot {}", path.display()))
    }

    /// Replace the file at `path` with this snapshot in one rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace status snapshot {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub endpoint_name: String,
    pub previous: Status,
    pub current: Status,
}

/// A transition needs a baseline: an endpoint seen for the first time has none.
pub fn diff(previous: &StatusSnapshot, endpoint_name: &str, new_status: Status) -> Option<Transition> {
    match previous.get(endpoint_name) {
        Some(old) if old != new_status => Some(Transition {
            endpoint_name: endpoint_name.to_string(),
            previous: old,
            current: new_status,
        }),
        _ => None,
    }
}

/// Owns the snapshot for the length of one cycle.
pub struct StatusTracker {
    path: PathBuf,
    previous: StatusSnapshot,
    current: StatusSnapshot,
}

impl StatusTracker {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let previous = StatusSnapshot::load(&path)?;
        debug!("Loaded {} previous statuses from {}", previous.len(), path.display());

        Ok(Self {
            path,
            previous,
            current: StatusSnapshot::default(),
        })
    }

    pub fn previous(&self) -> &StatusSnapshot {
        &self.previous
    }

    pub fn record(&mut self, endpoint_name: &str, status: Status) -> Option<Transition> {
        self.current.insert(endpoint_name, status);
        diff(&self.previous, endpoint_name, status)
    }

    /// Overwrite the stored snapshot with this cycle's statuses. Endpoints not
    /// probed in this cycle are dropped.
    pub fn persist(self) -> Result<StatusSnapshot> {
        self.current.save(&self.path)?;
        debug!("Saved {} statuses to {}", self.current.len(), self.path.display());
        Ok(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn any_status() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::Up), Just(Status::Down), Just(Status::WarningSsl)]
    }

    proptest! {
        #[test]
        fn first_observation_is_never_a_transition(status in any_status()) {
            prop_assert_eq!(diff(&StatusSnapshot::default(), "new", status), None);
        }

        #[test]
        fn transition_iff_status_changed(old in any_status(), new in any_status()) {
            let mut previous = StatusSnapshot::default();
            previous.insert("site", old);

            let transition = diff(&previous, "site", new);
            prop_assert_eq!(transition.is_some(), old != new);
            if let Some(t) = transition {
                prop_assert_eq!(t.previous, old);
                prop_assert_eq!(t.current, new);
            }
        }
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = tempdir().unwrap();
        let tracker = StatusTracker::load(dir.path().join("status.json")).unwrap();
        assert!(tracker.previous().is_empty());
    }

    #[test]
    fn persist_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");
        fs::write(&path, r#"{"gone": "UP", "api": "UP"}"#).unwrap();

        let mut tracker = StatusTracker::load(&path).unwrap();
        let transition = tracker.record("api", Status::Down).unwrap();
        assert_eq!(transition.previous, Status::Up);
        assert!(tracker.record("fresh", Status::Up).is_none());
        tracker.persist().unwrap();

        let saved = StatusSnapshot::load(&path).unwrap();
        assert_eq!(saved.get("api"), Some(Status::Down));
        assert_eq!(saved.get("fresh"), Some(Status::Up));
        assert_eq!(saved.get("gone"), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");
        fs::write(&path, "{not json").unwrap();

        assert!(StatusTracker::load(&path).is_err());
    }
}
