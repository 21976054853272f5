//! Project persistence.
//!
//! One pretty-printed JSON snapshot per project under `projects/`. Every
//! write goes through the project's lock file and an atomic rename, and
//! every load re-checks the snapshot invariants.

use std::fs;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::Project;
use crate::storage::Storage;

/// Listing entry for a stored project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub sprints: usize,
    pub cards: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: project.created_at,
            sprints: project.sprints.len(),
            cards: project.card_count(),
            total_hours: project.total_hours,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectStore {
    storage: Storage,
    lock_timeout_ms: u64,
}

impl ProjectStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Write `project`, replacing any snapshot with the same id.
    pub fn save(&self, project: &Project) -> Result<()> {
        project.validate()?;
        let _lock = self.lock(&project.id)?;
        self.write(project)
    }

    /// Load by exact id. `Ok(None)` when no snapshot exists.
    pub fn load(&self, project_id: &str) -> Result<Option<Project>> {
        let path = self.storage.project_file(project_id);
        if !path.exists() {
            return Ok(None);
        }
        let project: Project = self.storage.read_json(&path)?;
        project.validate()?;
        debug!(project = %project_id, "loaded snapshot");
        Ok(Some(project))
    }

    /// Load by exact id or unique prefix.
    pub fn get(&self, input: &str) -> Result<Project> {
        let resolved = self.resolve_project_id(input)?;
        self.load(&resolved)?
            .ok_or(Error::ProjectNotFound(resolved))
    }

    /// All stored projects, newest first.
    pub fn list(&self) -> Result<Vec<ProjectSummary>> {
        let mut summaries = Vec::new();
        for id in self.storage.snapshot_ids()? {
            if let Some(project) = self.load(&id)? {
                summaries.push(ProjectSummary::from(&project));
            }
        }
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(summaries)
    }

    /// Remove a project. Returns the removed project's id.
    pub fn delete(&self, input: &str) -> Result<String> {
        let resolved = self.resolve_project_id(input)?;
        {
            let _lock = self.lock(&resolved)?;
            fs::remove_file(self.storage.project_file(&resolved))?;
        }
        let _ = fs::remove_file(self.storage.project_lock_file(&resolved));
        debug!(project = %resolved, "deleted snapshot");
        Ok(resolved)
    }

    /// Load, edit and save a project while holding its lock.
    ///
    /// The snapshot is rewritten only if `edit` changed it, and the edited
    /// project must still satisfy the snapshot invariants.
    pub fn update<T, F>(&self, input: &str, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Project) -> Result<T>,
    {
        let resolved = self.resolve_project_id(input)?;
        let _lock = self.lock(&resolved)?;

        let original = self
            .load(&resolved)?
            .ok_or_else(|| Error::ProjectNotFound(resolved.clone()))?;
        let mut project = original.clone();
        let result = edit(&mut project)?;

        if project.id != original.id {
            return Err(Error::OperationFailed(format!(
                "project id changed during update: {} -> {}",
                original.id, project.id
            )));
        }
        if project != original {
            project.validate()?;
            self.write(&project)?;
        } else {
            debug!(project = %resolved, "update left snapshot unchanged");
        }
        Ok(result)
    }

    pub fn try_resolve_project_id(&self, input: &str) -> Result<Option<String>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(
                "project id cannot be empty".to_string(),
            ));
        }
        let needle = trimmed.to_ascii_lowercase();
        let mut prefix = Vec::new();
        for id in self.storage.snapshot_ids()? {
            let lowered = id.to_ascii_lowercase();
            if lowered == needle {
                return Ok(Some(id));
            }
            if lowered.starts_with(&needle) {
                prefix.push(id);
            }
        }

        prefix.sort();
        if prefix.len() > 1 {
            return Err(Error::InvalidArgument(format!(
                "ambiguous project id '{}': {}",
                trimmed,
                prefix.join(", ")
            )));
        }
        Ok(prefix.into_iter().next())
    }

    pub fn resolve_project_id(&self, input: &str) -> Result<String> {
        self.try_resolve_project_id(input)?
            .ok_or_else(|| Error::ProjectNotFound(input.trim().to_string()))
    }

    fn lock(&self, project_id: &str) -> Result<FileLock> {
        FileLock::acquire(
            self.storage.project_lock_file(project_id),
            self.lock_timeout_ms,
        )
    }

    fn write(&self, project: &Project) -> Result<()> {
        let path = self.storage.project_file(&project.id);
        self.storage.write_json(&path, project)?;
        debug!(project = %project.id, path = %path.display(), "wrote snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, Task};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ProjectStore {
        ProjectStore::new(Storage::new(temp.path()))
    }

    fn project(id: &str, day: u32) -> Project {
        let created = Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap();
        let mut project = Project::new(id, format!("Project {id}"), created);
        let mut card = Card::new("card-1", "Card", "");
        card.tasks.push(Task::new("tsk-1", "Write it"));
        project.backlog.push(card);
        project
    }

    #[test]
    fn save_then_load_is_lossless() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let project = project("prj-aaa", 1);

        store.save(&project).unwrap();
        assert_eq!(store.load("prj-aaa").unwrap(), Some(project));
        assert_eq!(store.load("prj-missing").unwrap(), None);
    }

    #[test]
    fn list_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&project("prj-old", 1)).unwrap();
        store.save(&project("prj-new", 9)).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["prj-new", "prj-old"]);
    }

    #[test]
    fn resolve_by_prefix() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&project("prj-abc1", 1)).unwrap();
        store.save(&project("prj-abd2", 2)).unwrap();

        assert_eq!(store.resolve_project_id("prj-abc").unwrap(), "prj-abc1");
        assert_eq!(store.resolve_project_id("PRJ-ABD2").unwrap(), "prj-abd2");
        assert!(matches!(
            store.resolve_project_id("prj-ab"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            store.get("prj-zzz"),
            Err(Error::ProjectNotFound(_))
        ));
    }

    #[test]
    fn update_writes_only_changes() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&project("prj-aaa", 1)).unwrap();
        let path = store.storage().project_file("prj-aaa");
        let before = fs::read_to_string(&path).unwrap();

        let seen = store.update("prj-a", |project| Ok(project.name.clone())).unwrap();
        assert_eq!(seen, "Project prj-aaa");
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        store
            .update("prj-aaa", |project| {
                project.name = "Renamed".to_string();
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get("prj-aaa").unwrap().name, "Renamed");
    }

    #[test]
    fn update_rejects_invalid_result() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&project("prj-aaa", 1)).unwrap();

        let result = store.update("prj-aaa", |project| {
            let duplicate = project.backlog[0].clone();
            project.backlog.push(duplicate);
            Ok(())
        });
        assert!(matches!(result, Err(Error::InvalidProject(_))));
        assert_eq!(store.get("prj-aaa").unwrap().backlog.len(), 1);
    }

    #[test]
    fn delete_removes_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&project("prj-aaa", 1)).unwrap();

        assert_eq!(store.delete("prj-a").unwrap(), "prj-aaa");
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(store.delete("prj-aaa"), Err(Error::ProjectNotFound(_))));
    }
}
