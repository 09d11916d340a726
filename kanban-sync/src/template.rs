//! Board templates: named, timestamped deep snapshots of the whole board.
//!
//! [`TemplateRegistry`] is the in-memory, listable registry a session works
//! against. [`TemplateStore`] optionally mirrors it to disk, one YAML file per
//! template.

mod delete;
mod list;
mod load;
mod save;

pub use delete::DeleteTemplate;
pub use list::ListTemplates;
pub use load::LoadTemplate;
pub use save::SaveTemplate;

use crate::document::BoardDocument;
use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::TemplateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A saved board snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTemplate {
    pub id: TemplateId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub document: BoardDocument,
}

impl BoardTemplate {
    /// Snapshot a store under `name`
    pub fn capture(name: impl Into<String>, store: &EntityStore, now: DateTime<Utc>) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            created_at: now,
            document: BoardDocument::from_store(store),
        }
    }

    /// Listing entry for this template
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            column_count: self.document.column_order.len(),
            task_count: self.document.tasks.len(),
        }
    }
}

/// What `list templates` shows without the snapshot body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub column_count: usize,
    pub task_count: usize,
}

/// In-memory template registry
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<TemplateId, BoardTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    pub fn insert(&mut self, template: BoardTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &TemplateId) -> Result<&BoardTemplate> {
        self.templates
            .get(id)
            .ok_or_else(|| KanbanError::not_found("template", id.as_str()))
    }

    pub fn remove(&mut self, id: &TemplateId) -> Result<BoardTemplate> {
        self.templates
            .remove(id)
            .ok_or_else(|| KanbanError::not_found("template", id.as_str()))
    }

    /// Templates oldest first, ties broken by name
    pub fn list(&self) -> Vec<TemplateSummary> {
        let mut list: Vec<_> = self.templates.values().map(|t| t.summary()).collect();
        list.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        list
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Directory of `{id}.yaml` template files
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &TemplateId) -> PathBuf {
        self.dir.join(format!("{}.yaml", id))
    }

    /// Write a template atomically
    pub async fn save(&self, template: &BoardTemplate) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(template)?;
        atomic_write(&self.path(&template.id), yaml.as_bytes()).await?;
        debug!(template = %template.id, name = %template.name, "saved template");
        Ok(())
    }

    pub async fn load(&self, id: &TemplateId) -> Result<BoardTemplate> {
        let path = self.path(id);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KanbanError::not_found("template", id.as_str()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_yaml_ng::from_str(&text)?)
    }

    /// Read every template in the directory; a missing directory is empty
    pub async fn load_all(&self) -> Result<Vec<BoardTemplate>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let text = fs::read_to_string(&path).await?;
            templates.push(serde_yaml_ng::from_str(&text)?);
        }
        Ok(templates)
    }

    pub async fn delete(&self, id: &TemplateId) -> Result<()> {
        match fs::remove_file(self.path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(KanbanError::not_found("template", id.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Write to a temp file in the same directory, then rename over the target
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::OrderingEngine;
    use crate::types::Task;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn board() -> EntityStore {
        let mut store = EntityStore::with_default_columns();
        OrderingEngine::new(&mut store)
            .add_task(Task::with_id("t1", "Seed"), &"todo".into(), None)
            .unwrap();
        store
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_registry_lists_oldest_first() {
        let store = board();
        let mut registry = TemplateRegistry::new();
        let later = BoardTemplate::capture("sprint", &store, at(20));
        let earlier = BoardTemplate::capture("release", &store, at(10));
        registry.insert(later);
        registry.insert(earlier);

        let names: Vec<_> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["release", "sprint"]);
        assert_eq!(registry.list()[0].task_count, 1);
        assert_eq!(registry.list()[0].column_count, 3);
    }

    #[test]
    fn test_registry_missing_template() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.get(&"nope".into()).unwrap_err().is_not_found());
        assert!(registry.remove(&"nope".into()).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_store_round_trips_through_disk() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));
        let template = BoardTemplate::capture("weekly", &board(), at(5));

        store.save(&template).await.unwrap();
        assert_eq!(store.load(&template.id).await.unwrap(), template);
        assert_eq!(store.load_all().await.unwrap().len(), 1);

        store.delete(&template.id).await.unwrap();
        assert!(store.load(&template.id).await.unwrap_err().is_not_found());
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_dir_loads_nothing() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path().join("absent"));
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
