//! Draft ingestion.
//!
//! An image-understanding model turns whiteboard photos into a
//! [`DraftProject`]. Running the model is somebody else's job; this module
//! only receives the finished draft through a [`DraftSource`] and converts
//! it into a canonical [`Project`] with fresh ids.
//!
//! Ingestion is all-or-nothing: the draft is validated up front and either a
//! complete project comes out or an [`Error::InvalidDraft`] does.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::ids::{self, IdKind};
use crate::model::{dedup_tags, Card, CardStatus, Project, Sprint, Task};

/// Project structure as returned by the image-to-draft model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftProject {
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    pub backlog_cards: Vec<DraftCard>,
    pub sprints: Vec<DraftSprint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSprint {
    pub name: String,
    pub cards: Vec<DraftCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCard {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "deserialize_story_points",
        skip_serializing_if = "Option::is_none"
    )]
    pub story_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub tasks: Vec<String>,
}

/// Accept integers, integral floats and numeric strings.
fn deserialize_story_points<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => coerce_story_points(&value).map(Some).map_err(D::Error::custom),
    }
}

fn coerce_story_points(value: &serde_json::Value) -> std::result::Result<u32, String> {
    let number = match value {
        serde_json::Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| format!("storyPoints is not a number: {number}"))?,
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("storyPoints is not numeric: {raw:?}"))?,
        other => return Err(format!("storyPoints must be a number, got {other}")),
    };
    if !number.is_finite() || number < 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
        return Err(format!(
            "storyPoints must be a non-negative integer, got {number}"
        ));
    }
    Ok(number as u32)
}

impl DraftProject {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| Error::InvalidDraft(err.to_string()))
    }

    /// Check the draft is complete enough to become a project.
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(Error::InvalidDraft("projectName cannot be empty".to_string()));
        }
        for (index, card) in self.backlog_cards.iter().enumerate() {
            card.validate(&format!("backlogCards[{index}]"))?;
        }
        for (sprint_index, sprint) in self.sprints.iter().enumerate() {
            if sprint.name.trim().is_empty() {
                return Err(Error::InvalidDraft(format!(
                    "sprints[{sprint_index}].name cannot be empty"
                )));
            }
            for (index, card) in sprint.cards.iter().enumerate() {
                card.validate(&format!("sprints[{sprint_index}].cards[{index}]"))?;
            }
        }
        Ok(())
    }

    // Review-step editing, before the draft is confirmed.

    pub fn backlog_card_mut(&mut self, index: usize) -> Option<&mut DraftCard> {
        self.backlog_cards.get_mut(index)
    }

    pub fn sprint_card_mut(&mut self, sprint: usize, index: usize) -> Option<&mut DraftCard> {
        self.sprints.get_mut(sprint)?.cards.get_mut(index)
    }

    pub fn remove_backlog_card(&mut self, index: usize) -> Option<DraftCard> {
        (index < self.backlog_cards.len()).then(|| self.backlog_cards.remove(index))
    }

    pub fn remove_sprint_card(&mut self, sprint: usize, index: usize) -> Option<DraftCard> {
        let cards = &mut self.sprints.get_mut(sprint)?.cards;
        (index < cards.len()).then(|| cards.remove(index))
    }

    pub fn card_count(&self) -> usize {
        self.backlog_cards.len() + self.sprints.iter().map(|s| s.cards.len()).sum::<usize>()
    }
}

impl DraftCard {
    fn validate(&self, path: &str) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidDraft(format!("{path}.title cannot be empty")));
        }
        Ok(())
    }
}

/// Boundary to whatever produces drafts (the image-understanding model)
pub trait DraftSource {
    fn fetch(&self) -> Result<DraftProject>;
}

/// Draft already written to disk as JSON
#[derive(Debug, Clone)]
pub struct JsonDraftFile {
    path: PathBuf,
}

impl JsonDraftFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftSource for JsonDraftFile {
    fn fetch(&self) -> Result<DraftProject> {
        let raw = std::fs::read_to_string(&self.path)?;
        DraftProject::from_json_str(&raw)
    }
}

/// Converts drafts into canonical projects
#[derive(Debug, Clone)]
pub struct Ingestor {
    sprint_length: Duration,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self {
            sprint_length: Duration::days(15),
        }
    }
}

impl Ingestor {
    pub fn new(sprint_length: Duration) -> Self {
        Self { sprint_length }
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Ok(Self::new(config.sprint_duration()?))
    }

    /// Build a project from `draft`.
    ///
    /// Sprint `i` starts at `reference + i * sprint_length` and ends one
    /// sprint length later. `reference` also becomes `createdAt`.
    pub fn ingest(
        &self,
        draft: &DraftProject,
        reference: DateTime<Utc>,
        total_hours: Option<f64>,
    ) -> Result<Project> {
        draft.validate()?;
        if let Some(hours) = total_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(Error::InvalidDraft(format!(
                    "total hours must be positive, got {hours}"
                )));
            }
        }

        let mut card_ids = HashSet::new();
        let mut sprint_ids = HashSet::new();

        let backlog = draft
            .backlog_cards
            .iter()
            .map(|card| convert_card(card, &mut card_ids))
            .collect();

        let mut sprints = Vec::with_capacity(draft.sprints.len());
        let mut start_date = reference;
        for sprint in &draft.sprints {
            let end_date = start_date
                .checked_add_signed(self.sprint_length)
                .ok_or_else(|| {
                    Error::InvalidDraft(format!(
                        "sprint '{}' ends past the supported date range",
                        sprint.name
                    ))
                })?;
            sprints.push(Sprint {
                id: ids::claim_id(IdKind::Sprint, &mut sprint_ids),
                name: sprint.name.clone(),
                start_date,
                end_date,
                cards: sprint
                    .cards
                    .iter()
                    .map(|card| convert_card(card, &mut card_ids))
                    .collect(),
                is_completed: false,
            });
            start_date = end_date;
        }

        let project = Project {
            id: ids::project_id(),
            name: draft.project_name.clone(),
            description: draft.project_description.clone(),
            backlog,
            sprints,
            created_at: reference,
            total_hours,
        };
        project.validate()?;
        info!(
            project = %project.id,
            sprints = project.sprints.len(),
            cards = project.card_count(),
            "ingested draft"
        );
        Ok(project)
    }
}

fn convert_card(draft: &DraftCard, card_ids: &mut HashSet<String>) -> Card {
    let mut task_ids = HashSet::new();
    Card {
        id: ids::claim_id(IdKind::Card, card_ids),
        title: draft.title.clone(),
        description: draft.description.clone(),
        story_points: draft.story_points,
        status: CardStatus::Todo,
        tags: draft.tags.as_deref().map(dedup_tags).unwrap_or_default(),
        tasks: draft
            .tasks
            .iter()
            .map(|content| Task::new(ids::claim_id(IdKind::Task, &mut task_ids), content.clone()))
            .collect(),
    }
}
