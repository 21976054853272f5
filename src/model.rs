//! Project entities: tasks, cards, sprints and the project root.
//!
//! The serialized form is the project JSON tree (camelCase keys). A project
//! owns its backlog and sprints, sprints own their cards, cards own their
//! tasks. A card lives in exactly one container at a time.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Card status
// =============================================================================

/// Kanban column of a card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl CardStatus {
    pub const ALL: [CardStatus; 3] = [CardStatus::Todo, CardStatus::InProgress, CardStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Todo => "todo",
            CardStatus::InProgress => "in-progress",
            CardStatus::Done => "done",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "todo" => Ok(CardStatus::Todo),
            "in-progress" | "doing" => Ok(CardStatus::InProgress),
            "done" => Ok(CardStatus::Done),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid card status '{}'. Expected: todo, in-progress, done",
                s
            ))),
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Checklist item on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub assignees: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            completed: false,
            assignees: Vec::new(),
        }
    }

    pub fn has_assignee(&self, name: &str) -> bool {
        self.assignees.iter().any(|assignee| assignee == name)
    }
}

/// A user story on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Card {
    /// A `todo` card with no points, tags or tasks
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            story_points: None,
            status: CardStatus::Todo,
            tags: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_ids(&self) -> HashSet<&str> {
        self.tasks.iter().map(|task| task.id.as_str()).collect()
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Story points used for aggregation; a missing value counts as zero.
    pub fn points(&self) -> u64 {
        self.story_points.map(u64::from).unwrap_or(0)
    }
}

/// Fixed-length work cycle holding its own cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Root of ownership and unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub backlog: Vec<Card>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
}

/// Container currently holding a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLocation {
    Backlog(usize),
    Sprint { sprint: usize, index: usize },
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            backlog: Vec::new(),
            sprints: Vec::new(),
            created_at,
            total_hours: None,
        }
    }

    /// Find the container holding `card_id`.
    ///
    /// The backlog is scanned first, then every sprint in order.
    pub fn locate_card(&self, card_id: &str) -> Option<CardLocation> {
        if let Some(index) = self.backlog.iter().position(|card| card.id == card_id) {
            return Some(CardLocation::Backlog(index));
        }
        self.sprints
            .iter()
            .enumerate()
            .find_map(|(sprint, entry)| {
                entry
                    .cards
                    .iter()
                    .position(|card| card.id == card_id)
                    .map(|index| CardLocation::Sprint { sprint, index })
            })
    }

    pub fn card_at(&self, location: CardLocation) -> Option<&Card> {
        match location {
            CardLocation::Backlog(index) => self.backlog.get(index),
            CardLocation::Sprint { sprint, index } => {
                self.sprints.get(sprint).and_then(|s| s.cards.get(index))
            }
        }
    }

    pub fn card_at_mut(&mut self, location: CardLocation) -> Option<&mut Card> {
        match location {
            CardLocation::Backlog(index) => self.backlog.get_mut(index),
            CardLocation::Sprint { sprint, index } => self
                .sprints
                .get_mut(sprint)
                .and_then(|s| s.cards.get_mut(index)),
        }
    }

    /// Remove and return the card at `location`.
    pub fn take_card(&mut self, location: CardLocation) -> Option<Card> {
        match location {
            CardLocation::Backlog(index) if index < self.backlog.len() => {
                Some(self.backlog.remove(index))
            }
            CardLocation::Sprint { sprint, index } => {
                let cards = &mut self.sprints.get_mut(sprint)?.cards;
                if index < cards.len() {
                    Some(cards.remove(index))
                } else {
                    None
                }
            }
            CardLocation::Backlog(_) => None,
        }
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.locate_card(card_id)
            .and_then(|location| self.card_at(location))
    }

    /// All cards, backlog first, then sprints in order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.backlog
            .iter()
            .chain(self.sprints.iter().flat_map(|sprint| sprint.cards.iter()))
    }

    pub fn card_ids(&self) -> HashSet<&str> {
        self.cards().map(|card| card.id.as_str()).collect()
    }

    pub fn card_count(&self) -> usize {
        self.backlog.len() + self.sprints.iter().map(|s| s.cards.len()).sum::<usize>()
    }

    /// Check the ownership and uniqueness invariants.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidProject("project id cannot be empty".to_string()));
        }
        if let Some(hours) = self.total_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(Error::InvalidProject(format!(
                    "{}: totalHours must be positive, got {hours}",
                    self.id
                )));
            }
        }

        let mut sprint_ids = HashSet::new();
        for sprint in &self.sprints {
            if !sprint_ids.insert(sprint.id.as_str()) {
                return Err(Error::InvalidProject(format!(
                    "{}: duplicate sprint id {}",
                    self.id, sprint.id
                )));
            }
        }

        let mut card_ids = HashSet::new();
        for card in self.cards() {
            if !card_ids.insert(card.id.as_str()) {
                return Err(Error::InvalidProject(format!(
                    "{}: card {} appears more than once",
                    self.id, card.id
                )));
            }
            let mut task_ids = HashSet::new();
            for task in &card.tasks {
                if !task_ids.insert(task.id.as_str()) {
                    return Err(Error::InvalidProject(format!(
                        "{}: duplicate task id {} on card {}",
                        self.id, task.id, card.id
                    )));
                }
                let mut names = HashSet::new();
                for name in &task.assignees {
                    if !names.insert(name.as_str()) {
                        return Err(Error::InvalidProject(format!(
                            "{}: assignee '{}' listed twice on task {}",
                            self.id, name, task.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Partial card update
// =============================================================================

/// Subset of card fields to merge into an existing card
///
/// `story_points` is doubly optional: `Some(None)` clears the estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub story_points: Option<Option<u32>>,
    pub status: Option<CardStatus>,
    pub tags: Option<Vec<String>>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.story_points.is_none()
            && self.status.is_none()
            && self.tags.is_none()
    }

    /// Merge into `card`, returning whether anything changed.
    pub fn apply_to(&self, card: &mut Card) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            changed |= replace(&mut card.title, title.clone());
        }
        if let Some(description) = &self.description {
            changed |= replace(&mut card.description, description.clone());
        }
        if let Some(points) = self.story_points {
            changed |= replace(&mut card.story_points, points);
        }
        if let Some(status) = self.status {
            changed |= replace(&mut card.status, status);
        }
        if let Some(tags) = &self.tags {
            changed |= replace(&mut card.tags, dedup_tags(tags));
        }
        changed
    }
}

/// Tags behave as a set; keep the first occurrence of each.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
