//! Project mutation engine.
//!
//! Every operation reads a `&Project` and returns a [`Mutation`] carrying a
//! new project value. The input snapshot is never modified: the engine
//! mutates a private clone and hands it back. Operations never fail; a card
//! or task that cannot be found, or input that does not pass validation,
//! turns the call into a no-op reported through [`Outcome`].
//!
//! Card lookup follows the dual-container rule: the backlog is scanned
//! first, then every sprint in order (see [`Project::locate_card`]).

use serde::Serialize;
use tracing::{debug, info};

use crate::config::CardDefaults;
use crate::ids::{self, IdKind};
use crate::model::{Card, CardPatch, Project, Task};

/// A board command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateBacklogCard,
    DeleteCard {
        card_id: String,
    },
    UpdateCardFields {
        card_id: String,
        patch: CardPatch,
    },
    AddTask {
        card_id: String,
        content: String,
    },
    DeleteTask {
        card_id: String,
        task_id: String,
    },
    ToggleTask {
        card_id: String,
        task_id: String,
    },
    AddAssignee {
        card_id: String,
        task_id: String,
        name: String,
    },
    RemoveAssignee {
        card_id: String,
        task_id: String,
        name: String,
    },
    UpdateProjectDetails {
        name: Option<String>,
        description: Option<String>,
    },
}

impl Command {
    /// Card the command targets, if any.
    pub fn card_id(&self) -> Option<&str> {
        match self {
            Command::CreateBacklogCard | Command::UpdateProjectDetails { .. } => None,
            Command::DeleteCard { card_id }
            | Command::UpdateCardFields { card_id, .. }
            | Command::AddTask { card_id, .. }
            | Command::DeleteTask { card_id, .. }
            | Command::ToggleTask { card_id, .. }
            | Command::AddAssignee { card_id, .. }
            | Command::RemoveAssignee { card_id, .. } => Some(card_id),
        }
    }
}

/// What a lookup failed to find
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Missing {
    Card { card_id: String },
    Task { card_id: String, task_id: String },
    Assignee { task_id: String, name: String },
}

/// Why input was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    EmptyTaskContent,
    EmptyAssignee,
    DuplicateAssignee,
    EmptyProjectName,
}

impl Rejection {
    pub fn describe(&self) -> &'static str {
        match self {
            Rejection::EmptyTaskContent => "task content cannot be empty",
            Rejection::EmptyAssignee => "assignee name cannot be empty",
            Rejection::DuplicateAssignee => "assignee is already on the task",
            Rejection::EmptyProjectName => "project name cannot be empty",
        }
    }
}

/// Result classification of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The project changed.
    Applied,
    /// The target exists but the command changed nothing.
    Unchanged,
    NotFound(Missing),
    Rejected { reason: Rejection },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// New project snapshot plus what happened
#[derive(Debug, Clone)]
pub struct Mutation {
    pub project: Project,
    pub outcome: Outcome,
    /// Id minted by the command (new card or task).
    pub created_id: Option<String>,
}

impl Mutation {
    fn applied(project: Project) -> Self {
        Self {
            project,
            outcome: Outcome::Applied,
            created_id: None,
        }
    }

    fn created(project: Project, id: String) -> Self {
        Self {
            project,
            outcome: Outcome::Applied,
            created_id: Some(id),
        }
    }

    fn noop(project: &Project, outcome: Outcome) -> Self {
        debug!(project = %project.id, ?outcome, "command left project unchanged");
        Self {
            project: project.clone(),
            outcome,
            created_id: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }
}

/// Applies commands using the configured card defaults
#[derive(Debug, Clone, Default)]
pub struct Engine {
    defaults: CardDefaults,
}

impl Engine {
    pub fn new(defaults: CardDefaults) -> Self {
        Self { defaults }
    }

    /// Apply one command to `project`.
    pub fn apply(&self, project: &Project, command: &Command) -> Mutation {
        let mutation = match command {
            Command::CreateBacklogCard => self.create_backlog_card(project),
            Command::DeleteCard { card_id } => delete_card(project, card_id),
            Command::UpdateCardFields { card_id, patch } => {
                update_card_fields(project, card_id, patch)
            }
            Command::AddTask { card_id, content } => add_task(project, card_id, content),
            Command::DeleteTask { card_id, task_id } => delete_task(project, card_id, task_id),
            Command::ToggleTask { card_id, task_id } => toggle_task(project, card_id, task_id),
            Command::AddAssignee {
                card_id,
                task_id,
                name,
            } => add_assignee(project, card_id, task_id, name),
            Command::RemoveAssignee {
                card_id,
                task_id,
                name,
            } => remove_assignee(project, card_id, task_id, name),
            Command::UpdateProjectDetails { name, description } => {
                update_project_details(project, name.as_deref(), description.as_deref())
            }
        };
        if mutation.is_applied() {
            info!(project = %project.id, ?command, "applied board command");
        }
        mutation
    }

    /// Prepend a fresh card to the backlog.
    pub fn create_backlog_card(&self, project: &Project) -> Mutation {
        let card_id = ids::generate_id(IdKind::Card, &project.card_ids());
        let mut card = Card::new(
            card_id.clone(),
            self.defaults.default_title.clone(),
            self.defaults.default_description.clone(),
        );
        card.story_points = Some(self.defaults.default_story_points);
        let mut next = project.clone();
        next.backlog.insert(0, card);
        Mutation::created(next, card_id)
    }
}

/// Remove a card from whichever container holds it.
pub fn delete_card(project: &Project, card_id: &str) -> Mutation {
    let Some(location) = project.locate_card(card_id) else {
        return Mutation::noop(project, missing_card(card_id));
    };
    let mut next = project.clone();
    next.take_card(location);
    Mutation::applied(next)
}

/// Shallow-merge `patch` into the card; `id` and `tasks` are never touched.
pub fn update_card_fields(project: &Project, card_id: &str, patch: &CardPatch) -> Mutation {
    let Some(location) = project.locate_card(card_id) else {
        return Mutation::noop(project, missing_card(card_id));
    };
    let mut next = project.clone();
    let changed = next
        .card_at_mut(location)
        .map(|card| patch.apply_to(card))
        .unwrap_or(false);
    if !changed {
        return Mutation::noop(project, Outcome::Unchanged);
    }
    Mutation::applied(next)
}

/// Append a new uncompleted task to the card.
pub fn add_task(project: &Project, card_id: &str, content: &str) -> Mutation {
    if content.trim().is_empty() {
        return Mutation::noop(
            project,
            Outcome::Rejected {
                reason: Rejection::EmptyTaskContent,
            },
        );
    }
    let Some(location) = project.locate_card(card_id) else {
        return Mutation::noop(project, missing_card(card_id));
    };
    let mut next = project.clone();
    let Some(card) = next.card_at_mut(location) else {
        return Mutation::noop(project, missing_card(card_id));
    };
    let task_id = ids::generate_id(IdKind::Task, &card.task_ids());
    card.tasks.push(Task::new(task_id.clone(), content));
    Mutation::created(next, task_id)
}

pub fn delete_task(project: &Project, card_id: &str, task_id: &str) -> Mutation {
    with_task(project, card_id, task_id, |card, index| {
        card.tasks.remove(index);
        Outcome::Applied
    })
}

/// Flip the task's `completed` flag.
pub fn toggle_task(project: &Project, card_id: &str, task_id: &str) -> Mutation {
    with_task(project, card_id, task_id, |card, index| {
        let task = &mut card.tasks[index];
        task.completed = !task.completed;
        Outcome::Applied
    })
}

/// Add `name` to the task's assignees unless it is already there.
///
/// Matching is exact and case-sensitive. The name is stored as given.
pub fn add_assignee(project: &Project, card_id: &str, task_id: &str, name: &str) -> Mutation {
    if name.trim().is_empty() {
        return Mutation::noop(
            project,
            Outcome::Rejected {
                reason: Rejection::EmptyAssignee,
            },
        );
    }
    with_task(project, card_id, task_id, |card, index| {
        let task = &mut card.tasks[index];
        if task.has_assignee(name) {
            return Outcome::Rejected {
                reason: Rejection::DuplicateAssignee,
            };
        }
        task.assignees.push(name.to_string());
        Outcome::Applied
    })
}

pub fn remove_assignee(project: &Project, card_id: &str, task_id: &str, name: &str) -> Mutation {
    with_task(project, card_id, task_id, |card, index| {
        let task = &mut card.tasks[index];
        let Some(position) = task.assignees.iter().position(|entry| entry == name) else {
            return Outcome::NotFound(Missing::Assignee {
                task_id: task.id.clone(),
                name: name.to_string(),
            });
        };
        task.assignees.remove(position);
        Outcome::Applied
    })
}

/// Rename or re-describe the project.
pub fn update_project_details(
    project: &Project,
    name: Option<&str>,
    description: Option<&str>,
) -> Mutation {
    let name = name.map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Mutation::noop(
            project,
            Outcome::Rejected {
                reason: Rejection::EmptyProjectName,
            },
        );
    }
    let mut next = project.clone();
    let mut changed = false;
    if let Some(name) = name {
        if next.name != name {
            next.name = name.to_string();
            changed = true;
        }
    }
    if let Some(description) = description {
        if next.description != description {
            next.description = description.to_string();
            changed = true;
        }
    }
    if !changed {
        return Mutation::noop(project, Outcome::Unchanged);
    }
    Mutation::applied(next)
}

/// Locate a task and run `edit` on a private copy of its card.
///
/// `edit` receives the card and the task index. Any outcome other than
/// `Applied` discards the copy.
fn with_task<F>(project: &Project, card_id: &str, task_id: &str, edit: F) -> Mutation
where
    F: FnOnce(&mut Card, usize) -> Outcome,
{
    let Some(location) = project.locate_card(card_id) else {
        return Mutation::noop(project, missing_card(card_id));
    };
    let exists = project
        .card_at(location)
        .is_some_and(|card| card.task(task_id).is_some());
    if !exists {
        return Mutation::noop(
            project,
            Outcome::NotFound(Missing::Task {
                card_id: card_id.to_string(),
                task_id: task_id.to_string(),
            }),
        );
    }

    let mut next = project.clone();
    let outcome = match next.card_at_mut(location) {
        Some(card) => match card.tasks.iter().position(|task| task.id == task_id) {
            Some(index) => edit(card, index),
            None => missing_card(card_id),
        },
        None => missing_card(card_id),
    };
    if outcome.is_applied() {
        Mutation::applied(next)
    } else {
        Mutation::noop(project, outcome)
    }
}

fn missing_card(card_id: &str) -> Outcome {
    Outcome::NotFound(Missing::Card {
        card_id: card_id.to_string(),
    })
}
