//! Open-card projection.
//!
//! A [`BoardSession`] holds the canonical project together with a detached
//! copy of the card the user has open. After every command the projection is
//! re-derived from the new snapshot by id, so it cannot drift from the
//! project: edits refresh it and deleting the card clears it.

use tracing::debug;

use crate::engine::{Command, Engine, Outcome};
use crate::model::{Card, Project};
use crate::stats::{self, ProjectStats};

/// Re-derive the open card from `project`.
///
/// Returns `None` when nothing is open or the card no longer exists.
pub fn reconcile(open: Option<&Card>, project: &Project) -> Option<Card> {
    let open = open?;
    let refreshed = project.card(&open.id).cloned();
    if refreshed.is_none() {
        debug!(card = %open.id, "open card no longer exists; closing it");
    }
    refreshed
}

/// Canonical project plus the currently open card
#[derive(Debug, Clone)]
pub struct BoardSession {
    engine: Engine,
    project: Project,
    open_card: Option<Card>,
}

impl BoardSession {
    pub fn new(project: Project, engine: Engine) -> Self {
        Self {
            engine,
            project,
            open_card: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn open_card(&self) -> Option<&Card> {
        self.open_card.as_ref()
    }

    /// Open `card_id` for display/editing. Returns false if it does not exist.
    pub fn open(&mut self, card_id: &str) -> bool {
        self.open_card = self.project.card(card_id).cloned();
        self.open_card.is_some()
    }

    pub fn close(&mut self) {
        self.open_card = None;
    }

    /// Apply a command, replace the snapshot and reconcile the open card.
    ///
    /// A newly created backlog card is opened straight away.
    pub fn apply(&mut self, command: &Command) -> Outcome {
        self.apply_returning_id(command).0
    }

    /// Like [`BoardSession::apply`], also returning the id the command minted.
    pub fn apply_returning_id(&mut self, command: &Command) -> (Outcome, Option<String>) {
        let mutation = self.engine.apply(&self.project, command);
        if mutation.is_applied() {
            self.project = mutation.project;
        }
        self.open_card = match (command, &mutation.created_id) {
            (Command::CreateBacklogCard, Some(card_id)) => self.project.card(card_id).cloned(),
            _ => reconcile(self.open_card.as_ref(), &self.project),
        };
        (mutation.outcome, mutation.created_id)
    }

    pub fn stats(&self) -> ProjectStats {
        stats::compute(&self.project)
    }

    pub fn into_parts(self) -> (Project, Option<Card>) {
        (self.project, self.open_card)
    }
}
