//! scrumboard card command implementations.
//!
//! Card and task commands run against a [`BoardSession`] with the target
//! card open, then report the reconciled open card.

use serde::Serialize;

use super::{outcome_to_result, BoardContext, GlobalOptions};
use crate::engine::{Command, Outcome};
use crate::error::{Error, Result};
use crate::model::{Card, CardPatch, CardStatus};
use crate::output::{emit_success, HumanOutput};
use crate::view::BoardSession;

pub struct NewOptions {
    pub project: String,
    pub global: GlobalOptions,
}

pub struct CardOptions {
    pub project: String,
    pub card: String,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub project: String,
    pub card: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub points: Option<u32>,
    pub clear_points: bool,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub clear_tags: bool,
    pub global: GlobalOptions,
}

/// Result of one board command
#[derive(Debug, Serialize)]
pub(super) struct BoardChange {
    pub project_id: String,
    pub changed: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
    /// Open card after reconciliation; absent once the card is gone
    pub card: Option<Card>,
}

/// Apply `command` to a project under its lock, with the command's card
/// open in a session.
pub(super) fn apply_board_command(
    global: &GlobalOptions,
    project: &str,
    command: Command,
) -> Result<BoardChange> {
    let ctx = BoardContext::load(global.data_dir.as_deref())?;
    let engine = ctx.engine();
    ctx.store.update(project, move |snapshot| {
        let mut session = BoardSession::new(snapshot.clone(), engine);
        if let Some(card_id) = command.card_id() {
            session.open(card_id);
        }
        let (outcome, created_id) = session.apply_returning_id(&command);
        let changed = outcome_to_result(&outcome)?;
        let (next, card) = session.into_parts();
        *snapshot = next;
        Ok(BoardChange {
            project_id: snapshot.id.clone(),
            changed,
            outcome,
            created_id,
            card,
        })
    })
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let change = apply_board_command(&options.global, &options.project, Command::CreateBacklogCard)?;
    let human = change_human("Card created", &change);
    emit_success(options.global.output(), "card new", &change, Some(&human))
}

pub fn run_show(options: CardOptions) -> Result<()> {
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let project = ctx.store.get(&options.project)?;
    let mut session = BoardSession::new(project, ctx.engine());
    if !session.open(&options.card) {
        return Err(Error::CardNotFound(options.card));
    }
    let card = session
        .open_card()
        .ok_or_else(|| Error::CardNotFound(options.card.clone()))?;
    let mut human = HumanOutput::new(format!("Card {}", card.id));
    push_card(&mut human, card);
    emit_success(options.global.output(), "card show", card, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let status = options
        .status
        .as_deref()
        .map(str::parse::<CardStatus>)
        .transpose()?;
    let story_points = if options.clear_points {
        Some(None)
    } else {
        options.points.map(Some)
    };
    let tags = if options.clear_tags {
        Some(Vec::new())
    } else if options.tags.is_empty() {
        None
    } else {
        Some(options.tags)
    };
    let patch = CardPatch {
        title: options.title,
        description: options.description,
        story_points,
        status,
        tags,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass at least one field flag".to_string(),
        ));
    }

    let command = Command::UpdateCardFields {
        card_id: options.card,
        patch,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let header = if change.changed {
        "Card updated"
    } else {
        "No card changes"
    };
    let human = change_human(header, &change);
    emit_success(options.global.output(), "card edit", &change, Some(&human))
}

pub fn run_rm(options: CardOptions) -> Result<()> {
    let command = Command::DeleteCard {
        card_id: options.card,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let human = change_human("Card deleted", &change);
    emit_success(options.global.output(), "card rm", &change, Some(&human))
}

pub(super) fn change_human(header: &str, change: &BoardChange) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("Project", change.project_id.clone());
    if let Some(id) = &change.created_id {
        human.push_summary("Created", id.clone());
    }
    match &change.card {
        Some(card) => push_card(&mut human, card),
        None => human.push_detail("no card open"),
    }
    human
}

fn push_card(human: &mut HumanOutput, card: &Card) {
    human.push_summary("Card", card.id.clone());
    human.push_summary("Title", card.title.clone());
    human.push_summary("Status", card.status.to_string());
    if let Some(points) = card.story_points {
        human.push_summary("Points", points.to_string());
    }
    if !card.tags.is_empty() {
        human.push_summary("Tags", card.tags.join(", "));
    }
    if !card.description.is_empty() {
        human.push_summary("Description", card.description.clone());
    }
    for task in &card.tasks {
        let mut line = format!(
            "[{}] {} {}",
            if task.completed { "x" } else { " " },
            task.id,
            task.content
        );
        if !task.assignees.is_empty() {
            let names: Vec<String> = task.assignees.iter().map(|name| format!("@{name}")).collect();
            line.push_str(&format!(" ({})", names.join(", ")));
        }
        human.push_detail(line);
    }
}
