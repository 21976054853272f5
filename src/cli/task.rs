//! scrumboard task command implementations.

use super::card::{apply_board_command, change_human};
use super::GlobalOptions;
use crate::engine::Command;
use crate::error::Result;
use crate::output::emit_success;

pub struct AddOptions {
    pub project: String,
    pub card: String,
    pub content: String,
    pub global: GlobalOptions,
}

pub struct TaskOptions {
    pub project: String,
    pub card: String,
    pub task: String,
    pub global: GlobalOptions,
}

pub struct AssigneeOptions {
    pub project: String,
    pub card: String,
    pub task: String,
    pub name: String,
    pub global: GlobalOptions,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let command = Command::AddTask {
        card_id: options.card,
        content: options.content,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let human = change_human("Task added", &change);
    emit_success(options.global.output(), "task add", &change, Some(&human))
}

pub fn run_rm(options: TaskOptions) -> Result<()> {
    let command = Command::DeleteTask {
        card_id: options.card,
        task_id: options.task,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let human = change_human("Task deleted", &change);
    emit_success(options.global.output(), "task rm", &change, Some(&human))
}

pub fn run_toggle(options: TaskOptions) -> Result<()> {
    let command = Command::ToggleTask {
        card_id: options.card,
        task_id: options.task,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let human = change_human("Task toggled", &change);
    emit_success(options.global.output(), "task toggle", &change, Some(&human))
}

pub fn run_assign(options: AssigneeOptions) -> Result<()> {
    let command = Command::AddAssignee {
        card_id: options.card,
        task_id: options.task,
        name: options.name,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let header = if change.changed {
        "Assignee added"
    } else {
        "Already assigned"
    };
    let human = change_human(header, &change);
    emit_success(options.global.output(), "task assign", &change, Some(&human))
}

pub fn run_unassign(options: AssigneeOptions) -> Result<()> {
    let command = Command::RemoveAssignee {
        card_id: options.card,
        task_id: options.task,
        name: options.name,
    };
    let change = apply_board_command(&options.global, &options.project, command)?;
    let human = change_human("Assignee removed", &change);
    emit_success(options.global.output(), "task unassign", &change, Some(&human))
}
