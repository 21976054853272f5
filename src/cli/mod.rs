//! Command-line interface for scrumboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::engine::{Engine, Missing, Outcome, Rejection};
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::storage::Storage;
use crate::store::ProjectStore;

mod card;
mod init;
mod project;
mod task;

/// scrumboard - project boards from whiteboard photos
///
/// Import a drafted project, then manage its backlog and sprint cards,
/// their checklists and assignees from the command line.
#[derive(Parser, Debug)]
#[command(name = "scrumboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "SCRUMBOARD_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and a default config
    Init,

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Card operations (backlog and sprint cards)
    #[command(subcommand)]
    Card(CardCommands),

    /// Checklist task operations on a card
    #[command(subcommand)]
    Task(TaskCommands),
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List stored projects, newest first
    List,

    /// Show a project's backlog and sprints
    Show {
        /// Project id or unique prefix
        id: String,
    },

    /// Create a project from a draft JSON file
    Import {
        /// Draft produced by the image-to-draft model
        draft: PathBuf,

        /// Total hour budget (defaults to ingest.default_total_hours)
        #[arg(long)]
        hours: Option<f64>,

        /// Start of the first sprint, RFC 3339 (defaults to now)
        #[arg(long)]
        start: Option<String>,
    },

    /// Edit project name or description
    Edit {
        /// Project id or unique prefix
        id: String,

        /// New project name
        #[arg(long)]
        name: Option<String>,

        /// New project description
        #[arg(long)]
        description: Option<String>,
    },

    /// Show derived statistics
    Stats {
        /// Project id or unique prefix
        id: String,
    },

    /// Delete a project
    Rm {
        /// Project id or unique prefix
        id: String,
    },
}

/// Card subcommands
#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// Add a card at the top of the backlog
    New {
        /// Project id or unique prefix
        project: String,
    },

    /// Show a card
    Show {
        /// Project id or unique prefix
        project: String,

        /// Card id
        card: String,
    },

    /// Edit card fields
    Edit {
        /// Project id or unique prefix
        project: String,

        /// Card id
        card: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Story points estimate
        #[arg(long, conflicts_with = "clear_points")]
        points: Option<u32>,

        /// Remove the story points estimate
        #[arg(long)]
        clear_points: bool,

        /// Status: todo, in-progress, done
        #[arg(long)]
        status: Option<String>,

        /// Replace tags (repeatable)
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
    },

    /// Delete a card from the backlog or its sprint
    Rm {
        /// Project id or unique prefix
        project: String,

        /// Card id
        card: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Append a task to a card's checklist
    Add {
        project: String,
        card: String,
        /// Task text
        content: String,
    },

    /// Delete a task
    Rm {
        project: String,
        card: String,
        task: String,
    },

    /// Flip a task between open and completed
    Toggle {
        project: String,
        card: String,
        task: String,
    },

    /// Assign someone to a task
    Assign {
        project: String,
        card: String,
        task: String,
        name: String,
    },

    /// Remove an assignee from a task
    Unassign {
        project: String,
        card: String,
        task: String,
        name: String,
    },
}

/// Flags shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            data_dir: self.data_dir,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Init => init::run(global),
            Commands::Project(cmd) => match cmd {
                ProjectCommands::List => project::run_list(global),
                ProjectCommands::Show { id } => project::run_show(project::ShowOptions { id, global }),
                ProjectCommands::Import { draft, hours, start } => {
                    project::run_import(project::ImportOptions {
                        draft,
                        hours,
                        start,
                        global,
                    })
                }
                ProjectCommands::Edit {
                    id,
                    name,
                    description,
                } => project::run_edit(project::EditOptions {
                    id,
                    name,
                    description,
                    global,
                }),
                ProjectCommands::Stats { id } => {
                    project::run_stats(project::ShowOptions { id, global })
                }
                ProjectCommands::Rm { id } => project::run_rm(project::ShowOptions { id, global }),
            },
            Commands::Card(cmd) => match cmd {
                CardCommands::New { project } => card::run_new(card::NewOptions { project, global }),
                CardCommands::Show { project, card } => card::run_show(card::CardOptions {
                    project,
                    card,
                    global,
                }),
                CardCommands::Edit {
                    project,
                    card,
                    title,
                    description,
                    points,
                    clear_points,
                    status,
                    tags,
                    clear_tags,
                } => card::run_edit(card::EditOptions {
                    project,
                    card,
                    title,
                    description,
                    points,
                    clear_points,
                    status,
                    tags,
                    clear_tags,
                    global,
                }),
                CardCommands::Rm { project, card } => card::run_rm(card::CardOptions {
                    project,
                    card,
                    global,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    project,
                    card,
                    content,
                } => task::run_add(task::AddOptions {
                    project,
                    card,
                    content,
                    global,
                }),
                TaskCommands::Rm {
                    project,
                    card,
                    task,
                } => task::run_rm(task::TaskOptions {
                    project,
                    card,
                    task,
                    global,
                }),
                TaskCommands::Toggle {
                    project,
                    card,
                    task,
                } => task::run_toggle(task::TaskOptions {
                    project,
                    card,
                    task,
                    global,
                }),
                TaskCommands::Assign {
                    project,
                    card,
                    task,
                    name,
                } => task::run_assign(task::AssigneeOptions {
                    project,
                    card,
                    task,
                    name,
                    global,
                }),
                TaskCommands::Unassign {
                    project,
                    card,
                    task,
                    name,
                } => task::run_unassign(task::AssigneeOptions {
                    project,
                    card,
                    task,
                    name,
                    global,
                }),
            },
        }
    }
}

/// Store and configuration for one invocation
struct BoardContext {
    store: ProjectStore,
    config: Config,
}

impl BoardContext {
    fn load(data_dir: Option<&Path>) -> Result<Self> {
        let storage = Storage::discover(data_dir)?;
        let config = storage.load_config()?;
        Ok(Self {
            store: ProjectStore::new(storage),
            config,
        })
    }

    fn engine(&self) -> Engine {
        Engine::new(self.config.cards.clone())
    }
}

/// Turn an engine outcome into "did it change", or the error explaining
/// why nothing could be done.
///
/// A duplicate assignee counts as an unchanged success so that assigning
/// stays idempotent.
fn outcome_to_result(outcome: &Outcome) -> Result<bool> {
    match outcome {
        Outcome::Applied => Ok(true),
        Outcome::Unchanged
        | Outcome::Rejected {
            reason: Rejection::DuplicateAssignee,
        } => Ok(false),
        Outcome::Rejected { reason } => Err(Error::Rejected(reason.describe().to_string())),
        Outcome::NotFound(Missing::Card { card_id }) => Err(Error::CardNotFound(card_id.clone())),
        Outcome::NotFound(Missing::Task { card_id, task_id }) => Err(Error::TaskNotFound {
            card_id: card_id.clone(),
            task_id: task_id.clone(),
        }),
        Outcome::NotFound(Missing::Assignee { task_id, name }) => Err(Error::InvalidArgument(
            format!("{name} is not assigned to task {task_id}"),
        )),
    }
}
