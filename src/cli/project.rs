//! scrumboard project command implementations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{outcome_to_result, BoardContext, GlobalOptions};
use crate::engine::Command;
use crate::error::{Error, Result};
use crate::ingest::{DraftSource, Ingestor, JsonDraftFile};
use crate::model::{Card, Project};
use crate::output::{emit_success, HumanOutput};
use crate::stats::{self, ProjectStats};
use crate::store::ProjectSummary;

pub struct ShowOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct ImportOptions {
    pub draft: PathBuf,
    pub hours: Option<f64>,
    pub start: Option<String>,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    total: usize,
    projects: Vec<ProjectSummary>,
}

#[derive(serde::Serialize)]
struct ProjectChangeOutput {
    id: String,
    changed: bool,
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = BoardContext::load(global.data_dir.as_deref())?;
    let projects = ctx.store.list()?;
    let output = ProjectListOutput {
        total: projects.len(),
        projects,
    };
    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", output.total.to_string());
    for project in &output.projects {
        human.push_detail(format!(
            "{} {} ({} sprints, {} cards)",
            project.id, project.name, project.sprints, project.cards
        ));
    }
    if output.projects.is_empty() {
        human.push_next_step("scrumboard project import <draft.json>");
    }
    emit_success(global.output(), "project list", &output, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let project = ctx.store.get(&options.id)?;

    let mut human = HumanOutput::new(format!("Project {}", project.id));
    human.push_summary("Name", project.name.clone());
    if !project.description.is_empty() {
        human.push_summary("Description", project.description.clone());
    }
    human.push_summary("Created", project.created_at.to_rfc3339());
    if let Some(hours) = project.total_hours {
        human.push_summary("Total hours", hours.to_string());
    }
    human.push_detail(format!("Backlog ({} cards)", project.backlog.len()));
    for card in &project.backlog {
        human.push_detail(card_line(card));
    }
    for sprint in &project.sprints {
        human.push_detail(format!(
            "{} ({}) {} -> {}{}",
            sprint.name,
            sprint.id,
            sprint.start_date.format("%Y-%m-%d"),
            sprint.end_date.format("%Y-%m-%d"),
            if sprint.is_completed { " [completed]" } else { "" }
        ));
        for card in &sprint.cards {
            human.push_detail(card_line(card));
        }
    }

    emit_success(options.global.output(), "project show", &project, Some(&human))
}

pub fn run_import(options: ImportOptions) -> Result<()> {
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let reference = match options.start.as_deref() {
        Some(raw) => parse_start(raw)?,
        None => Utc::now(),
    };
    if let Some(hours) = options.hours {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "--hours must be positive, got {hours}"
            )));
        }
    }
    let total_hours = options.hours.or(ctx.config.ingest.default_total_hours);

    let draft = JsonDraftFile::new(&options.draft).fetch()?;
    let ingestor = Ingestor::from_config(&ctx.config.ingest)?;
    let project = ingestor.ingest(&draft, reference, total_hours)?;
    ctx.store.save(&project)?;

    let summary = ProjectSummary::from(&project);
    let mut human = HumanOutput::new("Project imported");
    human.push_summary("ID", summary.id.clone());
    human.push_summary("Name", summary.name.clone());
    human.push_summary("Sprints", summary.sprints.to_string());
    human.push_summary("Cards", summary.cards.to_string());
    human.push_next_step(format!("scrumboard project show {}", summary.id));
    emit_success(options.global.output(), "project import", &summary, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    if options.name.is_none() && options.description.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass --name or --description".to_string(),
        ));
    }
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let engine = ctx.engine();
    let command = Command::UpdateProjectDetails {
        name: options.name,
        description: options.description,
    };
    let (id, changed) = ctx.store.update(&options.id, |project| {
        let mutation = engine.apply(project, &command);
        let changed = outcome_to_result(&mutation.outcome)?;
        *project = mutation.project;
        Ok((project.id.clone(), changed))
    })?;

    let output = ProjectChangeOutput {
        id: id.clone(),
        changed,
    };
    let mut human = HumanOutput::new(if changed {
        "Project updated"
    } else {
        "No project changes"
    });
    human.push_summary("ID", id);
    emit_success(options.global.output(), "project edit", &output, Some(&human))
}

pub fn run_stats(options: ShowOptions) -> Result<()> {
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let project = ctx.store.get(&options.id)?;
    let stats = stats::compute(&project);
    let human = stats_human(&project, &stats);
    emit_success(options.global.output(), "project stats", &stats, Some(&human))
}

pub fn run_rm(options: ShowOptions) -> Result<()> {
    let ctx = BoardContext::load(options.global.data_dir.as_deref())?;
    let id = ctx.store.delete(&options.id)?;
    let output = ProjectChangeOutput {
        id: id.clone(),
        changed: true,
    };
    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", id);
    emit_success(options.global.output(), "project rm", &output, Some(&human))
}

fn parse_start(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| Error::InvalidArgument(format!("invalid --start '{raw}': {err}")))
}

fn card_line(card: &Card) -> String {
    let mut line = format!("  {} [{}] {}", card.id, card.status, card.title);
    let mut extras = Vec::new();
    if let Some(points) = card.story_points {
        extras.push(format!("{points} pts"));
    }
    if !card.tasks.is_empty() {
        extras.push(format!("{}/{} tasks", card.completed_tasks(), card.tasks.len()));
    }
    if !extras.is_empty() {
        line.push_str(&format!(" ({})", extras.join(", ")));
    }
    line
}

fn stats_human(project: &Project, stats: &ProjectStats) -> HumanOutput {
    let mut human = HumanOutput::new(format!("Stats for {}", project.name));
    human.push_summary(
        "Tasks",
        format!(
            "{}/{} ({}%)",
            stats.completed_tasks, stats.total_tasks, stats.percentage
        ),
    );
    human.push_summary(
        "Points",
        format!("{}/{}", stats.completed_points, stats.total_points),
    );
    human.push_summary("Cards", stats.cards_total.to_string());
    if let Some(days) = stats.budget_days {
        human.push_summary("Budget", format!("{days} days"));
    }
    for (status, count) in &stats.cards_by_status {
        human.push_detail(format!("{status}: {count} cards"));
    }
    for (name, count) in &stats.assignee_distribution {
        human.push_detail(format!("{name}: {count} tasks"));
    }
    human.push_detail(format!(
        "Backlog: {}/{} tasks ({}%)",
        stats.backlog.completed_tasks, stats.backlog.total_tasks, stats.backlog.percentage
    ));
    for sprint in &stats.sprints {
        human.push_detail(format!(
            "{}: {}/{} tasks ({}%)",
            sprint.name, sprint.totals.completed_tasks, sprint.totals.total_tasks, sprint.totals.percentage
        ));
    }
    if stats.total_tasks == 0 {
        human.push_warning("no tasks yet");
    }
    human
}
