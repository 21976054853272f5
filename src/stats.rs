//! Derived project statistics.
//!
//! A pure fold over a project snapshot. Nothing here holds state; call
//! [`compute`] again after every mutation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Card, CardStatus, Project};

/// Working hours in one budget day
const WORKDAY_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub percentage: u32,
    pub total_points: u64,
    pub completed_points: u64,
    /// Assignee name -> number of tasks naming them
    pub assignee_distribution: BTreeMap<String, usize>,
    pub cards_total: usize,
    pub cards_by_status: BTreeMap<CardStatus, usize>,
    pub backlog: ContainerStats,
    pub sprints: Vec<SprintStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_days: Option<f64>,
}

/// Totals for one card container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStats {
    pub cards: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub percentage: u32,
    pub total_points: u64,
    pub completed_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStats {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub totals: ContainerStats,
}

impl ContainerStats {
    fn from_cards<'a>(cards: impl Iterator<Item = &'a Card>) -> Self {
        let mut stats = ContainerStats::default();
        for card in cards {
            stats.cards += 1;
            stats.total_tasks += card.tasks.len();
            stats.completed_tasks += card.completed_tasks();
            stats.total_points += card.points();
            if card.status == CardStatus::Done {
                stats.completed_points += card.points();
            }
        }
        stats.percentage = percentage(stats.completed_tasks, stats.total_tasks);
        stats
    }
}

/// Compute statistics for the whole project (backlog and all sprints).
pub fn compute(project: &Project) -> ProjectStats {
    let backlog = ContainerStats::from_cards(project.backlog.iter());
    let sprints: Vec<SprintStats> = project
        .sprints
        .iter()
        .map(|sprint| SprintStats {
            id: sprint.id.clone(),
            name: sprint.name.clone(),
            totals: ContainerStats::from_cards(sprint.cards.iter()),
        })
        .collect();

    let mut assignee_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut cards_by_status: BTreeMap<CardStatus, usize> =
        CardStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for card in project.cards() {
        *cards_by_status.entry(card.status).or_default() += 1;
        for task in &card.tasks {
            for assignee in &task.assignees {
                *assignee_distribution.entry(assignee.clone()).or_default() += 1;
            }
        }
    }

    let containers = std::iter::once(&backlog).chain(sprints.iter().map(|s| &s.totals));
    let mut total_tasks = 0;
    let mut completed_tasks = 0;
    let mut total_points = 0;
    let mut completed_points = 0;
    let mut cards_total = 0;
    for totals in containers {
        total_tasks += totals.total_tasks;
        completed_tasks += totals.completed_tasks;
        total_points += totals.total_points;
        completed_points += totals.completed_points;
        cards_total += totals.cards;
    }

    ProjectStats {
        total_tasks,
        completed_tasks,
        percentage: percentage(completed_tasks, total_tasks),
        total_points,
        completed_points,
        assignee_distribution,
        cards_total,
        cards_by_status,
        backlog,
        sprints,
        budget_days: project.total_hours.map(|hours| hours / WORKDAY_HOURS),
    }
}

/// `round(100 * done / total)` with halves rounded up; 0 when `total` is 0.
pub fn percentage(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    ((200 * done + total) / (2 * total)) as u32
}
