use chrono::{TimeZone, Utc};

use scrumboard::engine::{self, Command, Engine, Missing, Outcome, Rejection};
use scrumboard::model::{Card, CardPatch, CardStatus, Project, Sprint, Task};

fn card(id: &str, task_ids: &[&str]) -> Card {
    let mut card = Card::new(id, format!("Card {id}"), "");
    card.story_points = Some(3);
    card.tasks = task_ids
        .iter()
        .map(|task_id| Task::new(*task_id, format!("Do {task_id}")))
        .collect();
    card
}

fn board() -> Project {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut project = Project::new("prj-board", "Board", start);
    project.backlog = vec![card("card-b1", &["tsk-1"]), card("card-b2", &[])];
    project.sprints = vec![
        Sprint {
            id: "spr-1".to_string(),
            name: "Sprint 1".to_string(),
            start_date: start,
            end_date: start + chrono::Duration::days(15),
            cards: vec![card("card-s1", &["tsk-1", "tsk-2"]), card("card-s2", &[])],
            is_completed: false,
        },
        Sprint {
            id: "spr-2".to_string(),
            name: "Sprint 2".to_string(),
            start_date: start + chrono::Duration::days(15),
            end_date: start + chrono::Duration::days(30),
            cards: vec![card("card-s3", &["tsk-9"])],
            is_completed: false,
        },
    ];
    project
}

fn every_command() -> Vec<Command> {
    vec![
        Command::CreateBacklogCard,
        Command::DeleteCard {
            card_id: "card-s1".to_string(),
        },
        Command::UpdateCardFields {
            card_id: "card-b1".to_string(),
            patch: CardPatch {
                title: Some("Renamed".to_string()),
                ..CardPatch::default()
            },
        },
        Command::AddTask {
            card_id: "card-s3".to_string(),
            content: "Review".to_string(),
        },
        Command::DeleteTask {
            card_id: "card-s1".to_string(),
            task_id: "tsk-2".to_string(),
        },
        Command::ToggleTask {
            card_id: "card-b1".to_string(),
            task_id: "tsk-1".to_string(),
        },
        Command::AddAssignee {
            card_id: "card-s1".to_string(),
            task_id: "tsk-1".to_string(),
            name: "ana".to_string(),
        },
        Command::RemoveAssignee {
            card_id: "card-s1".to_string(),
            task_id: "tsk-1".to_string(),
            name: "ana".to_string(),
        },
        Command::UpdateProjectDetails {
            name: Some("Board v2".to_string()),
            description: None,
        },
    ]
}

#[test]
fn input_snapshot_is_never_modified() {
    let engine = Engine::default();
    let original = board();
    for command in every_command() {
        let input = original.clone();
        let _ = engine.apply(&input, &command);
        assert_eq!(input, original, "{command:?} modified its input");
    }
}

#[test]
fn delete_removes_from_either_container_and_keeps_order() {
    let project = board();

    let from_backlog = engine::delete_card(&project, "card-b1");
    let ids: Vec<_> = from_backlog.project.cards().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["card-b2", "card-s1", "card-s2", "card-s3"]);
    assert_eq!(from_backlog.project.sprints, project.sprints);

    let from_sprint = engine::delete_card(&project, "card-s1");
    let ids: Vec<_> = from_sprint.project.cards().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["card-b1", "card-b2", "card-s2", "card-s3"]);
    assert_eq!(from_sprint.project.backlog, project.backlog);
    assert_eq!(from_sprint.project.sprints[1], project.sprints[1]);
}

#[test]
fn missing_ids_are_silent_noops() {
    let project = board();

    let mutation = engine::delete_card(&project, "card-ghost");
    assert_eq!(mutation.project, project);
    assert_eq!(
        mutation.outcome,
        Outcome::NotFound(Missing::Card {
            card_id: "card-ghost".to_string()
        })
    );

    let mutation = engine::toggle_task(&project, "card-b1", "tsk-ghost");
    assert_eq!(mutation.project, project);
    assert!(matches!(
        mutation.outcome,
        Outcome::NotFound(Missing::Task { .. })
    ));
}

#[test]
fn toggle_twice_restores_the_project() {
    let project = board();
    let once = engine::toggle_task(&project, "card-s1", "tsk-2");
    assert!(once.project.card("card-s1").unwrap().tasks[1].completed);
    let twice = engine::toggle_task(&once.project, "card-s1", "tsk-2");
    assert_eq!(twice.project, project);
}

#[test]
fn add_assignee_is_idempotent() {
    let project = board();
    let once = engine::add_assignee(&project, "card-s3", "tsk-9", "bruno");
    let twice = engine::add_assignee(&once.project, "card-s3", "tsk-9", "bruno");
    assert_eq!(twice.project, once.project);
    assert_eq!(
        once.project.card("card-s3").unwrap().tasks[0].assignees,
        vec!["bruno".to_string()]
    );
}

#[test]
fn whitespace_task_content_is_rejected() {
    let project = board();
    let mutation = engine::add_task(&project, "card-b2", "   ");
    assert_eq!(mutation.project, project);
    assert_eq!(
        mutation.outcome,
        Outcome::Rejected {
            reason: Rejection::EmptyTaskContent
        }
    );
    assert!(mutation.created_id.is_none());
}

#[test]
fn empty_assignee_is_rejected() {
    let project = board();
    let mutation = engine::add_assignee(&project, "card-b1", "tsk-1", "");
    assert_eq!(mutation.project, project);
    assert!(matches!(mutation.outcome, Outcome::Rejected { .. }));
}

#[test]
fn created_card_ids_stay_unique() {
    let engine = Engine::default();
    let mut project = board();
    for _ in 0..20 {
        project = engine.apply(&project, &Command::CreateBacklogCard).project;
    }
    assert_eq!(project.backlog.len(), 22);
    assert_eq!(project.card_ids().len(), project.card_count());
    project.validate().expect("valid after many inserts");
}

#[test]
fn update_fields_on_sprint_card_can_clear_points() {
    let project = board();
    let patch = CardPatch {
        story_points: Some(None),
        status: Some(CardStatus::Done),
        ..CardPatch::default()
    };
    let mutation = engine::update_card_fields(&project, "card-s2", &patch);
    let card = mutation.project.card("card-s2").unwrap();
    assert_eq!(card.story_points, None);
    assert_eq!(card.status, CardStatus::Done);
    assert_eq!(card.points(), 0);
}

#[test]
fn outcomes_serialize_with_tags() {
    let value = serde_json::to_value(Outcome::NotFound(Missing::Task {
        card_id: "card-1".to_string(),
        task_id: "tsk-1".to_string(),
    }))
    .unwrap();
    assert_eq!(value["outcome"], "not_found");
    assert_eq!(value["kind"], "task");

    let value = serde_json::to_value(Outcome::Rejected {
        reason: Rejection::EmptyTaskContent,
    })
    .unwrap();
    assert_eq!(value["outcome"], "rejected");
    assert_eq!(value["reason"], "empty_task_content");
}
