mod support;

use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

use support::{TestBoard, SAMPLE_DRAFT};

fn card_id_by_title(project: &Value, title: &str) -> String {
    let backlog = project["backlog"].as_array().expect("backlog");
    let sprint_cards = project["sprints"]
        .as_array()
        .expect("sprints")
        .iter()
        .flat_map(|sprint| sprint["cards"].as_array().expect("cards").iter());
    backlog
        .iter()
        .chain(sprint_cards)
        .find(|card| card["title"] == title)
        .and_then(|card| card["id"].as_str())
        .expect("card id")
        .to_string()
}

#[test]
fn import_then_show_and_list() {
    let board = TestBoard::new();
    let project_id = board.import_sample();

    let project = board.show_project(&project_id);
    assert_eq!(project["name"], "Website Relaunch");
    assert_eq!(project["totalHours"], 40.0);
    assert_eq!(project["sprints"][0]["startDate"], "2024-03-01T09:00:00Z");
    assert_eq!(project["sprints"][1]["startDate"], "2024-03-16T09:00:00Z");
    assert_eq!(project["sprints"][1]["endDate"], "2024-03-31T09:00:00Z");
    assert_eq!(project["backlog"][1]["storyPoints"], 3);

    let list = board.run_json(&["project", "list"]);
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["projects"][0]["cards"], 4);

    // Unique prefix resolves
    let prefix = &project_id[..10];
    let shown = board.show_project(prefix);
    assert_eq!(shown["id"], project_id.as_str());
}

#[test]
fn import_honours_hours_flag() {
    let board = TestBoard::new();
    let draft = board.write_file("draft.json", SAMPLE_DRAFT);
    let value = board.run_json(&[
        "project",
        "import",
        draft.to_str().unwrap(),
        "--hours",
        "160",
    ]);
    assert_eq!(value["data"]["totalHours"], 160.0);
}

#[test]
fn non_positive_hours_is_a_user_error() {
    let board = TestBoard::new();
    let draft = board.write_file("draft.json", SAMPLE_DRAFT);
    let value = board.run_json_failure(
        &["project", "import", draft.to_str().unwrap(), "--hours", "0"],
        2,
    );
    assert_eq!(value["error"]["kind"], "user_error");

    let list = board.run_json(&["project", "list"]);
    assert_eq!(list["data"]["total"], 0);
}

#[test]
fn invalid_draft_exits_with_ingestion_code() {
    let board = TestBoard::new();
    let draft = board.write_file(
        "bad.json",
        r#"{"projectName":"","backlogCards":[],"sprints":[]}"#,
    );
    let value = board.run_json_failure(&["project", "import", draft.to_str().unwrap()], 3);
    assert_eq!(value["error"]["kind"], "invalid_draft");

    let list = board.run_json(&["project", "list"]);
    assert_eq!(list["data"]["total"], 0);
}

#[test]
fn card_lifecycle_through_the_cli() {
    let board = TestBoard::new();
    let project_id = board.import_sample();

    let created = board.run_json(&["card", "new", &project_id]);
    let card_id = created["data"]["created_id"].as_str().expect("id").to_string();
    assert_eq!(created["data"]["card"]["title"], "New card");
    assert_eq!(created["data"]["card"]["storyPoints"], 1);
    assert_eq!(board.show_project(&project_id)["backlog"][0]["id"], card_id.as_str());

    let edited = board.run_json(&[
        "card",
        "edit",
        &project_id,
        &card_id,
        "--title",
        "Analytics",
        "--status",
        "in-progress",
        "--tag",
        "data",
    ]);
    assert_eq!(edited["data"]["changed"], true);
    assert_eq!(edited["data"]["card"]["title"], "Analytics");
    assert_eq!(edited["data"]["card"]["status"], "in-progress");
    assert_eq!(edited["data"]["card"]["tags"][0], "data");

    let same = board.run_json(&["card", "edit", &project_id, &card_id, "--title", "Analytics"]);
    assert_eq!(same["data"]["changed"], false);
    assert_eq!(same["data"]["outcome"], "unchanged");

    let tagged = board.run_json(&[
        "card", "edit", &project_id, &card_id, "--tag", "ops", "--tag", "data", "--tag", "ops",
    ]);
    assert_eq!(tagged["data"]["card"]["tags"], serde_json::json!(["ops", "data"]));

    let cleared = board.run_json(&["card", "edit", &project_id, &card_id, "--clear-points"]);
    assert!(cleared["data"]["card"].get("storyPoints").is_none());

    let removed = board.run_json(&["card", "rm", &project_id, &card_id]);
    assert!(removed["data"]["card"].is_null());
    board.run_json_failure(&["card", "show", &project_id, &card_id], 2);
}

#[test]
fn task_commands_update_sprint_cards() {
    let board = TestBoard::new();
    let project_id = board.import_sample();
    let card_id = card_id_by_title(&board.show_project(&project_id), "Wireframes");

    let added = board.run_json(&["task", "add", &project_id, &card_id, "Footer"]);
    let task_id = added["data"]["created_id"].as_str().expect("task id").to_string();
    assert_eq!(added["data"]["card"]["tasks"][2]["content"], "Footer");

    let toggled = board.run_json(&["task", "toggle", &project_id, &card_id, &task_id]);
    assert_eq!(toggled["data"]["card"]["tasks"][2]["completed"], true);

    let assigned = board.run_json(&["task", "assign", &project_id, &card_id, &task_id, "ana"]);
    assert_eq!(assigned["data"]["card"]["tasks"][2]["assignees"][0], "ana");
    let again = board.run_json(&["task", "assign", &project_id, &card_id, &task_id, "ana"]);
    assert_eq!(again["data"]["changed"], false);

    let stats = board.run_json(&["project", "stats", &project_id]);
    assert_eq!(stats["data"]["totalTasks"], 6);
    assert_eq!(stats["data"]["completedTasks"], 1);
    assert_eq!(stats["data"]["percentage"], 17);
    assert_eq!(stats["data"]["assigneeDistribution"]["ana"], 1);
    assert_eq!(stats["data"]["budgetDays"], 5.0);

    board.run_json(&["task", "unassign", &project_id, &card_id, &task_id, "ana"]);
    let removed = board.run_json(&["task", "rm", &project_id, &card_id, &task_id]);
    assert_eq!(removed["data"]["card"]["tasks"].as_array().unwrap().len(), 2);
}

#[test]
fn rejected_and_missing_targets_report_errors() {
    let board = TestBoard::new();
    let project_id = board.import_sample();
    let card_id = card_id_by_title(&board.show_project(&project_id), "Launch");

    let blank = board.run_json_failure(&["task", "add", &project_id, &card_id, "   "], 2);
    assert!(blank["error"]["message"]
        .as_str()
        .unwrap()
        .contains("task content cannot be empty"));

    let missing = board.run_json_failure(&["task", "toggle", &project_id, &card_id, "tsk-nope"], 2);
    assert_eq!(missing["error"]["details"]["task_id"], "tsk-nope");

    let ghost = board.run_json_failure(&["card", "rm", &project_id, "card-ghost"], 2);
    assert_eq!(ghost["error"]["details"]["card_id"], "card-ghost");

    let project = board.show_project(&project_id);
    assert_eq!(
        project["sprints"][1]["cards"][0]["tasks"].as_array().unwrap().len(),
        1
    );
}

#[test]
fn project_edit_and_rm() {
    let board = TestBoard::new();
    let project_id = board.import_sample();

    let edited = board.run_json(&["project", "edit", &project_id, "--name", "Relaunch 2"]);
    assert_eq!(edited["data"]["changed"], true);
    assert_eq!(board.show_project(&project_id)["name"], "Relaunch 2");

    board.run_json_failure(&["project", "edit", &project_id, "--name", " "], 2);
    board.run_json_failure(&["project", "edit", &project_id], 2);

    board.run_json(&["project", "rm", &project_id]);
    let list = board.run_json(&["project", "list"]);
    assert_eq!(list["data"]["total"], 0);
}

#[test]
fn config_defaults_shape_new_cards() {
    let board = TestBoard::new();
    board.write_config(
        "[cards]\ndefault_title = \"Nova tarefa\"\ndefault_story_points = 2\n\n[ingest]\nsprint_length = \"1w\"\n",
    );
    let project_id = board.import_sample();
    let project = board.show_project(&project_id);
    assert_eq!(project["sprints"][1]["startDate"], "2024-03-08T09:00:00Z");

    let created = board.run_json(&["card", "new", &project_id]);
    assert_eq!(created["data"]["card"]["title"], "Nova tarefa");
    assert_eq!(created["data"]["card"]["storyPoints"], 2);
}

#[test]
fn human_output_omits_absent_points() {
    let board = TestBoard::new();
    let project_id = board.import_sample();
    let card_id = card_id_by_title(&board.show_project(&project_id), "Launch");

    board
        .cmd()
        .args(["card", "show", &project_id, &card_id])
        .assert()
        .success()
        .stdout(contains("Title: Launch"))
        .stdout(contains("DNS cutover"))
        .stdout(contains("Points").not());
}
