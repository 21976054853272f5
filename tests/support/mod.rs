#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use scrumboard::ingest::{DraftCard, DraftProject, DraftSprint};
use serde_json::Value;
use tempfile::TempDir;

/// Sample draft as the image-to-draft model would return it
pub const SAMPLE_DRAFT: &str = r#"{
  "projectName": "Website Relaunch",
  "projectDescription": "Rebuild the marketing site",
  "backlogCards": [
    {
      "title": "Collect references",
      "description": "Gather sites we like",
      "storyPoints": 2,
      "tags": ["research"],
      "tasks": ["List competitors", "Screenshot layouts"]
    },
    {
      "title": "Pick a CMS",
      "description": "",
      "storyPoints": "3",
      "tasks": []
    }
  ],
  "sprints": [
    {
      "name": "Sprint 1",
      "cards": [
        {
          "title": "Wireframes",
          "description": "Home and pricing",
          "storyPoints": 5,
          "tasks": ["Home page", "Pricing page"]
        }
      ]
    },
    {
      "name": "Sprint 2",
      "cards": [
        {
          "title": "Launch",
          "description": "Ship it",
          "tasks": ["DNS cutover"]
        }
      ]
    }
  ]
}"#;

/// Scratch data directory driving the binary through `--data-dir`
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("scrumboard").expect("binary");
        cmd.env_remove("SCRUMBOARD_DIR")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Run with `--json`, assert success and return the envelope.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }

    /// Run with `--json`, assert failure with `code` and return the envelope.
    pub fn run_json_failure(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json error envelope")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.data_dir().join("scrumboard.toml");
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(&path, contents).expect("write config");
        path
    }

    /// Import the sample draft with a fixed start; returns the project id.
    pub fn import_sample(&self) -> String {
        let draft = self.write_file("draft.json", SAMPLE_DRAFT);
        let draft = draft.to_string_lossy().to_string();
        let value = self.run_json(&[
            "project",
            "import",
            &draft,
            "--start",
            "2024-03-01T09:00:00Z",
        ]);
        value["data"]["id"].as_str().expect("project id").to_string()
    }

    pub fn show_project(&self, project_id: &str) -> Value {
        self.run_json(&["project", "show", project_id])["data"].clone()
    }
}

pub fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn draft_card(title: &str, points: Option<u32>, tasks: &[&str]) -> DraftCard {
    DraftCard {
        title: title.to_string(),
        description: String::new(),
        story_points: points,
        tags: None,
        tasks: tasks.iter().map(|task| task.to_string()).collect(),
    }
}

pub fn draft(backlog: Vec<DraftCard>, sprints: Vec<(&str, Vec<DraftCard>)>) -> DraftProject {
    DraftProject {
        project_name: "Draft".to_string(),
        project_description: "From a whiteboard".to_string(),
        backlog_cards: backlog,
        sprints: sprints
            .into_iter()
            .map(|(name, cards)| DraftSprint {
                name: name.to_string(),
                cards,
            })
            .collect(),
    }
}
