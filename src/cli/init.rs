//! scrumboard init command implementation
//!
//! Creates the data directory layout and a default `scrumboard.toml`.

use std::path::PathBuf;

use super::GlobalOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::storage::Storage;

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    projects_dir: bool,
    config: bool,
}

pub fn run(global: GlobalOptions) -> Result<()> {
    let storage = Storage::discover(global.data_dir.as_deref())?;
    let created_projects_dir = !storage.is_initialized();
    let created_config = storage.init()?;

    let report = InitReport {
        data_dir: storage.data_dir().to_path_buf(),
        created: InitCreated {
            projects_dir: created_projects_dir,
            config: created_config,
        },
    };

    let mut created_items = Vec::new();
    if created_projects_dir {
        created_items.push("projects/");
    }
    if created_config {
        created_items.push("scrumboard.toml");
    }

    let header = if created_items.is_empty() {
        "scrumboard init: nothing to do"
    } else {
        "scrumboard init: initialized data directory"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", storage.data_dir().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("scrumboard project import <draft.json>");

    emit_success(global.output(), "init", &report, Some(&human))
}
