//! scrumboard - project board library
//!
//! Core of the scrumboard CLI: a project model with a backlog and sprints,
//! a copy-on-write mutation engine, derived statistics, open-card
//! synchronization and ingestion of drafted projects.
//!
//! # Core Concepts
//!
//! - **Project**: root of ownership holding backlog cards and sprints
//! - **Card**: a user story with story points, status, tags and tasks
//! - **Engine**: applies board commands, returning a new project value
//! - **BoardSession**: keeps the open card in step with the project
//! - **Draft**: model-produced project structure awaiting ingestion
//!
//! # Module Organization
//!
//! - `model`: Entities and snapshot invariants
//! - `ids`: Prefixed ULID-based identifiers
//! - `engine`: Board commands and their outcomes
//! - `stats`: Derived project statistics
//! - `view`: Open-card projection
//! - `ingest`: Draft validation and conversion
//! - `config`: Configuration loading from `scrumboard.toml`
//! - `storage`: Data directory layout and JSON I/O
//! - `lock`: File locking and atomic writes
//! - `store`: Project persistence
//! - `output`: Human and JSON output envelopes
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod ingest;
pub mod lock;
pub mod model;
pub mod output;
pub mod stats;
pub mod storage;
pub mod store;
pub mod view;

pub use error::{Error, Result};
