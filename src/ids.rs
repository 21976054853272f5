//! Identifier minting.
//!
//! Ids look like `card-7k2m9xqd`: a kind prefix plus a suffix cut from the
//! random half of a ULID. Suffixes are retried until they are free within
//! the scope the new entity is inserted into. Project ids carry the whole
//! ULID so they never need to consult a store.

use std::collections::HashSet;

use ulid::Ulid;

const ID_SUFFIX_LEN: usize = 8;

/// Kind of entity an id is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Project,
    Sprint,
    Card,
    Task,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Project => "prj",
            IdKind::Sprint => "spr",
            IdKind::Card => "card",
            IdKind::Task => "tsk",
        }
    }
}

/// Mint a project id.
pub fn project_id() -> String {
    format!(
        "{}-{}",
        IdKind::Project.prefix(),
        Ulid::new().to_string().to_ascii_lowercase()
    )
}

/// Mint an id of `kind` that is not in `existing`.
pub fn generate_id(kind: IdKind, existing: &HashSet<&str>) -> String {
    loop {
        let candidate = mint_candidate(kind);
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
    }
}

/// Mint an id of `kind` and record it in `taken`.
///
/// Used when several entities are created in one pass and must not collide
/// with each other either.
pub fn claim_id(kind: IdKind, taken: &mut HashSet<String>) -> String {
    loop {
        let candidate = mint_candidate(kind);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
}

fn mint_candidate(kind: IdKind) -> String {
    let raw = Ulid::new().to_string().to_ascii_lowercase();
    format!("{}-{}", kind.prefix(), &raw[raw.len() - ID_SUFFIX_LEN..])
}
