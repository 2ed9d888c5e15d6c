use tabled::Tabled;

use crate::db::{Conflict, Skipped};
use crate::index::Collision;
use crate::model::{DerivedId, Patch, Scheme};
use crate::util::is_legacy_shaped;

#[derive(Tabled)]
pub struct DerivedRow {
    pub input: String,
    pub scheme: Scheme,
    pub derived: DerivedId,
}

#[derive(Tabled)]
pub struct CheckRow {
    pub id: String,
    pub legacy_shaped: bool,
}

impl CheckRow {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            legacy_shaped: is_legacy_shaped(id),
        }
    }
}

#[derive(Tabled)]
pub struct PatchRow {
    pub external_id: String,
    pub from: String,
    pub to: DerivedId,
}

impl From<&Patch> for PatchRow {
    fn from(patch: &Patch) -> Self {
        Self {
            external_id: patch.external_id.to_string(),
            from: patch.from.clone(),
            to: patch.to.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct CollisionRow {
    pub derived: DerivedId,
    pub externals: String,
}

impl From<&Collision> for CollisionRow {
    fn from(collision: &Collision) -> Self {
        Self {
            derived: collision.derived.clone(),
            externals: collision
                .externals
                .iter()
                .map(|e| format!("{:?}", e.as_str()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
pub struct ConflictRow {
    pub target: String,
    pub rows: String,
}

impl From<&Conflict> for ConflictRow {
    fn from(conflict: &Conflict) -> Self {
        Self {
            target: conflict.target.clone(),
            rows: conflict.rows.join(", "),
        }
    }
}

#[derive(Tabled)]
pub struct SkippedRow {
    pub id: String,
    pub reason: String,
}

impl From<&Skipped> for SkippedRow {
    fn from(skipped: &Skipped) -> Self {
        Self {
            id: skipped.id.clone(),
            reason: skipped.reason.to_string(),
        }
    }
}
