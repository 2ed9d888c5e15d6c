use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::error::{IdentityError, ReconcileError};
use crate::index::IdentityIndex;
use crate::model::{AppliedPatch, DerivedId, Patch, ProfileRow, Scheme};
use crate::storage::{
    append_patches, commit_profiles, discard_staged, load_profiles, patch_log_len,
    rollback_patches, stage_profiles,
};

/// A row the planner could not derive an identifier for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub id: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: IdentityError,
}

fn serialize_reason<S: serde::Serializer>(reason: &IdentityError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Rows that would end up sharing one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub target: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcilePlan {
    pub scheme: Scheme,
    pub consistent: usize,
    pub patches: Vec<Patch>,
    pub skipped: Vec<Skipped>,
    pub conflicts: Vec<Conflict>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.patches.is_empty()
    }
}

/// The profile store loaded into memory, plus the settings used to derive
/// identifiers for it.
#[derive(Debug)]
pub struct Directory {
    config: Config,
    rows: Vec<ProfileRow>,
}

impl Directory {
    pub fn load_from_disk(config: Config) -> std::io::Result<Self> {
        let rows = load_profiles(&config.profiles_path())?;
        Ok(Self { config, rows })
    }

    /// In-memory directory; [`Directory::apply`] still writes under
    /// `config.data_dir`.
    pub fn new(config: Config, rows: Vec<ProfileRow>) -> Self {
        Self { config, rows }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    /// Collision index over every linked row under `scheme`.
    pub fn index(&self, scheme: Scheme) -> IdentityIndex {
        let mut index = IdentityIndex::new(self.config.mapper().with_scheme(scheme));
        index.extend(self.rows.iter().filter_map(|row| row.external_id.clone()));
        index
    }

    pub fn plan(&self, scheme: Scheme) -> ReconcilePlan {
        let mut plan = ReconcilePlan {
            scheme,
            ..ReconcilePlan::default()
        };

        let mut candidates: Vec<Option<Patch>> = Vec::with_capacity(self.rows.len());
        // Final id -> (row index, whether the id was derived for that row).
        let mut claims: HashMap<String, Vec<(usize, bool)>> = HashMap::new();

        for (i, row) in self.rows.iter().enumerate() {
            let derived = self.expected_id(row, scheme);
            let linked = derived.is_ok();
            let final_id = match derived {
                Err(reason) => {
                    log::warn!("row {} skipped: {}", row.id, reason);
                    plan.skipped.push(Skipped {
                        id: row.id.clone(),
                        reason,
                    });
                    candidates.push(None);
                    row.id.clone()
                }
                Ok(derived) if derived == row.id.as_str() => {
                    log::debug!("row {} consistent", row.id);
                    plan.consistent += 1;
                    candidates.push(None);
                    row.id.clone()
                }
                Ok(derived) => {
                    log::debug!("row {} -> {}", row.id, derived);
                    let target = derived.to_string();
                    candidates.push(row.external_id.clone().map(|external_id| Patch {
                        external_id,
                        from: row.id.clone(),
                        to: derived,
                        scheme,
                    }));
                    target
                }
            };
            claims.entry(final_id).or_default().push((i, linked));
        }

        let mut conflicted = vec![false; self.rows.len()];
        let mut conflicts: Vec<Conflict> = claims
            .into_iter()
            // Unlinked rows that already share an id keep it; only a derived
            // id landing on another row's id is a conflict.
            .filter(|(_, rows)| rows.len() > 1 && rows.iter().any(|&(_, linked)| linked))
            .map(|(target, rows)| {
                for &(i, _) in &rows {
                    conflicted[i] = true;
                }
                log::warn!("{} rows would share id {}", rows.len(), target);
                Conflict {
                    target,
                    rows: rows.iter().map(|&(i, _)| self.rows[i].id.clone()).collect(),
                }
            })
            .collect();
        conflicts.sort_by(|a, b| a.target.cmp(&b.target));
        plan.conflicts = conflicts;

        plan.patches = candidates
            .into_iter()
            .zip(conflicted)
            .filter_map(|(patch, conflicted)| if conflicted { None } else { patch })
            .collect();

        log::info!(
            "plan ({}): {} consistent, {} patches, {} skipped, {} conflicts",
            plan.scheme,
            plan.consistent,
            plan.patches.len(),
            plan.skipped.len(),
            plan.conflicts.len()
        );
        plan
    }

    /// Rewrites the patched rows, persists the profile file and appends the
    /// patch log as one step. Nothing is left on disk if the plan conflicts,
    /// is stale, or either write fails.
    pub fn apply(&mut self, plan: &ReconcilePlan) -> Result<Vec<AppliedPatch>, ReconcileError> {
        if !plan.conflicts.is_empty() {
            return Err(ReconcileError::Conflicts(
                plan.conflicts.iter().map(|c| c.rows.len()).sum(),
            ));
        }
        if plan.is_noop() {
            log::info!("nothing to apply");
            return Ok(Vec::new());
        }

        let mut rows = self.rows.clone();
        for patch in &plan.patches {
            let row = rows
                .iter_mut()
                .find(|row| row.id == patch.from && row.external_id.as_ref() == Some(&patch.external_id))
                .ok_or_else(|| ReconcileError::Stale(patch.from.clone()))?;
            row.id = patch.to.to_string();
        }

        let applied_at = Utc::now();
        let applied: Vec<AppliedPatch> = plan
            .patches
            .iter()
            .map(|patch| AppliedPatch {
                patch: patch.clone(),
                applied_at,
            })
            .collect();

        std::fs::create_dir_all(&self.config.data_dir)?;
        let profiles_path = self.config.profiles_path();
        let patches_path = self.config.patches_path();

        // Profiles are staged, the log is appended, then the staged file is
        // renamed into place. Any failure undoes the earlier steps.
        let staged = stage_profiles(&profiles_path, &rows)?;
        let log_len = patch_log_len(&patches_path);
        if let Err(e) = append_patches(&patches_path, &applied) {
            rollback_patches(&patches_path, log_len);
            discard_staged(&staged);
            return Err(e.into());
        }
        if let Err(e) = commit_profiles(&staged, &profiles_path) {
            rollback_patches(&patches_path, log_len);
            discard_staged(&staged);
            return Err(e.into());
        }

        self.rows = rows;
        log::info!("applied {} patches", applied.len());
        Ok(applied)
    }

    /// Identifier `row` should carry under `scheme`.
    pub fn expected_id(&self, row: &ProfileRow, scheme: Scheme) -> Result<DerivedId, IdentityError> {
        self.config
            .mapper()
            .with_scheme(scheme)
            .derive_checked(row.external_id.as_ref().map(|e| e.as_str()))
    }
}
