use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{DerivedId, ExternalId};
use crate::util::Mapper;

/// Derived identifier claimed by more than one external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub derived: DerivedId,
    pub externals: Vec<ExternalId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexRecord {
    derived: DerivedId,
    externals: Vec<ExternalId>,
}

/// Ordered map from derived identifier to the externals that produced it.
#[derive(Debug)]
pub struct IdentityIndex {
    mapper: Mapper,
    tree: BTreeMap<DerivedId, Vec<ExternalId>>,
}

impl IdentityIndex {
    pub fn new(mapper: Mapper) -> Self {
        Self {
            mapper,
            tree: BTreeMap::new(),
        }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Derives and records `external`. Returns the derived id and whether
    /// another external already claimed it.
    pub fn insert(&mut self, external: ExternalId) -> (DerivedId, bool) {
        let derived = self.mapper.derive(external.as_str());
        let claimants = self.tree.entry(derived.clone()).or_default();
        if claimants.contains(&external) {
            return (derived, claimants.len() > 1);
        }
        claimants.push(external);
        let collided = claimants.len() > 1;
        if collided {
            log::warn!("derived id {} now claimed by {} externals", derived, claimants.len());
        }
        (derived, collided)
    }

    pub fn get(&self, derived: &DerivedId) -> Option<&[ExternalId]> {
        self.tree.get(derived).map(Vec::as_slice)
    }

    pub fn collisions(&self) -> Vec<Collision> {
        self.tree
            .iter()
            .filter(|(_, externals)| externals.len() > 1)
            .map(|(derived, externals)| Collision {
                derived: derived.clone(),
                externals: externals.clone(),
            })
            .collect()
    }

    /// Number of distinct derived identifiers.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of distinct externals recorded.
    pub fn population(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }

    pub fn persist(&self, path: &Path) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for (derived, externals) in &self.tree {
            let record = IndexRecord {
                derived: derived.clone(),
                externals: externals.clone(),
            };
            writeln!(writer, "{}", serde_json::to_string(&record)?)?;
        }
        writer.flush()
    }

    /// Loads a persisted index. Entries are trusted as written; they are
    /// not re-derived with `mapper`.
    pub fn load(path: &Path, mapper: Mapper) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut tree = BTreeMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: IndexRecord = serde_json::from_str(&line)?;
            tree.insert(record.derived, record.externals);
        }

        Ok(Self { mapper, tree })
    }
}

impl Extend<ExternalId> for IdentityIndex {
    fn extend<T: IntoIterator<Item = ExternalId>>(&mut self, iter: T) {
        for external in iter {
            self.insert(external);
        }
    }
}

/// Approximate probability that `n` uniformly distributed values in a
/// `bits`-wide space contain at least one collision.
pub fn birthday_bound(n: u64, bits: u32) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let n = n as f64;
    let space = 2f64.powi(bits as i32);
    1.0 - (-(n * (n - 1.0)) / (2.0 * space)).exp()
}

/// Informative bits in one legacy checksum half after the absolute value.
pub const LEGACY_HALF_BITS: u32 = 32;
/// Informative bits in a full legacy identifier.
pub const LEGACY_PAIR_BITS: u32 = 63;
