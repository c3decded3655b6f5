// src/aggregate.rs
//! Scan driver and aggregator.
//!
//! Walk -> load -> extract -> fold. Only root validation can fail the run;
//! every per-unit problem ends up in the failure log.

use rayon::prelude::*;
use serde::{ser::SerializeMap, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    config::{DuplicatePolicy, IndexConfig},
    error::{IndexError, UnitError},
    loader::{self, UnitLoader},
    scan::NamespaceWalker,
    unit::{CandidateUnit, ExportedSymbol},
};

/// Insertion-ordered symbol -> location map with unique keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `policy`. Returns the conflict if the key already existed.
    pub fn insert(&mut self, sym: ExportedSymbol, policy: DuplicatePolicy) -> Option<Conflict> {
        match self.index.get(&sym.name) {
            None => {
                self.index.insert(sym.name.clone(), self.entries.len());
                self.entries.push((sym.name, sym.location));
                None
            }
            Some(&at) => {
                let existing = &mut self.entries[at].1;
                let (kept, discarded) = match policy {
                    DuplicatePolicy::FirstWins => (existing.clone(), sym.location),
                    DuplicatePolicy::LastWins => {
                        let old = std::mem::replace(existing, sym.location);
                        (existing.clone(), old)
                    }
                };
                Some(Conflict {
                    symbol: sym.name,
                    kept,
                    discarded,
                })
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// SHA-256 over the sorted pairs; independent of traversal order.
    pub fn fingerprint(&self) -> String {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        let mut h = Sha256::new();
        for (k, v) in pairs {
            h.update(k.as_bytes());
            h.update(b"=");
            h.update(v.as_bytes());
            h.update(b"\n");
        }
        hex::encode(h.finalize())
    }
}

impl Serialize for ResultMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub symbol: String,
    pub kept: String,
    pub discarded: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub location: String,
    pub error: String,
}

/// One successfully loaded unit and the public type names it exported.
#[derive(Serialize, Clone, Debug)]
pub struct UnitSummary {
    pub unit: CandidateUnit,
    pub types: Vec<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ScanReport {
    pub root: PathBuf,
    pub mapping: ResultMapping,
    pub failures: Vec<Failure>,
    pub conflicts: Vec<Conflict>,
    pub units: Vec<UnitSummary>,
    /// Candidates handed to the loader.
    pub visited: usize,
    pub loaded: usize,
}

/// Folds per-unit outcomes in the order they are fed.
pub struct Aggregator {
    policy: DuplicatePolicy,
    mapping: ResultMapping,
    failures: Vec<Failure>,
    conflicts: Vec<Conflict>,
    units: Vec<UnitSummary>,
    visited: usize,
}

impl Aggregator {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            mapping: ResultMapping::new(),
            failures: Vec::new(),
            conflicts: Vec::new(),
            units: Vec::new(),
            visited: 0,
        }
    }

    pub fn record(&mut self, unit: CandidateUnit, outcome: Result<Vec<ExportedSymbol>, UnitError>) {
        self.visited += 1;
        let module = unit.display_name();
        match outcome {
            Ok(symbols) => {
                tracing::info!("Imported {module}");
                let types = symbols.iter().map(|s| s.name.clone()).collect();
                for sym in symbols {
                    if let Some(c) = self.mapping.insert(sym, self.policy) {
                        tracing::warn!(
                            symbol = %c.symbol,
                            kept = %c.kept,
                            discarded = %c.discarded,
                            "duplicate symbol"
                        );
                        self.conflicts.push(c);
                    }
                }
                self.units.push(UnitSummary { unit, types });
            }
            Err(err) => {
                tracing::error!(module = %module, exception = %err);
                self.failures.push(Failure {
                    location: unit.location.display().to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    /// A traversal error with no candidate attached.
    pub fn record_walk_error(&mut self, err: UnitError) {
        tracing::error!(exception = %err, "walk failed");
        let location = match &err {
            UnitError::Walk { path, .. } => path.clone(),
            _ => String::new(),
        };
        self.failures.push(Failure {
            location,
            error: err.to_string(),
        });
    }

    pub fn finish(self, root: PathBuf) -> ScanReport {
        let loaded = self.units.len();
        let report = ScanReport {
            root,
            mapping: self.mapping,
            failures: self.failures,
            conflicts: self.conflicts,
            units: self.units,
            visited: self.visited,
            loaded,
        };
        tracing::info!(
            units = report.visited,
            loaded = report.loaded,
            failed = report.failures.len(),
            symbols = report.mapping.len(),
            conflicts = report.conflicts.len(),
            fingerprint = %report.mapping.fingerprint(),
            "scan complete"
        );
        report
    }
}

/// Scan `root` with the front-end for `cfg.language`.
pub fn scan(root: &Path, cfg: &IndexConfig) -> Result<ScanReport, IndexError> {
    let loader = loader::loader_for(cfg);
    scan_using(root, cfg, loader.as_ref())
}

/// Scan with an explicit loader. The root is validated before any load.
pub fn scan_using(
    root: &Path,
    cfg: &IndexConfig,
    loader: &dyn UnitLoader,
) -> Result<ScanReport, IndexError> {
    let walker = NamespaceWalker::new(root, cfg.layout(), cfg.sort, Some(&cfg.ignore_file))?;
    let root = walker.root().to_path_buf();
    tracing::debug!(root = %root.display(), language = %loader.language(), jobs = cfg.jobs, "scanning");

    let mut agg = Aggregator::new(cfg.duplicates);
    if cfg.jobs <= 1 {
        for item in walker {
            match item {
                Ok(unit) => {
                    let outcome = loader::process(loader, &unit, cfg);
                    agg.record(unit, outcome);
                }
                Err(err) => agg.record_walk_error(err),
            }
        }
    } else {
        // Loads run in parallel; folding stays in traversal order.
        let items: Vec<_> = walker.collect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.jobs)
            .build()
            .map_err(|e| IndexError::ThreadPool(e.to_string()))?;
        let outcomes: Vec<_> = pool.install(|| {
            items
                .into_par_iter()
                .map(|item| {
                    item.map(|unit| {
                        let outcome = loader::process(loader, &unit, cfg);
                        (unit, outcome)
                    })
                })
                .collect()
        });
        for item in outcomes {
            match item {
                Ok((unit, outcome)) => agg.record(unit, outcome),
                Err(err) => agg.record_walk_error(err),
            }
        }
    }

    Ok(agg.finish(root))
}
