// src/loader.rs
//! Unit loading and symbol extraction.
//!
//! Loading a unit means reading it and parsing it with the language
//! front-end; nothing in the unit is executed. The parsed handle lives only
//! for the extraction step in [`process`] and is dropped before the next unit
//! is touched, so one bad unit cannot leak state into the next load.

use memchr::memchr;
use std::{fs, path::Path};

use crate::{
    config::{IndexConfig, Language},
    error::{LoadError, UnitError},
    python::PythonLoader,
    rust_unit::RustLoader,
    unit::{CandidateUnit, ExportedSymbol},
};

const BINARY_SNIFF_BYTES: usize = 4096;

/// A loaded unit that can enumerate its top-level type definitions.
pub trait Reflect {
    /// Names of top-level type definitions in source order, before any
    /// visibility filtering by name.
    fn type_definitions(&self) -> Result<Vec<String>, UnitError>;
}

pub enum LoadResult {
    Loaded(Box<dyn Reflect>),
    Failed(UnitError),
}

/// Language front-end. Implementations hold no per-unit state.
pub trait UnitLoader: Send + Sync {
    fn language(&self) -> Language;
    fn load(&self, unit: &CandidateUnit) -> LoadResult;
}

/// Pick the front-end for the configured language.
pub fn loader_for(cfg: &IndexConfig) -> Box<dyn UnitLoader> {
    match cfg.language {
        Language::Python => Box::new(PythonLoader::new(cfg.type_factories.clone())),
        Language::Rust => Box::new(RustLoader),
    }
}

/// Read a unit's source. Rejects binary files and non-UTF-8 content.
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path)?;
    let head = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if memchr(0, head).is_some() {
        return Err(LoadError::Binary);
    }
    Ok(String::from_utf8(bytes)?)
}

/// Public type names of a loaded unit turned into symbol records.
///
/// Names carrying the private marker are dropped; the rest are sorted and
/// de-duplicated so a unit's contribution does not depend on declaration order.
pub fn extract(
    unit: &CandidateUnit,
    loaded: &dyn Reflect,
    cfg: &IndexConfig,
) -> Result<Vec<ExportedSymbol>, UnitError> {
    let mut names: Vec<String> = loaded
        .type_definitions()?
        .into_iter()
        .filter(|n| !is_private(n, &cfg.private_marker))
        .collect();
    names.sort();
    names.dedup();

    let location = unit.qualified_location(&cfg.prefix, cfg.qualify);
    Ok(names
        .into_iter()
        .map(|name| ExportedSymbol {
            name,
            location: location.clone(),
        })
        .collect())
}

/// Load one unit and extract its symbols. The handle does not outlive the call.
pub fn process(
    loader: &dyn UnitLoader,
    unit: &CandidateUnit,
    cfg: &IndexConfig,
) -> Result<Vec<ExportedSymbol>, UnitError> {
    match loader.load(unit) {
        LoadResult::Loaded(handle) => extract(unit, handle.as_ref(), cfg),
        LoadResult::Failed(err) => Err(err),
    }
}

fn is_private(name: &str, marker: &str) -> bool {
    !marker.is_empty() && name.starts_with(marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Fixed(Vec<&'static str>);

    impl Reflect for Fixed {
        fn type_definitions(&self) -> Result<Vec<String>, UnitError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn campaign() -> CandidateUnit {
        CandidateUnit {
            location: PathBuf::from("proto/ads/campaign.py"),
            parent_segment: "ads".into(),
            namespace: vec!["ads".into()],
            base_name: "campaign".into(),
            depth: 2,
        }
    }

    #[test]
    fn extract_filters_sorts_and_qualifies() {
        let cfg = IndexConfig {
            prefix: "ns.v2.proto".into(),
            ..IndexConfig::default()
        };
        let loaded = Fixed(vec!["Campaign", "_Hidden", "AdGroup", "Campaign"]);
        let out = extract(&campaign(), &loaded, &cfg).unwrap();
        let pairs: Vec<_> = out.iter().map(|s| (s.name.as_str(), s.location.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("AdGroup", "ns.v2.proto.ads.campaign"),
                ("Campaign", "ns.v2.proto.ads.campaign"),
            ]
        );
    }

    #[test]
    fn empty_marker_keeps_everything() {
        let cfg = IndexConfig {
            private_marker: String::new(),
            ..IndexConfig::default()
        };
        let out = extract(&campaign(), &Fixed(vec!["_Hidden"]), &cfg).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn binary_source_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("blob.py");
        fs::write(&p, b"class A:\x00 pass").unwrap();
        assert!(matches!(read_source(&p), Err(LoadError::Binary)));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("latin.py");
        fs::write(&p, b"name = '\xe9'\n").unwrap();
        assert!(matches!(read_source(&p), Err(LoadError::Encoding(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_source(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
