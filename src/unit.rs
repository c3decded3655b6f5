// src/unit.rs
//! Records that flow through the pipeline: one [`CandidateUnit`] per file the
//! walker admits, one [`ExportedSymbol`] per public type found in it.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::QualifyStyle;

/// A discovered code unit. Built by the walker, read-only afterwards.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateUnit {
    pub location: PathBuf,
    /// Base name of the directory that directly contains the unit.
    pub parent_segment: String,
    /// Directory names between the root (exclusive) and the unit.
    pub namespace: Vec<String>,
    /// File name with the extension stripped.
    pub base_name: String,
    /// 1 for a file directly under the root.
    pub depth: usize,
}

impl CandidateUnit {
    /// Dotted location used as the lazy-load target for this unit's symbols.
    pub fn qualified_location(&self, prefix: &str, style: QualifyStyle) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.namespace.len() + 2);
        if !prefix.is_empty() {
            parts.push(prefix.trim_end_matches('.'));
        }
        match style {
            QualifyStyle::Parent => {
                if !self.parent_segment.is_empty() {
                    parts.push(&self.parent_segment);
                }
            }
            QualifyStyle::FullPath => parts.extend(self.namespace.iter().map(String::as_str)),
        }
        parts.push(&self.base_name);
        parts.join(".")
    }

    /// Display name used in log lines.
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.base_name.clone()
        } else {
            format!("{}.{}", self.namespace.join("."), self.base_name)
        }
    }
}

/// (symbol name, qualified location)
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ExportedSymbol {
    pub name: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(ns: &[&str], base: &str) -> CandidateUnit {
        CandidateUnit {
            location: PathBuf::from(format!("{}/{base}.py", ns.join("/"))),
            parent_segment: ns.last().copied().unwrap_or("proto").to_string(),
            namespace: ns.iter().map(|s| s.to_string()).collect(),
            base_name: base.to_string(),
            depth: ns.len() + 1,
        }
    }

    #[test]
    fn parent_style_location() {
        let u = unit(&["ads"], "campaign");
        assert_eq!(
            u.qualified_location("ns.v2.proto", QualifyStyle::Parent),
            "ns.v2.proto.ads.campaign"
        );
    }

    #[test]
    fn parent_style_uses_only_immediate_dir() {
        let u = unit(&["common", "ads"], "campaign");
        assert_eq!(u.qualified_location("p", QualifyStyle::Parent), "p.ads.campaign");
        assert_eq!(
            u.qualified_location("p", QualifyStyle::FullPath),
            "p.common.ads.campaign"
        );
    }

    #[test]
    fn empty_prefix_and_trailing_dot() {
        let u = unit(&["ads"], "campaign");
        assert_eq!(u.qualified_location("", QualifyStyle::Parent), "ads.campaign");
        assert_eq!(u.qualified_location("a.b.", QualifyStyle::Parent), "a.b.ads.campaign");
    }

    #[test]
    fn root_level_unit_full_path() {
        let u = unit(&[], "common");
        assert_eq!(u.qualified_location("pkg.proto", QualifyStyle::FullPath), "pkg.proto.common");
        assert_eq!(u.display_name(), "common");
    }
}
