// src/tree_view.rs

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use crate::aggregate::{ScanReport, UnitSummary};

/// Render namespaces, units and their exported types as an indented tree.
///
/// Output format (example):
/// ```text
/// --- ads
/// ------ campaign
///           AdGroup
///           Campaign
/// --- common
///        Metric
/// ```
/// Namespace and unit lines carry `---` per level; type lines are indented
/// three spaces per level below their unit. `max_depth` caps the namespace
/// levels shown.
pub fn render_tree<W: Write>(
    report: &ScanReport,
    max_depth: Option<usize>,
    out: &mut W,
) -> io::Result<()> {
    // ---- build dir graph: dir -> {child dirs}, dir -> [unit indices] ----
    let mut units_in_dir: BTreeMap<Vec<String>, Vec<usize>> = BTreeMap::new();
    let mut children_dirs: BTreeMap<Vec<String>, BTreeSet<String>> = BTreeMap::new();
    children_dirs.entry(Vec::new()).or_default();

    for (idx, summary) in report.units.iter().enumerate() {
        let ns = &summary.unit.namespace;
        units_in_dir.entry(ns.clone()).or_default().push(idx);
        // register intermediate directories so the graph is complete
        for i in 0..ns.len() {
            children_dirs
                .entry(ns[..i].to_vec())
                .or_default()
                .insert(ns[i].clone());
            children_dirs.entry(ns[..=i].to_vec()).or_default();
        }
    }

    for idxs in units_in_dir.values_mut() {
        idxs.sort_by(|&a, &b| report.units[a].unit.base_name.cmp(&report.units[b].unit.base_name));
    }

    let graph = Graph {
        units: &report.units,
        units_in_dir: &units_in_dir,
        children_dirs: &children_dirs,
        max_depth: max_depth.unwrap_or(usize::MAX),
    };
    graph.render_dir(out, &[], 1)
}

struct Graph<'a> {
    units: &'a [UnitSummary],
    units_in_dir: &'a BTreeMap<Vec<String>, Vec<usize>>,
    children_dirs: &'a BTreeMap<Vec<String>, BTreeSet<String>>,
    max_depth: usize,
}

impl Graph<'_> {
    fn render_dir<W: Write>(&self, out: &mut W, here: &[String], depth: usize) -> io::Result<()> {
        if depth > self.max_depth {
            return Ok(());
        }
        if let Some(idxs) = self.units_in_dir.get(here) {
            for &i in idxs {
                let summary = &self.units[i];
                writeln!(out, "{} {}", "---".repeat(depth), summary.unit.base_name)?;
                for ty in &summary.types {
                    writeln!(out, "{} {}", "   ".repeat(depth + 1), ty)?;
                }
            }
        }
        if let Some(kids) = self.children_dirs.get(here) {
            for kid in kids {
                writeln!(out, "{} {}", "---".repeat(depth), kid)?;
                let mut path = here.to_vec();
                path.push(kid.clone());
                self.render_dir(out, &path, depth + 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::{ResultMapping, UnitSummary},
        unit::CandidateUnit,
    };
    use std::path::PathBuf;

    fn summary(ns: &[&str], base: &str, types: &[&str]) -> UnitSummary {
        UnitSummary {
            unit: CandidateUnit {
                location: PathBuf::from(format!("{}/{base}.py", ns.join("/"))),
                parent_segment: ns.last().copied().unwrap_or("proto").into(),
                namespace: ns.iter().map(|s| s.to_string()).collect(),
                base_name: base.into(),
                depth: ns.len() + 1,
            },
            types: types.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn report(units: Vec<UnitSummary>) -> ScanReport {
        ScanReport {
            root: PathBuf::from("proto"),
            mapping: ResultMapping::new(),
            failures: Vec::new(),
            conflicts: Vec::new(),
            loaded: units.len(),
            visited: units.len(),
            units,
        }
    }

    fn render(r: &ScanReport, max: Option<usize>) -> String {
        let mut buf = Vec::new();
        render_tree(r, max, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn nested_tree_format() {
        let r = report(vec![
            summary(&["ads"], "campaign", &["AdGroup", "Campaign"]),
            summary(&[], "common", &["Metric"]),
            summary(&["ads", "deep"], "leaf", &[]),
        ]);
        let expected = "\
--- common
       Metric
--- ads
------ campaign
          AdGroup
          Campaign
------ deep
--------- leaf
";
        assert_eq!(render(&r, None), expected);
    }

    #[test]
    fn max_depth_cuts_levels() {
        let r = report(vec![
            summary(&["ads"], "campaign", &["Campaign"]),
            summary(&["ads", "deep"], "leaf", &["Leaf"]),
        ]);
        let out = render(&r, Some(2));
        assert!(out.contains("------ campaign"));
        assert!(out.contains("------ deep"));
        assert!(!out.contains("leaf"));
    }

    #[test]
    fn empty_report_renders_nothing() {
        assert_eq!(render(&report(Vec::new()), None), "");
    }
}
