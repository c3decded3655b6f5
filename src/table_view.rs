// src/table_view.rs
//! Table and JSON renderings of the result mapping.

use serde::Serialize;
use std::io::{self, Write};

use crate::aggregate::{Conflict, Failure, ResultMapping, ScanReport};

/// Emit the mapping as a dict-literal assignment, ready to paste into a
/// generated module:
///
/// ```text
/// _lazy_class_to_package_map = dict(
///     Campaign='ns.v2.proto.ads.campaign',
/// )
/// ```
pub fn render_table<W: Write>(
    mapping: &ResultMapping,
    identifier: &str,
    stamp: Option<&str>,
    out: &mut W,
) -> io::Result<()> {
    if let Some(ts) = stamp {
        writeln!(out, "# Generated by lazymap at {ts}")?;
    }
    writeln!(out, "{identifier} = dict(")?;
    for (name, location) in mapping.iter() {
        writeln!(out, "    {name}='{}',", escape_single_quoted(location))?;
    }
    writeln!(out, ")")
}

#[derive(Serialize)]
struct JsonStats {
    units: usize,
    loaded: usize,
    failed: usize,
    symbols: usize,
    conflicts: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    identifier: &'a str,
    root: String,
    mapping: &'a ResultMapping,
    failures: &'a [Failure],
    conflicts: &'a [Conflict],
    stats: JsonStats,
    fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<&'a str>,
}

/// Emit the full report (mapping, failures, conflicts) as pretty JSON.
pub fn render_json<W: Write>(
    report: &ScanReport,
    identifier: &str,
    stamp: Option<&str>,
    out: &mut W,
) -> io::Result<()> {
    let doc = JsonReport {
        identifier,
        root: report.root.display().to_string(),
        mapping: &report.mapping,
        failures: &report.failures,
        conflicts: &report.conflicts,
        stats: JsonStats {
            units: report.visited,
            loaded: report.loaded,
            failed: report.failures.len(),
            symbols: report.mapping.len(),
            conflicts: report.conflicts.len(),
        },
        fingerprint: report.mapping.fingerprint(),
        generated_at: stamp,
    };
    serde_json::to_writer_pretty(&mut *out, &doc).map_err(io::Error::from)?;
    writeln!(out)
}

fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
