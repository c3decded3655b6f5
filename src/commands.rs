// src/commands.rs

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{io::Write, path::PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    aggregate,
    config::{DuplicatePolicy, IndexConfig, Language, QualifyStyle},
    modpath, table_view, tree_view, util,
};

#[derive(Parser, Debug)]
#[command(
    name = "lazymap",
    version,
    about = "Produce a symbol -> location map of all exported types under a namespace.",
    after_help = r#"Examples:
  lazymap --dir google/ads/google_ads/v2/proto --prefix google.ads.google_ads.v2.proto
  lazymap --mod google.ads.google_ads.v2.proto -s site-packages --mode tree --max-depth 2
  lazymap --dir src --language rust --mode json --jobs 8
"#
)]
pub struct Args {
    #[command(flatten)]
    pub entry: Entry,

    /// Output: dict literal, indented tree, or JSON report.
    #[arg(long, value_enum, default_value_t = Mode::Table)]
    pub mode: Mode,

    /// Dotted prefix for every location.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Name bound to the generated dict.
    #[arg(long)]
    pub identifier: Option<String>,

    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// How locations are built: parent dir only, or every dir below the root.
    #[arg(long, value_enum)]
    pub qualify: Option<QualifyStyle>,

    /// Which unit keeps a symbol exported more than once.
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatePolicy>,

    /// Keep filesystem enumeration order instead of sorting by name.
    #[arg(long)]
    pub unsorted: bool,

    /// Loader threads.
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where `--mod` is looked up. Repeatable; defaults to the current dir.
    #[arg(long = "search-path", short = 's')]
    pub search_path: Vec<PathBuf>,

    /// Tree mode: namespace levels to show.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Prepend a generated-at line.
    #[arg(long)]
    pub stamp: bool,

    /// Only log warnings and errors.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Starting point; `--dir` and `--mod` are mutually exclusive.
#[derive(clap::Args, Debug)]
#[group(multiple = false)]
pub struct Entry {
    /// Starting directory.
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,

    /// Starting module (dotted name).
    #[arg(long = "mod", short = 'm')]
    pub module: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Table,
    Tree,
    Json,
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);
    run(&args, &mut std::io::stdout().lock())
}

/// Logs go to stderr; stdout carries the rendered output.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .init();
}

/// Scan per `args` and write the selected rendering to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let cfg = resolve_config(args)?;
    let root = resolve_root(args, &cfg)?;

    let report = aggregate::scan(&root, &cfg)
        .with_context(|| format!("scanning {}", root.display()))?;

    let stamp = args.stamp.then(util::now_timestamp);
    match args.mode {
        Mode::Table => table_view::render_table(&report.mapping, &cfg.identifier, stamp.as_deref(), out)
            .context("writing table")?,
        Mode::Json => table_view::render_json(&report, &cfg.identifier, stamp.as_deref(), out)
            .context("writing json")?,
        Mode::Tree => tree_view::render_tree(&report, args.max_depth, out).context("writing tree")?,
    }
    out.flush().context("flushing output")?;
    Ok(())
}

/// Defaults, then config file, then environment, then flags.
pub fn resolve_config(args: &Args) -> Result<IndexConfig> {
    let mut cfg = match &args.config {
        Some(path) => IndexConfig::from_file(path)?,
        None => IndexConfig::default(),
    };
    cfg.apply_env();

    if let Some(lang) = args.language {
        cfg.language = lang;
    }
    if let Some(prefix) = &args.prefix {
        cfg.prefix = prefix.clone();
    }
    if let Some(id) = &args.identifier {
        cfg.identifier = id.clone();
    }
    if let Some(policy) = args.duplicates {
        cfg.duplicates = policy;
    }
    if args.unsorted {
        cfg.sort = false;
    }
    if let Some(jobs) = args.jobs {
        cfg.jobs = jobs.max(1);
    }

    // A module entry names the namespace itself: locations hang off it.
    if let Some(module) = &args.entry.module {
        if cfg.prefix.is_empty() {
            cfg.prefix = module.clone();
        }
        cfg.qualify = QualifyStyle::FullPath;
    }
    if let Some(style) = args.qualify {
        cfg.qualify = style;
    }
    Ok(cfg)
}

fn resolve_root(args: &Args, cfg: &IndexConfig) -> Result<PathBuf> {
    match (&args.entry.module, &args.entry.dir) {
        (Some(module), _) => {
            let dir = modpath::resolve_module(module, &args.search_path)?;
            if !modpath::is_package(&dir, &cfg.layout().initializers) {
                tracing::warn!(module = %module, dir = %dir.display(), "no initializer unit; treating as namespace directory");
            }
            Ok(dir)
        }
        (None, Some(dir)) => Ok(dir.clone()),
        (None, None) => Ok(PathBuf::from(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lazymap").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn dir_and_mod_are_exclusive() {
        let err = Args::try_parse_from(["lazymap", "--dir", "x", "--mod", "a.b"]);
        assert!(err.is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--dir", "x", "--prefix", "ns.v2", "--duplicates", "last-wins", "--unsorted", "-j", "0",
        ]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.prefix, "ns.v2");
        assert_eq!(cfg.duplicates, DuplicatePolicy::LastWins);
        assert!(!cfg.sort);
        assert_eq!(cfg.jobs, 1);
        assert_eq!(cfg.qualify, QualifyStyle::Parent);
    }

    #[test]
    fn module_entry_defaults_to_full_path_under_module() {
        let args = parse(&["--mod", "google.ads.v2.proto"]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.prefix, "google.ads.v2.proto");
        assert_eq!(cfg.qualify, QualifyStyle::FullPath);

        let args = parse(&["--mod", "a.b", "--qualify", "parent", "--prefix", "x"]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.prefix, "x");
        assert_eq!(cfg.qualify, QualifyStyle::Parent);
    }

    #[test]
    fn mode_values() {
        assert_eq!(parse(&["--mode", "tree"]).mode, Mode::Tree);
        assert_eq!(parse(&[]).mode, Mode::Table);
    }
}
