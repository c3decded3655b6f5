// src/lib.rs
//! Build a symbol -> location index over a directory hierarchy of code units.
//!
//! The walker ([`scan`]) yields candidate units, a language front-end
//! ([`python`], [`rust_unit`]) parses each one and lists its public top-level
//! types, and the aggregator ([`aggregate`]) folds them into an ordered map
//! that the views render as a dict literal, JSON, or a tree.
//!
//! Units are parsed, never executed: indexing an untrusted tree runs none of
//! its code. A unit that fails to parse is logged and skipped; only an
//! invalid root fails a scan.
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod util;

pub mod unit;
pub mod scan;
pub mod loader;
pub mod python;
pub mod rust_unit;
pub mod aggregate;
pub mod modpath;

pub mod table_view;
pub mod tree_view;

pub mod commands;
