// src/rust_unit.rs
//! Rust front-end (syn). Exported types are `pub` structs, enums, unions,
//! traits and type aliases at file top level.

use syn::{Item, Visibility};

use crate::{
    config::Language,
    error::{LoadError, UnitError},
    loader::{read_source, LoadResult, Reflect, UnitLoader},
    unit::CandidateUnit,
};

pub struct RustLoader;

impl UnitLoader for RustLoader {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn load(&self, unit: &CandidateUnit) -> LoadResult {
        match read_source(&unit.location).and_then(|src| parse(&src)) {
            Ok(file) => LoadResult::Loaded(Box::new(RustUnit { file })),
            Err(err) => LoadResult::Failed(err.into()),
        }
    }
}

pub fn parse(src: &str) -> Result<syn::File, LoadError> {
    syn::parse_file(src).map_err(|e| {
        let start = e.span().start();
        LoadError::Syntax {
            line: start.line,
            column: start.column + 1,
            message: e.to_string(),
        }
    })
}

pub struct RustUnit {
    file: syn::File,
}

impl Reflect for RustUnit {
    fn type_definitions(&self) -> Result<Vec<String>, UnitError> {
        let names = self
            .file
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Struct(s) if is_pub(&s.vis) => Some(s.ident.to_string()),
                Item::Enum(e) if is_pub(&e.vis) => Some(e.ident.to_string()),
                Item::Union(u) if is_pub(&u.vis) => Some(u.ident.to_string()),
                Item::Trait(t) if is_pub(&t.vis) => Some(t.ident.to_string()),
                Item::Type(t) if is_pub(&t.vis) => Some(t.ident.to_string()),
                _ => None,
            })
            .collect();
        Ok(names)
    }
}

fn is_pub(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pub_items_only() {
        let src = r#"
pub struct Campaign { pub id: u64 }
struct Hidden;
pub(crate) struct CrateOnly;
pub enum Status { Enabled, Paused }
pub trait Resource {}
pub type CampaignId = u64;
pub fn not_a_type() {}
mod inner { pub struct Deep; }
"#;
        let unit = RustUnit { file: parse(src).unwrap() };
        assert_eq!(
            unit.type_definitions().unwrap(),
            vec!["Campaign", "Status", "Resource", "CampaignId"]
        );
    }

    #[test]
    fn syntax_error_has_line() {
        let err = parse("pub struct {\n").err().unwrap();
        match err {
            LoadError::Syntax { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
