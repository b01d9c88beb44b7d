//! Dependency query composition.
//!
//! Each dependency descriptor becomes one common table expression named after
//! its file:
//!
//! ```text
//! WITH a AS (SELECT * FROM p1.d1.t1),
//! b AS (SELECT * FROM p2.d2.t2)
//!
//! <body>
//! ```
//!
//! Aliases are emitted in lexicographic order. Table coordinates are
//! interpolated as-is, without identifier quoting.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::descriptor::{self, StoreCheck};
use crate::error::{io_err, DescriptorError};
use crate::types::Resource;

/// Dependencies keyed by alias; iteration order is the composition order.
pub type Dependencies = BTreeMap<String, Resource>;

/// Prefix `body` with one CTE per dependency.
///
/// With no dependencies the body is returned unchanged.
pub fn compose(dependencies: &Dependencies, body: &str) -> String {
    if dependencies.is_empty() {
        return body.to_string();
    }

    let clauses: Vec<String> = dependencies
        .iter()
        .map(|(alias, resource)| format!("{alias} AS (SELECT * FROM {})", resource.table))
        .collect();

    format!("WITH {}\n\n{body}", clauses.join(",\n"))
}

/// Load every descriptor in `dir`, keyed by filename.
///
/// Sub-directories and dot-files are skipped. Filenames must be plain SQL
/// identifiers since they are used verbatim as CTE names, and must stay
/// distinct when letter case is ignored.
pub fn load_dependencies(dir: &Path) -> Result<Dependencies, DescriptorError> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    let mut deps = Dependencies::new();
    let mut folded = HashSet::new();
    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(alias) = name.to_str() else {
            return Err(DescriptorError::InvalidAlias(
                name.to_string_lossy().into_owned(),
            ));
        };
        if alias.starts_with('.') {
            continue;
        }
        if !is_identifier(alias) {
            return Err(DescriptorError::InvalidAlias(alias.to_string()));
        }
        if !folded.insert(alias.to_ascii_lowercase()) {
            return Err(DescriptorError::DuplicateAlias(alias.to_string()));
        }
        let resource = descriptor::read(&path, StoreCheck::Lenient)?;
        tracing::debug!(alias, table = %resource.table, "loaded dependency");
        deps.insert(alias.to_string(), resource);
    }
    Ok(deps)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TableRef;

    fn dep(p: &str, d: &str, t: &str) -> Resource {
        Resource::new(TableRef::new(p, d, t), "")
    }

    #[test]
    fn aliases_are_sorted_regardless_of_insertion() {
        let mut deps = Dependencies::new();
        deps.insert("b".into(), dep("p2", "d2", "t2"));
        deps.insert("a".into(), dep("p1", "d1", "t1"));
        assert_eq!(
            compose(&deps, "SELECT 1"),
            "WITH a AS (SELECT * FROM p1.d1.t1),\nb AS (SELECT * FROM p2.d2.t2)\n\nSELECT 1"
        );
    }

    #[test]
    fn no_dependencies_yields_body() {
        assert_eq!(compose(&Dependencies::new(), "SELECT 1"), "SELECT 1");
    }

    #[test]
    fn single_dependency_has_no_separator() {
        let mut deps = Dependencies::new();
        deps.insert("orders".into(), dep("acme", "sales", "orders_v3"));
        assert_eq!(
            compose(&deps, "SELECT COUNT(*) FROM orders"),
            "WITH orders AS (SELECT * FROM acme.sales.orders_v3)\n\nSELECT COUNT(*) FROM orders"
        );
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("orders"));
        assert!(is_identifier("_tmp2"));
        assert!(!is_identifier("2orders"));
        assert!(!is_identifier("orders.txt"));
        assert!(!is_identifier(""));
    }
}
