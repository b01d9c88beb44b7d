//! Default working-directory layout of a build step.
//!
//! ```text
//! <root>/
//!   in/session      credentials + project
//!   in/query        query body (transform)
//!   in/tables/      one descriptor per dependency (transform)
//!   in/table        descriptor to check (gate)
//!   in/projectid    \
//!   in/datasetid     > coordinates to adopt (lift)
//!   in/tableid      /
//!   out/table       produced descriptor
//! ```

use std::path::{Path, PathBuf};

pub fn input_dir(root: &Path) -> PathBuf {
    root.join("in")
}

pub fn output_dir(root: &Path) -> PathBuf {
    root.join("out")
}

pub fn session_path(root: &Path) -> PathBuf {
    input_dir(root).join("session")
}

pub fn query_path(root: &Path) -> PathBuf {
    input_dir(root).join("query")
}

pub fn tables_dir(root: &Path) -> PathBuf {
    input_dir(root).join("tables")
}

pub fn input_table_path(root: &Path) -> PathBuf {
    input_dir(root).join("table")
}

pub fn project_id_path(root: &Path) -> PathBuf {
    input_dir(root).join("projectid")
}

pub fn dataset_id_path(root: &Path) -> PathBuf {
    input_dir(root).join("datasetid")
}

pub fn table_id_path(root: &Path) -> PathBuf {
    input_dir(root).join("tableid")
}

pub fn output_table_path(root: &Path) -> PathBuf {
    output_dir(root).join("table")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_root() {
        let root = Path::new("/work");
        assert_eq!(session_path(root), PathBuf::from("/work/in/session"));
        assert_eq!(tables_dir(root), PathBuf::from("/work/in/tables"));
        assert_eq!(output_table_path(root), PathBuf::from("/work/out/table"));
    }
}
