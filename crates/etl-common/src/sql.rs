//! SQL file loading.

use std::io;
use std::path::{Path, PathBuf};

/// Read a SQL file as a single statement line.
///
/// Newlines are replaced with spaces and the result is trimmed, so `--`
/// comments must not be used in query files.
pub fn read_sql_file(path: &Path) -> io::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.replace(['\r', '\n'], " ").trim().to_string())
}

/// Lists all `.sql` files in a directory, sorted by file name.
pub fn list_sql_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_sql = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if is_sql {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collapses_query_to_one_line() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("query.sql");
        fs::write(&path, "SELECT *\nFROM transactions\r\nWHERE amount > 0;\n").expect("write");
        assert_eq!(
            read_sql_file(&path).expect("read"),
            "SELECT * FROM transactions  WHERE amount > 0;"
        );
    }

    #[test]
    fn lists_only_sql_files_in_name_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.sql", "a.SQL", "notes.txt"] {
            fs::write(dir.path().join(name), "SELECT 1;").expect("write");
        }
        fs::create_dir(dir.path().join("nested.sql")).expect("mkdir");
        let names: Vec<String> = list_sql_files(dir.path())
            .expect("list")
            .iter()
            .filter_map(|path| path.file_name()?.to_str().map(String::from))
            .collect();
        assert_eq!(names, vec!["a.SQL", "b.sql"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = read_sql_file(&dir.path().join("absent.sql")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
