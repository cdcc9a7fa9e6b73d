//! Reading the input export and writing result files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::record::{validate_records, ValidatedInput, ValidationPolicy};

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a JSON array of records and validate every element.
pub fn load_records(path: &Path, policy: &ValidationPolicy) -> Result<ValidatedInput> {
    let file = File::open(path).map_err(io_err(path))?;
    let doc: Value = serde_json::from_reader(BufReader::new(file))?;
    let input = validate_records(doc, policy)?;
    info!(
        path = %path.display(),
        total = input.total,
        valid = input.records.len(),
        invalid = input.errors.len(),
        "loaded input"
    );
    Ok(input)
}

/// Pretty-printed JSON. Parent directories are created as needed.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_err(path))?;
    info!(path = %path.display(), "saved json");
    Ok(())
}

/// One JSON object per line.
pub fn save_jsonl<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    let mut writer = create(path)?;
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n").map_err(io_err(path))?;
    }
    writer.flush().map_err(io_err(path))?;
    info!(path = %path.display(), lines = items.len(), "saved jsonl");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let file = File::create(path).map_err(io_err(path))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> ValidationPolicy {
        ValidationPolicy {
            strict: false,
            max_errors: 10,
        }
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/data.jsonl");
        save_jsonl(&[json!({"a": 1}), json!({"a": 2})], &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"a":1}"#, r#"{"a":2}"#]);
    }

    #[test]
    fn json_roundtrip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.json");
        let doc = json!([
            {"title": "Rüyada Su Görmek", "content": "<p>metin</p>", "url": "u"},
            {"title": "eksik"}
        ]);
        save_json(&doc, &path).unwrap();
        let input = load_records(&path, &policy()).unwrap();
        assert_eq!(input.total, 2);
        assert_eq!(input.records.len(), 1);
        assert_eq!(input.errors.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("none.json"), &policy()).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn invalid_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{").unwrap();
        assert!(matches!(load_records(&path, &policy()), Err(PipelineError::Json(_))));
    }
}
