use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

use crate::models::Record;

/// Local JSON storage for record collections and one-record files
pub struct CatalogStore;

impl CatalogStore {
    /// Load a JSON array without interpreting its elements
    pub fn load_values(path: &Path) -> Result<Vec<Value>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let values: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON array", path.display()))?;
        Ok(values)
    }

    /// Load a JSON array of records; every element must be an object
    pub fn load_records(path: &Path) -> Result<Vec<Record>> {
        let values = Self::load_values(path)?;
        let records = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Object(record) => Ok(record),
                other => Err(anyhow!(
                    "Element {} of {} is not a JSON object: {}",
                    index,
                    path.display(),
                    other
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Load a single-record file
    pub fn load_record_file(path: &Path) -> Result<Record> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str::<Value>(&content)
            .with_context(|| format!("Could not decode JSON from {}", path.display()))?
        {
            Value::Object(record) => Ok(record),
            other => Err(anyhow!(
                "{} does not hold a JSON object (found {})",
                path.display(),
                json_kind(&other)
            )),
        }
    }

    /// Write any serializable value as 2-space indented JSON, unicode kept as-is
    pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn save_records(path: &Path, records: &[Record]) -> Result<()> {
        Self::save_json(path, records)?;
        info!("💾 Saved {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Create a directory (and parents); returns true when it was created
    pub fn ensure_dir(dir: &Path) -> Result<bool> {
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(false);
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        Ok(true)
    }

    /// `*.json` files directly inside `dir`, sorted by name
    pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
        Self::list_files_with_extensions(dir, &["json"])
    }

    /// Files directly inside `dir` whose extension matches one of `extensions` (case-insensitive)
    pub fn list_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(anyhow!("Directory not found: {}", dir.display()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, extensions) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Most recently modified file with the given extension
    pub fn latest_file_with_extension(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for path in Self::list_files_with_extensions(dir, &[extension])? {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .with_context(|| format!("Failed to read metadata of {}", path.display()))?;

            if latest.as_ref().is_none_or(|(newest, _)| modified >= *newest) {
                latest = Some((modified, path));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }

    /// Move a file into `dest_dir`, keeping its name
    pub fn move_into(file: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = file
            .file_name()
            .ok_or_else(|| anyhow!("Not a file path: {}", file.display()))?;
        let destination = dest_dir.join(file_name);

        match fs::rename(file, &destination) {
            Ok(()) => Ok(destination),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                warn!("Cross-device move for {}, copying instead", file.display());
                fs::copy(file, &destination)
                    .with_context(|| format!("Failed to copy {} to {}", file.display(), destination.display()))?;
                fs::remove_file(file)
                    .with_context(|| format!("Failed to remove {} after copy", file.display()))?;
                Ok(destination)
            }
            Err(e) => Err(e).with_context(|| {
                format!("Failed to move {} to {}", file.display(), destination.display())
            }),
        }
    }

    /// Number of entries in a directory
    pub fn count_entries(dir: &Path) -> Result<usize> {
        Ok(fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .count())
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
        .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
