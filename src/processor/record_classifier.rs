use anyhow::{Result, anyhow};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::ClassifierConfig;
use crate::models::{ActivityFlag, Record, missing_fields};
use crate::storage::CatalogStore;

/// Which configured required-field list to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    Complete,
    Essential,
}

/// Why a record was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Activity flag absent (`None`) or not exactly "true"
    Inactive(Option<ActivityFlag>),
    MissingFields(Vec<String>),
    ParseError(String),
    FileError(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Inactive(Some(flag)) => write!(f, "isActive: {}", flag),
            Rejection::Inactive(None) => write!(f, "isActive: missing"),
            Rejection::MissingFields(fields) => write!(f, "Missing fields: {}", fields.join(", ")),
            Rejection::ParseError(message) => write!(f, "Could not decode JSON: {}", message),
            Rejection::FileError(message) => write!(f, "Unexpected error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// A rejected element of a JSON array, kept exactly as read
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    pub position: usize,
    pub value: Value,
    pub reason: Rejection,
}

/// Accepted and rejected records, each in input order
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub accepted: Vec<Record>,
    pub rejected: Vec<RejectedRecord>,
}

impl Partition {
    pub fn rejected_values(&self) -> Vec<Value> {
        self.rejected.iter().map(|r| r.value.clone()).collect()
    }
}

/// A file left in the source folder and the reason it stayed
#[derive(Debug, Clone)]
pub struct KeptFile {
    pub file_name: String,
    pub reason: Rejection,
}

/// Result of classifying a folder of one-record files
#[derive(Debug, Clone, Default)]
pub struct DirectoryOutcome {
    pub created_destination: bool,
    pub files_checked: usize,
    pub moved: Vec<String>,
    pub kept: Vec<KeptFile>,
    pub destination_count: usize,
}

/// Field-completeness classifier with an optional activity gate.
///
/// The gate runs first: a record whose flag is not exactly "true" is rejected
/// without looking at the other fields.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    required_fields: Vec<String>,
    activity_field: Option<String>,
}

impl RecordClassifier {
    pub fn new(required_fields: Vec<String>) -> Self {
        Self {
            required_fields,
            activity_field: None,
        }
    }

    pub fn with_activity_gate(mut self, field: impl Into<String>) -> Self {
        self.activity_field = Some(field.into());
        self
    }

    /// Classifier for one of the configured field sets, gated on the activity flag
    pub fn from_config(config: &ClassifierConfig, set: FieldSet) -> Self {
        let fields = match set {
            FieldSet::Complete => config.required_fields.clone(),
            FieldSet::Essential => config.essential_fields.clone(),
        };
        Self::new(fields).with_activity_gate(config.activity_field.clone())
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn classify(&self, record: &Record) -> Verdict {
        if let Some(field) = &self.activity_field {
            let flag = ActivityFlag::from_value(record.get(field));
            if !flag.as_ref().is_some_and(ActivityFlag::is_active) {
                return Verdict::Rejected(Rejection::Inactive(flag));
            }
        }

        let missing = missing_fields(record, &self.required_fields);
        if missing.is_empty() {
            Verdict::Accepted
        } else {
            Verdict::Rejected(Rejection::MissingFields(missing))
        }
    }

    /// Classify an arbitrary JSON value; non-objects are parse errors
    pub fn classify_value(&self, value: &Value) -> Verdict {
        match value {
            Value::Object(record) => self.classify(record),
            other => Verdict::Rejected(Rejection::ParseError(format!(
                "expected a JSON object, found {}",
                other
            ))),
        }
    }

    /// Split values into accepted records and rejected values, preserving order
    pub fn partition(&self, values: &[Value]) -> Partition {
        let mut partition = Partition::default();

        for (position, value) in values.iter().enumerate() {
            let verdict = match value {
                Value::Object(record) => match self.classify(record) {
                    Verdict::Accepted => {
                        partition.accepted.push(record.clone());
                        continue;
                    }
                    rejected => rejected,
                },
                other => self.classify_value(other),
            };
            if let Verdict::Rejected(reason) = verdict {
                partition.rejected.push(RejectedRecord {
                    position,
                    value: value.clone(),
                    reason,
                });
            }
        }

        info!(
            "Classified {} records: {} accepted, {} rejected",
            values.len(),
            partition.accepted.len(),
            partition.rejected.len()
        );
        partition
    }

    /// Read `input` as a JSON array and write the two partitions to separate files.
    /// The input file is left untouched.
    pub fn partition_file(&self, input: &Path, accepted_out: &Path, rejected_out: &Path) -> Result<Partition> {
        if !input.is_file() {
            return Err(anyhow!("Input file not found: {}", input.display()));
        }

        let values = CatalogStore::load_values(input)?;
        let partition = self.partition(&values);

        CatalogStore::save_records(accepted_out, &partition.accepted)?;
        CatalogStore::save_json(rejected_out, &partition.rejected_values())?;
        info!(
            "💾 Wrote {} accepted to {} and {} rejected to {}",
            partition.accepted.len(),
            accepted_out.display(),
            partition.rejected.len(),
            rejected_out.display()
        );

        Ok(partition)
    }

    /// Move every accepted `*.json` file from `source_dir` into `dest_dir`.
    ///
    /// Files are visited in name order and moved one at a time. A file that
    /// cannot be read or parsed stays where it is and the batch continues.
    pub fn classify_directory(&self, source_dir: &Path, dest_dir: &Path) -> Result<DirectoryOutcome> {
        if !source_dir.is_dir() {
            return Err(anyhow!("Source directory not found: {}", source_dir.display()));
        }

        let mut outcome = DirectoryOutcome {
            created_destination: CatalogStore::ensure_dir(dest_dir)?,
            ..Default::default()
        };
        if outcome.created_destination {
            info!("Created directory: {}", dest_dir.display());
        }

        let files = CatalogStore::list_json_files(source_dir)?;
        info!("Found {} product files to check", files.len());
        outcome.files_checked = files.len();

        for path in files {
            let file_name = display_name(&path);
            match self.classify_file(&path) {
                Ok(Verdict::Accepted) => match CatalogStore::move_into(&path, dest_dir) {
                    Ok(_) => {
                        info!("[MOVED] {} -> {}/", file_name, dest_dir.display());
                        outcome.moved.push(file_name);
                    }
                    Err(e) => {
                        error!("[ERROR] Could not move {}: {:#}", file_name, e);
                        outcome.kept.push(KeptFile {
                            file_name,
                            reason: Rejection::FileError(format!("{:#}", e)),
                        });
                    }
                },
                Ok(Verdict::Rejected(reason)) => {
                    info!("[KEPT] {} ({})", file_name, reason);
                    outcome.kept.push(KeptFile { file_name, reason });
                }
                Err(reason) => {
                    error!("[ERROR] {}: {}. Skipping.", file_name, reason);
                    outcome.kept.push(KeptFile { file_name, reason });
                }
            }
        }

        outcome.destination_count = CatalogStore::count_entries(dest_dir)?;
        Ok(outcome)
    }

    fn classify_file(&self, path: &Path) -> std::result::Result<Verdict, Rejection> {
        let content = std::fs::read_to_string(path).map_err(|e| Rejection::FileError(e.to_string()))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| Rejection::ParseError(e.to_string()))?;

        match self.classify_value(&value) {
            Verdict::Rejected(reason @ Rejection::ParseError(_)) => Err(reason),
            verdict => Ok(verdict),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl DirectoryOutcome {
    /// Files that stayed because required fields were missing
    pub fn incomplete(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.kept.iter().filter_map(|kept| match &kept.reason {
            Rejection::MissingFields(fields) => Some((kept.file_name.as_str(), fields.as_slice())),
            _ => None,
        })
    }

    pub fn print_report(&self, source_dir: &Path, dest_dir: &Path) {
        let rule = "=".repeat(60);
        println!("\n{}", rule);
        println!("SUMMARY:");
        println!("{}", rule);
        println!("Total files processed: {}", self.files_checked);
        println!("Complete & active products moved: {}", self.moved.len());
        println!("Incomplete/inactive products remaining: {}", self.kept.len());
        println!(
            "{} folder now contains: {} files",
            dest_dir.display(),
            self.destination_count
        );
        println!("Remaining products folder: {}/", source_dir.display());

        if !self.moved.is_empty() {
            println!("\nFiles moved to {}/ ({}):", dest_dir.display(), self.moved.len());
            for file_name in &self.moved {
                println!("  [OK] {}", file_name);
            }
        }

        if !self.kept.is_empty() {
            println!("\nFiles remaining in {}/ ({}):", source_dir.display(), self.kept.len());
            for kept in &self.kept {
                println!("  [KEPT] {} ({})", kept.file_name, kept.reason);
            }
        }

        let incomplete: Vec<_> = self.incomplete().collect();
        if !incomplete.is_empty() {
            println!("\nDetailed breakdown of incomplete products:");
            for (file_name, fields) in incomplete {
                println!("  • {}: Missing {}", file_name, fields.join(", "));
            }
        }

        if self.moved.is_empty() && self.kept.is_empty() {
            warn!("No product files found in {}", source_dir.display());
        }
    }
}
