//! The results directory: one `results_<timestamp>.json` per run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::BenchError;
use crate::record::{ScoreRecord, FILE_TIMESTAMP_FORMAT};

/// Every `.json` file in the directory, classified.
#[derive(Debug)]
pub struct ScanEntry {
    pub file_name: String,
    pub record: Result<ScoreRecord, String>,
}

/// Result of deleting a set of files.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ScoreStore {
    dir: PathBuf,
}

impl ScoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Write `record` as pretty JSON (4-space indent). Never overwrites an
    /// existing file; a numeric suffix is added instead.
    pub fn save(&self, record: &ScoreRecord, at: DateTime<Local>) -> Result<PathBuf, BenchError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| BenchError::io(format!("Create {}", self.dir.display()), e))?;
        let path = self.free_path(&at.format(FILE_TIMESTAMP_FORMAT).to_string());

        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        record.serialize(&mut ser).map_err(|source| BenchError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, buf).map_err(|e| BenchError::io(format!("Write {}", path.display()), e))?;
        tracing::info!(path = %path.display(), "Benchmark JSON results saved");
        Ok(path)
    }

    fn free_path(&self, stamp: &str) -> PathBuf {
        let first = self.dir.join(format!("results_{}.json", stamp));
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.dir.join(format!("results_{}_{}.json", stamp, n)))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }

    /// Names of the `.json` files in the directory, sorted. Missing dir is empty.
    pub fn json_files(&self) -> Result<Vec<String>, BenchError> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| BenchError::io(format!("Read {}", self.dir.display()), e))?;
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Read and classify every score file.
    pub fn scan(&self) -> Result<Vec<ScanEntry>, BenchError> {
        let mut out = Vec::new();
        for file_name in self.json_files()? {
            let path = self.dir.join(&file_name);
            let record = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
                .and_then(ScoreRecord::from_json_value);
            out.push(ScanEntry { file_name, record });
        }
        Ok(out)
    }

    /// All valid records. Creates the directory if missing; invalid files are
    /// logged and skipped.
    pub fn load_valid(&self) -> Result<Vec<ScoreRecord>, BenchError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| BenchError::io(format!("Create {}", self.dir.display()), e))?;
        Ok(self
            .scan()?
            .into_iter()
            .filter_map(|entry| match entry.record {
                Ok(rec) => Some(rec),
                Err(reason) => {
                    tracing::warn!(
                        file = %entry.file_name,
                        "Could not parse or validate benchmark file: {}",
                        reason
                    );
                    None
                }
            })
            .collect())
    }

    /// File names of unparsable or incomplete score files.
    pub fn find_invalid(&self) -> Result<Vec<String>, BenchError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|e| e.record.is_err())
            .map(|e| e.file_name)
            .collect())
    }

    pub fn delete(&self, file_names: &[String]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for name in file_names {
            match fs::remove_file(self.dir.join(name)) {
                Ok(()) => report.deleted.push(name.clone()),
                Err(e) => report.failed.push((name.clone(), e.to_string())),
            }
        }
        tracing::info!(count = report.deleted.len(), "Deleted invalid score files");
        report
    }
}
