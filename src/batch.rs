//! Parsing many Sea files on a pool of worker threads.
//!
//! Workers pull paths from a shared channel, each owning its own
//! [`SeaParser`], and report back to the calling thread with
//! [`ParseMessage`]s.

use crate::config::SeaConfig;
use crate::ignore::collect_files;
use crate::parse::{Diagnostic, SeaParser};
use crate::{Error, ParseMessage, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tree_sitter::Language;

/// Outcome of parsing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// S-expression of the tree, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sexp: Option<String>,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Outcome of a whole batch, sorted by path
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    /// Files that could not be read, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.len()).sum()
    }

    pub fn files_with_errors(&self) -> usize {
        self.files.iter().filter(|f| !f.is_clean()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.files.iter().all(FileReport::is_clean)
    }
}

/// Expand the given paths into the Sea files to parse.
///
/// Paths naming a file are kept whatever their extension; directories are
/// walked and filtered by the configured extensions and excludes. A path that
/// is neither is kept too, so parsing reports it as unreadable.
pub fn discover(paths: &[PathBuf], config: &SeaConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                collect_files(path, Some(&config.exclude))
                    .into_iter()
                    .filter(|p| config.is_sea_file(p)),
            );
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Parse `files` with `language`, calling `on_message` for every result as
/// it arrives.
pub fn parse_files(
    files: Vec<PathBuf>,
    language: &Language,
    config: &SeaConfig,
    keep_sexp: bool,
    mut on_message: impl FnMut(&ParseMessage),
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    if files.is_empty() {
        return Ok(report);
    }

    let workers = config.worker_count().clamp(1, files.len());
    tracing::debug!("Parsing {} files on {} workers", files.len(), workers);

    let (job_tx, job_rx) = crossbeam::channel::unbounded::<PathBuf>();
    let (msg_tx, msg_rx) = crossbeam::channel::unbounded::<ParseMessage>();
    for file in files {
        // The receiver is alive until the scope below ends.
        job_tx.send(file).ok();
    }
    drop(job_tx);

    crossbeam::thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let msg_tx = msg_tx.clone();
            s.spawn(move |_| {
                let mut parser = match SeaParser::with_language(language.clone()) {
                    Ok(parser) => parser,
                    Err(e) => {
                        for path in job_rx.iter() {
                            msg_tx.send(ParseMessage::Error(path.display().to_string(), e.to_string())).ok();
                        }
                        return;
                    }
                };
                for path in job_rx.iter() {
                    let msg = match parse_one(&mut parser, &path, keep_sexp) {
                        Ok(file_report) => ParseMessage::Parsed(file_report),
                        Err(e) => ParseMessage::Error(path.display().to_string(), e.to_string()),
                    };
                    msg_tx.send(msg).ok();
                }
            });
        }
        drop(msg_tx);

        for msg in msg_rx.iter() {
            on_message(&msg);
            match msg {
                ParseMessage::Parsed(file_report) => report.files.push(file_report),
                ParseMessage::Error(path, e) => {
                    tracing::warn!("Failed to parse {}: {}", path, e);
                    report.failures.push((PathBuf::from(path), e));
                }
            }
        }
    })
    .map_err(|_| Error::Parse("a parse worker panicked".to_string()))?;

    report.files.sort_by(|a, b| a.path.cmp(&b.path));
    report.failures.sort();
    Ok(report)
}

fn parse_one(parser: &mut SeaParser, path: &Path, keep_sexp: bool) -> Result<FileReport> {
    let source = std::fs::read_to_string(path)?;
    let bytes = source.len();
    let parsed = parser.parse(source)?;
    Ok(FileReport {
        path: path.to_path_buf(),
        bytes,
        diagnostics: parsed.diagnostics(),
        sexp: keep_sexp.then(|| parsed.to_sexp()),
    })
}
