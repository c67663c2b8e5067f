//! Grepper: line-by-line regex search over files selected by glob patterns.
//!
//! Uses [`regex`] (finite-automaton engine, linear in input size) so untrusted patterns
//! cannot trigger catastrophic backtracking. Candidate files come from
//! [`Globber`](crate::Globber) with a file-count budget; matched lines are charged to the
//! caller's text budget. Files that cannot be read are skipped, not fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use env_config::DEFAULT_MAX_GREP_FILES;
use regex::{Regex, RegexBuilder};

use crate::budget::OutputBudget;
use crate::error::FsToolError;
use crate::glob::Globber;
use crate::output::{FileContent, FileWindow, GrepOutput};
use crate::sandbox::{ResolvedPath, Sandbox};

/// How scanning one file ended, when it did not fail.
enum ScanOutcome {
    Complete,
    BudgetExhausted,
}

/// Compiles `pattern` for single-line matching: `.` never crosses a line and `^`/`$`
/// anchor at the line's start and end.
fn compile_line_regex(pattern: &str) -> Result<Regex, FsToolError> {
    RegexBuilder::new(pattern)
        .multi_line(false)
        .dot_matches_new_line(false)
        .build()
        .map_err(|e| FsToolError::InvalidPattern(e.to_string()))
}

/// Line text without its `\n` or `\r\n` terminator.
fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// Searches file contents under a [`Sandbox`] root.
#[derive(Debug, Clone)]
pub struct Grepper {
    globber: Globber,
    max_files: usize,
}

impl Grepper {
    pub fn from_sandbox(sandbox: Arc<Sandbox>) -> Self {
        Self {
            globber: Globber::from_sandbox(sandbox),
            max_files: DEFAULT_MAX_GREP_FILES,
        }
    }

    /// Caps how many candidate files one call scans.
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Returns every line matching `pattern` in files matching `glob_patterns`.
    ///
    /// Each match is a [`FileContent`] whose `contents` is the line with its terminator and
    /// whose window is `{line_offset: zero-based line index, line_count: 1}`. A match costs its
    /// contents plus its relative path. Stops at the first refused match, or when the
    /// candidate list itself was capped, and marks the output truncated.
    ///
    /// # Errors
    ///
    /// - [`FsToolError::InvalidPattern`] if `pattern` does not compile; nothing is scanned.
    pub fn grep<S: AsRef<str>>(
        &self,
        pattern: &str,
        glob_patterns: &[S],
        budget: &mut OutputBudget,
    ) -> Result<GrepOutput, FsToolError> {
        let regex = compile_line_regex(pattern)?;

        let mut file_budget = OutputBudget::new(self.max_files);
        let (files, mut truncated) = self
            .globber
            .collect_files(glob_patterns, &mut file_budget, |_| 1);

        let mut matches = Vec::new();
        for file in &files {
            match scan_file(&regex, file, budget, &mut matches) {
                Ok(ScanOutcome::Complete) => {}
                Ok(ScanOutcome::BudgetExhausted) => {
                    truncated = true;
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        path = %file.display_relative(),
                        error = %e,
                        "grep skipped file"
                    );
                }
            }
        }

        tracing::debug!(
            files = files.len(),
            matches = matches.len(),
            truncated,
            "grep finished"
        );
        Ok(GrepOutput { matches, truncated })
    }
}

/// Streams one file, appending matching lines to `matches` while the budget allows.
fn scan_file(
    regex: &Regex,
    file: &ResolvedPath,
    budget: &mut OutputBudget,
    matches: &mut Vec<FileContent>,
) -> Result<ScanOutcome, FsToolError> {
    let handle =
        File::open(file.absolute()).map_err(|e| FsToolError::from_io(file.relative(), e))?;
    let mut reader = BufReader::new(handle);
    let path_len = file.display_relative().len();
    let mut buf = Vec::new();
    let mut index = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| FsToolError::from_io(file.relative(), e))?;
        if read == 0 {
            return Ok(ScanOutcome::Complete);
        }
        let line = String::from_utf8_lossy(&buf);
        if regex.is_match(strip_terminator(&line)) {
            if !budget.try_charge(line.len() + path_len) {
                return Ok(ScanOutcome::BudgetExhausted);
            }
            matches.push(FileContent {
                path: file.relative().to_path_buf(),
                contents: line.into_owned(),
                window: FileWindow::single_line(index),
            });
        }
        index += 1;
    }
}
