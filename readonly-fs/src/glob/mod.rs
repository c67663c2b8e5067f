//! Globber: expand glob patterns into a deduplicated, sandbox-filtered, budget-limited list
//! of files.
//!
//! Each pattern is expanded by walking the tree under its literal prefix with [`walkdir`]
//! (symlinked directories are not followed; hidden and blocked directories are pruned) and
//! matching relative paths with [`GlobPattern`]. Every candidate then goes through
//! [`Sandbox::resolve`]; rejections silently drop the candidate.
//!
//! Ordering: patterns contribute in the order given; matches of one pattern are sorted by
//! their `/`-separated relative path. A file already produced by an earlier pattern is
//! skipped (dedup key is the canonical absolute path).

mod pattern;

pub use pattern::GlobPattern;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use walkdir::WalkDir;

use crate::budget::OutputBudget;
use crate::output::GlobOutput;
use crate::sandbox::{is_hidden_name, ResolvedPath, Sandbox};

/// Expands glob patterns under a [`Sandbox`] root.
#[derive(Debug, Clone)]
pub struct Globber {
    sandbox: Arc<Sandbox>,
}

impl Globber {
    pub fn from_sandbox(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Lists files matching any of `patterns`, charging each path's text length to `budget`.
    ///
    /// No match is not an error. When the budget refuses a path, scanning stops and the
    /// output is marked truncated; already accepted paths are kept.
    pub fn glob<S: AsRef<str>>(&self, patterns: &[S], budget: &mut OutputBudget) -> GlobOutput {
        let (files, truncated) =
            self.collect_files(patterns, budget, |resolved| resolved.display_relative().len());
        tracing::debug!(
            patterns = patterns.len(),
            paths = files.len(),
            truncated,
            "glob finished"
        );
        GlobOutput {
            paths: files.into_iter().map(|r| r.relative().to_path_buf()).collect(),
            truncated,
        }
    }

    /// Shared expansion used by glob and grep. `cost` prices one accepted file.
    ///
    /// Returns the accepted files in output order and whether the budget cut the list short.
    pub(crate) fn collect_files<S, F>(
        &self,
        patterns: &[S],
        budget: &mut OutputBudget,
        cost: F,
    ) -> (Vec<ResolvedPath>, bool)
    where
        S: AsRef<str>,
        F: Fn(&ResolvedPath) -> usize,
    {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut accepted = Vec::new();

        for raw in patterns {
            let pattern = GlobPattern::new(raw.as_ref());
            for resolved in self.expand(&pattern) {
                if seen.contains(resolved.absolute()) {
                    continue;
                }
                if !budget.try_charge(cost(&resolved)) {
                    return (accepted, true);
                }
                seen.insert(resolved.absolute().to_path_buf());
                accepted.push(resolved);
            }
        }
        (accepted, false)
    }

    /// All sandbox-valid regular files matching one pattern, sorted by relative path text.
    fn expand(&self, pattern: &GlobPattern) -> Vec<ResolvedPath> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let root = self.sandbox.root();
        let (prefix, prefix_len) = pattern.literal_prefix();
        let start = root.join(&prefix);
        let allow_hidden = self.sandbox.allow_hidden();

        let mut walker = WalkDir::new(&start).follow_links(false);
        if let Some(depth) = pattern.max_depth() {
            walker = walker.max_depth(depth.saturating_sub(prefix_len));
        }

        let mut matched: Vec<(String, ResolvedPath)> = walker
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                (allow_hidden || !is_hidden_name(entry.file_name()))
                    && !self.sandbox.is_blocked(entry.path())
            })
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    tracing::debug!(
                        pattern = pattern.as_str(),
                        error = %e,
                        "skipping unreadable entry"
                    );
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() || entry.file_type().is_symlink())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(root).ok()?;
                let components: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                let components: Vec<&str> = components.iter().map(String::as_str).collect();
                if !pattern.matches_components(&components) {
                    return None;
                }
                match self.sandbox.resolve(relative) {
                    Ok(resolved) if resolved.absolute().is_file() => {
                        Some((resolved.display_relative(), resolved))
                    }
                    Ok(_) => None,
                    Err(e) => {
                        tracing::debug!(
                            pattern = pattern.as_str(),
                            candidate = %relative.display(),
                            error = %e,
                            "glob candidate rejected"
                        );
                        None
                    }
                }
            })
            .collect();

        matched.sort_by(|a, b| a.0.cmp(&b.0));
        matched.into_iter().map(|(_, resolved)| resolved).collect()
    }
}
