//! Result types returned by glob, grep and view.
//!
//! All types are plain data: `serde` serializable, and `Display` renders them in the
//! `GlobOutput(paths=[...], truncated=false)` form a tool transport can hand to a model as-is.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sandbox::slash_path;

/// Lines returned by `view` when the caller does not say.
pub const DEFAULT_VIEW_LINE_COUNT: usize = 100;

/// Zero-based, half-open line range `[line_offset, line_offset + line_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileWindow {
    pub line_offset: usize,
    pub line_count: usize,
}

impl FileWindow {
    pub fn new(line_offset: usize, line_count: usize) -> Self {
        Self {
            line_offset,
            line_count,
        }
    }

    /// Window covering exactly line `index`.
    pub fn single_line(index: usize) -> Self {
        Self::new(index, 1)
    }
}

impl Default for FileWindow {
    fn default() -> Self {
        Self::new(0, DEFAULT_VIEW_LINE_COUNT)
    }
}

/// Text taken from one file, with the window actually delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    /// Sandbox-relative path.
    pub path: PathBuf,
    pub contents: String,
    pub window: FileWindow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobOutput {
    pub paths: Vec<PathBuf>,
    pub truncated: bool,
}

/// One entry per matching line, in file order then line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepOutput {
    pub matches: Vec<FileContent>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub view: FileContent,
    pub truncated: bool,
}

impl fmt::Display for FileWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileWindow(line_offset={}, line_count={})",
            self.line_offset, self.line_count
        )
    }
}

impl fmt::Display for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileContent(path={:?}, contents={:?}, window={})",
            slash_path(&self.path),
            self.contents,
            self.window
        )
    }
}

impl fmt::Display for GlobOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self.paths.iter().map(|p| slash_path(p)).collect();
        write!(f, "GlobOutput(paths={:?}, truncated={})", paths, self.truncated)
    }
}

impl fmt::Display for GrepOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GrepOutput(matches=[")?;
        for (i, m) in self.matches.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", m)?;
        }
        write!(f, "], truncated={})", self.truncated)
    }
}

impl fmt::Display for ViewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewOutput(view={}, truncated={})", self.view, self.truncated)
    }
}
