//! Viewer: read a window of lines from one file inside the sandbox.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use crate::budget::OutputBudget;
use crate::error::FsToolError;
use crate::output::{FileContent, FileWindow, ViewOutput};
use crate::sandbox::Sandbox;

/// Reads windowed slices of files under a [`Sandbox`] root.
#[derive(Debug, Clone)]
pub struct Viewer {
    sandbox: Arc<Sandbox>,
}

impl Viewer {
    pub fn from_sandbox(sandbox: Arc<Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Returns lines `[window.line_offset, window.line_offset + window.line_count)` of `path`.
    ///
    /// The file is streamed: lines before the window are skipped without being buffered, and
    /// no line is read past what the budget can still accept. Lines keep their terminators
    /// and invalid UTF-8 is replaced. A
    /// window past the end of the file (or an empty file) yields empty contents with
    /// `line_count = 0`. Each line is charged to `budget` before it is appended; on refusal
    /// the partial window is returned with `truncated = true`.
    ///
    /// # Errors
    ///
    /// - Any [`Sandbox::resolve`] rejection (`PathEscape`, `BlockedPath`, `HiddenPathDenied`,
    ///   `NotFound`).
    /// - [`FsToolError::NotAFile`] if the path is a directory or special file.
    /// - [`FsToolError::Io`] if reading fails part way.
    pub fn view(
        &self,
        path: impl AsRef<Path>,
        window: FileWindow,
        budget: &mut OutputBudget,
    ) -> Result<ViewOutput, FsToolError> {
        let resolved = self.sandbox.resolve(path)?;
        let relative = resolved.relative();

        let metadata = std::fs::metadata(resolved.absolute())
            .map_err(|e| FsToolError::from_io(relative, e))?;
        if !metadata.is_file() {
            return Err(FsToolError::NotAFile(relative.to_path_buf()));
        }

        let handle =
            File::open(resolved.absolute()).map_err(|e| FsToolError::from_io(relative, e))?;
        let mut reader = BufReader::new(handle);

        let mut contents = String::new();
        let mut delivered = 0usize;
        let mut truncated = false;
        let mut buf = Vec::new();

        let reached = window.line_count > 0
            && skip_lines(&mut reader, window.line_offset)
                .map_err(|e| FsToolError::from_io(relative, e))?;

        while reached && delivered < window.line_count {
            buf.clear();
            // one byte past what fits, so an oversized line is refused without reading it whole
            let cap = (budget.remaining() as u64).saturating_add(1);
            let read = (&mut reader)
                .take(cap)
                .read_until(b'\n', &mut buf)
                .map_err(|e| FsToolError::from_io(relative, e))?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if !budget.try_charge(line.len()) {
                truncated = true;
                break;
            }
            contents.push_str(&line);
            delivered += 1;
        }

        tracing::debug!(
            path = %resolved.display_relative(),
            line_offset = window.line_offset,
            requested = window.line_count,
            delivered,
            truncated,
            "view finished"
        );
        Ok(ViewOutput {
            view: FileContent {
                path: relative.to_path_buf(),
                contents,
                window: FileWindow::new(window.line_offset, delivered),
            },
            truncated,
        })
    }
}

/// Advances `reader` past `count` newline-terminated lines, holding at most one buffer chunk.
/// Returns `false` if the input ends first.
fn skip_lines<R: BufRead>(reader: &mut R, count: usize) -> std::io::Result<bool> {
    let mut skipped = 0usize;
    while skipped < count {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Ok(false);
        }
        let mut used = chunk.len();
        for (i, byte) in chunk.iter().enumerate() {
            if *byte == b'\n' {
                skipped += 1;
                if skipped == count {
                    used = i + 1;
                    break;
                }
            }
        }
        reader.consume(used);
    }
    Ok(true)
}
