//! Read-only toolbox: one sandbox shared by glob, grep and view, with a fresh output budget
//! per call.
//!
//! This is the surface a tool transport registers. It holds no per-call state, so one
//! instance can serve concurrent callers behind `&self`.

use std::path::Path;
use std::sync::Arc;

use env_config::SandboxSettings;

use crate::budget::OutputBudget;
use crate::error::{FsToolError, SetupError};
use crate::glob::Globber;
use crate::grep::Grepper;
use crate::output::{FileWindow, GlobOutput, GrepOutput, ViewOutput};
use crate::sandbox::Sandbox;
use crate::view::Viewer;

#[derive(Debug, Clone)]
pub struct ReadonlyFsTools {
    output_limit: usize,
    globber: Globber,
    grepper: Grepper,
    viewer: Viewer,
}

impl ReadonlyFsTools {
    /// Builds the toolbox from already-loaded settings.
    ///
    /// # Errors
    ///
    /// - [`FsToolError::InvalidRoot`] if `settings.sandbox_dir` is not an existing directory.
    pub fn new(settings: &SandboxSettings) -> Result<Self, FsToolError> {
        let sandbox = Arc::new(Sandbox::from_settings(settings)?);
        tracing::debug!(
            root = %sandbox.root().display(),
            blocked = sandbox.blocked().len(),
            allow_hidden = sandbox.allow_hidden(),
            output_limit = settings.output_limit,
            max_grep_files = settings.max_grep_files,
            "readonly fs toolbox ready"
        );
        Ok(Self {
            output_limit: settings.output_limit,
            globber: Globber::from_sandbox(Arc::clone(&sandbox)),
            grepper: Grepper::from_sandbox(Arc::clone(&sandbox))
                .with_max_files(settings.max_grep_files),
            viewer: Viewer::from_sandbox(sandbox),
        })
    }

    /// Loads settings (`.env` in `override_dir` or the current dir, XDG `config.toml` for
    /// `app_name`, process env) and builds the toolbox.
    pub fn load(app_name: &str, override_dir: Option<&Path>) -> Result<Self, SetupError> {
        let settings = SandboxSettings::load(app_name, override_dir)?;
        Ok(Self::new(&settings)?)
    }

    pub fn sandbox(&self) -> &Sandbox {
        self.globber.sandbox()
    }

    pub fn output_limit(&self) -> usize {
        self.output_limit
    }

    fn budget(&self) -> OutputBudget {
        OutputBudget::new(self.output_limit)
    }

    /// Files matching any of `patterns`, relative to the sandbox root.
    pub fn glob<S: AsRef<str>>(&self, patterns: &[S]) -> GlobOutput {
        self.globber.glob(patterns, &mut self.budget())
    }

    /// Lines matching `pattern` in files selected by `glob_patterns`.
    pub fn grep<S: AsRef<str>>(
        &self,
        pattern: &str,
        glob_patterns: &[S],
    ) -> Result<GrepOutput, FsToolError> {
        self.grepper.grep(pattern, glob_patterns, &mut self.budget())
    }

    /// Lines `[line_offset, line_offset + line_count)` of `path`. Pass
    /// [`DEFAULT_VIEW_LINE_COUNT`](crate::DEFAULT_VIEW_LINE_COUNT) when the caller gave no count.
    pub fn view(
        &self,
        path: &str,
        line_offset: usize,
        line_count: usize,
    ) -> Result<ViewOutput, FsToolError> {
        self.viewer.view(
            path,
            FileWindow::new(line_offset, line_count),
            &mut self.budget(),
        )
    }
}
