//! Construction-time settings for a read-only filesystem sandbox.
//!
//! Resolution order for every field: process environment (after [`crate::load_and_apply`]
//! has merged `.env` and the XDG `[env]` table), then the XDG `[sandbox]` table, then
//! [`SandboxSettings::default`].

use std::path::{Path, PathBuf};

use crate::{xdg_toml, LoadError};

/// Default per-call output budget, in UTF-8 bytes of rendered result text.
pub const DEFAULT_OUTPUT_LIMIT: usize = 10_000;
/// Default cap on the number of files a single grep call scans.
pub const DEFAULT_MAX_GREP_FILES: usize = 10_000;

pub const ENV_SANDBOX_DIR: &str = "READONLY_FS_SANDBOX_DIR";
/// Comma separated list of paths.
pub const ENV_BLOCKED_FILES: &str = "READONLY_FS_BLOCKED_FILES";
pub const ENV_ALLOW_HIDDEN: &str = "READONLY_FS_ALLOW_HIDDEN";
pub const ENV_OUTPUT_LIMIT: &str = "READONLY_FS_OUTPUT_LIMIT";
pub const ENV_MAX_GREP_FILES: &str = "READONLY_FS_MAX_GREP_FILES";

/// `[sandbox]` table of `config.toml`. Every field is optional.
#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SandboxTable {
    pub(crate) sandbox_dir: Option<PathBuf>,
    pub(crate) blocked_files: Option<Vec<PathBuf>>,
    pub(crate) allow_hidden: Option<bool>,
    pub(crate) output_limit: Option<usize>,
    pub(crate) max_grep_files: Option<usize>,
}

/// Everything needed to build a sandboxed toolbox, consumed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSettings {
    /// Root directory every query is confined to.
    pub sandbox_dir: PathBuf,
    /// Paths excluded even when inside the root. Relative entries are relative to the root.
    pub blocked_files: Vec<PathBuf>,
    /// Whether entries whose name starts with `.` may be listed or read.
    pub allow_hidden: bool,
    /// Per-call output budget.
    pub output_limit: usize,
    /// Per-call cap on files scanned by grep.
    pub max_grep_files: usize,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            sandbox_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            blocked_files: Vec::new(),
            allow_hidden: false,
            output_limit: DEFAULT_OUTPUT_LIMIT,
            max_grep_files: DEFAULT_MAX_GREP_FILES,
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> LoadError {
    LoadError::Invalid {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, LoadError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(key, format!("expected a boolean, got '{}'", other))),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, LoadError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| invalid(key, format!("'{}': {}", raw.trim(), e)))
}

fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl SandboxSettings {
    /// Settings rooted at `sandbox_dir` with every other field at its default.
    pub fn for_dir(sandbox_dir: impl AsRef<Path>) -> Self {
        Self {
            sandbox_dir: sandbox_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_blocked_files<I, P>(mut self, blocked: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.blocked_files = blocked
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        self
    }

    pub fn with_allow_hidden(mut self, allow_hidden: bool) -> Self {
        self.allow_hidden = allow_hidden;
        self
    }

    pub fn with_output_limit(mut self, output_limit: usize) -> Self {
        self.output_limit = output_limit;
        self
    }

    pub fn with_max_grep_files(mut self, max_grep_files: usize) -> Self {
        self.max_grep_files = max_grep_files;
        self
    }

    /// Loads settings for `app_name`: applies `.env` and the XDG `[env]` table to the process
    /// environment, then layers env over the XDG `[sandbox]` table over defaults.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] from reading the sources, or [`LoadError::Invalid`] when a value does
    /// not parse or fails [`SandboxSettings::validate`].
    pub fn load(app_name: &str, override_dir: Option<&Path>) -> Result<Self, LoadError> {
        crate::load_and_apply(app_name, override_dir)?;
        let file = xdg_toml::load_config_file(app_name)?;

        let mut settings = Self::default();
        if let Some(table) = file.sandbox {
            settings.apply_table(table);
        }
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        tracing::debug!(
            sandbox_dir = %settings.sandbox_dir.display(),
            blocked = settings.blocked_files.len(),
            allow_hidden = settings.allow_hidden,
            output_limit = settings.output_limit,
            "sandbox settings loaded"
        );
        Ok(settings)
    }

    pub(crate) fn apply_table(&mut self, table: SandboxTable) {
        if let Some(dir) = table.sandbox_dir {
            self.sandbox_dir = dir;
        }
        if let Some(blocked) = table.blocked_files {
            self.blocked_files = blocked;
        }
        if let Some(allow_hidden) = table.allow_hidden {
            self.allow_hidden = allow_hidden;
        }
        if let Some(limit) = table.output_limit {
            self.output_limit = limit;
        }
        if let Some(max) = table.max_grep_files {
            self.max_grep_files = max;
        }
    }

    /// Overrides fields from `lookup` (normally the process environment) using the
    /// `READONLY_FS_*` keys. Keys that `lookup` does not know are left untouched.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SANDBOX_DIR).filter(|s| !s.trim().is_empty()) {
            self.sandbox_dir = PathBuf::from(dir.trim());
        }
        if let Some(raw) = lookup(ENV_BLOCKED_FILES) {
            self.blocked_files = parse_path_list(&raw);
        }
        if let Some(raw) = lookup(ENV_ALLOW_HIDDEN) {
            self.allow_hidden = parse_bool(ENV_ALLOW_HIDDEN, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OUTPUT_LIMIT) {
            self.output_limit = parse_count(ENV_OUTPUT_LIMIT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_GREP_FILES) {
            self.max_grep_files = parse_count(ENV_MAX_GREP_FILES, &raw)?;
        }
        Ok(())
    }

    /// Limits must be positive.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.output_limit == 0 {
            return Err(invalid(ENV_OUTPUT_LIMIT, "must be positive"));
        }
        if self.max_grep_files == 0 {
            return Err(invalid(ENV_MAX_GREP_FILES, "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = SandboxSettings::default();
        assert!(s.blocked_files.is_empty());
        assert!(!s.allow_hidden);
        assert_eq!(s.output_limit, 10_000);
        assert_eq!(s.max_grep_files, DEFAULT_MAX_GREP_FILES);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn env_overrides_every_field() {
        let mut s = SandboxSettings::for_dir("/tmp/original");
        s.apply_overrides(lookup_from(&[
            (ENV_SANDBOX_DIR, "/srv/repo"),
            (ENV_BLOCKED_FILES, "secrets.env, keys/id_rsa ,,"),
            (ENV_ALLOW_HIDDEN, "Yes"),
            (ENV_OUTPUT_LIMIT, " 512 "),
            (ENV_MAX_GREP_FILES, "3"),
        ]))
        .unwrap();

        assert_eq!(s.sandbox_dir, PathBuf::from("/srv/repo"));
        assert_eq!(
            s.blocked_files,
            vec![PathBuf::from("secrets.env"), PathBuf::from("keys/id_rsa")]
        );
        assert!(s.allow_hidden);
        assert_eq!(s.output_limit, 512);
        assert_eq!(s.max_grep_files, 3);
    }

    #[test]
    fn missing_keys_leave_fields_untouched() {
        let mut s = SandboxSettings::for_dir("/srv/repo").with_output_limit(77);
        s.apply_overrides(lookup_from(&[])).unwrap();
        assert_eq!(s.sandbox_dir, PathBuf::from("/srv/repo"));
        assert_eq!(s.output_limit, 77);
    }

    #[test]
    fn blank_sandbox_dir_is_ignored() {
        let mut s = SandboxSettings::for_dir("/srv/repo");
        s.apply_overrides(lookup_from(&[(ENV_SANDBOX_DIR, "  ")]))
            .unwrap();
        assert_eq!(s.sandbox_dir, PathBuf::from("/srv/repo"));
    }

    #[test]
    fn bad_boolean_is_invalid() {
        let mut s = SandboxSettings::default();
        let err = s
            .apply_overrides(lookup_from(&[(ENV_ALLOW_HIDDEN, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid { ref key, .. } if key == ENV_ALLOW_HIDDEN));
    }

    #[test]
    fn bad_limit_is_invalid() {
        let mut s = SandboxSettings::default();
        let err = s
            .apply_overrides(lookup_from(&[(ENV_OUTPUT_LIMIT, "-5")]))
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid { ref key, .. } if key == ENV_OUTPUT_LIMIT));
    }

    #[test]
    fn zero_limits_fail_validation() {
        let s = SandboxSettings::default().with_output_limit(0);
        assert!(matches!(s.validate(), Err(LoadError::Invalid { .. })));
        let s = SandboxSettings::default().with_max_grep_files(0);
        assert!(matches!(s.validate(), Err(LoadError::Invalid { .. })));
    }

    #[test]
    fn table_then_env_precedence() {
        let mut s = SandboxSettings::for_dir("/default");
        s.apply_table(SandboxTable {
            sandbox_dir: Some(PathBuf::from("/from/table")),
            blocked_files: Some(vec![PathBuf::from("a.txt")]),
            allow_hidden: Some(true),
            output_limit: Some(100),
            max_grep_files: None,
        });
        s.apply_overrides(lookup_from(&[(ENV_OUTPUT_LIMIT, "200")]))
            .unwrap();

        assert_eq!(s.sandbox_dir, PathBuf::from("/from/table"));
        assert_eq!(s.blocked_files, vec![PathBuf::from("a.txt")]);
        assert!(s.allow_hidden);
        assert_eq!(s.output_limit, 200);
        assert_eq!(s.max_grep_files, DEFAULT_MAX_GREP_FILES);
    }

    #[test]
    fn builder_methods_set_fields() {
        let s = SandboxSettings::for_dir("/srv")
            .with_blocked_files(["x", "y/z"])
            .with_allow_hidden(true)
            .with_output_limit(9)
            .with_max_grep_files(4);
        assert_eq!(s.blocked_files, vec![PathBuf::from("x"), PathBuf::from("y/z")]);
        assert!(s.allow_hidden);
        assert_eq!(s.output_limit, 9);
        assert_eq!(s.max_grep_files, 4);
    }
}
