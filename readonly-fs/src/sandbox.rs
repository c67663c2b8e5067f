//! Sandbox: the single authority on whether a path may be touched.
//!
//! Every query path is joined onto the canonical root, checked lexically for `..` escape,
//! canonicalized (resolving symlinks) and checked again, then tested against the blocked set
//! and the hidden-entry policy. Used by [`Globber`](crate::Globber),
//! [`Grepper`](crate::Grepper) and [`Viewer`](crate::Viewer).

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use env_config::SandboxSettings;

use crate::error::FsToolError;

/// Normalizes a path by resolving `.` and `..` without touching the filesystem.
///
/// Does not resolve symlinks; used only for the lexical escape check and for blocked entries
/// that do not exist yet.
fn normalize_path(path: &Path) -> PathBuf {
    let mut buf = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => buf = PathBuf::from(p.as_os_str()),
            Component::RootDir => buf.push(comp),
            Component::CurDir => {}
            Component::ParentDir => {
                buf.pop();
            }
            Component::Normal(s) => buf.push(s),
        }
    }
    buf
}

/// Entry names starting with `.` are hidden.
pub(crate) fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn has_hidden_component(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => is_hidden_name(name),
        _ => false,
    })
}

/// Renders a relative path with `/` separators on every platform.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// A path accepted by [`Sandbox::resolve`].
///
/// `absolute` is canonical and strictly under the root; `relative` is `absolute` with the root
/// stripped. The relative form is what results expose, the absolute form is what I/O uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Relative path as `/`-separated text; this is what budgets charge and results render.
    pub fn display_relative(&self) -> String {
        slash_path(&self.relative)
    }
}

/// Immutable containment policy: root, blocked set, hidden-entry rule.
///
/// Safe to share across threads (`Arc<Sandbox>`); it holds no per-call state.
#[derive(Debug)]
pub struct Sandbox {
    root: PathBuf,
    blocked: Vec<PathBuf>,
    allow_hidden: bool,
}

impl Sandbox {
    /// Creates a sandbox rooted at `root`.
    ///
    /// The root is canonicalized and must be a directory. Relative `blocked` entries are
    /// taken relative to the root; each entry is canonicalized when it exists and lexically
    /// normalized otherwise.
    ///
    /// # Errors
    ///
    /// - [`FsToolError::InvalidRoot`] if the root does not exist or is not a directory.
    pub fn new<I, P>(
        root: impl AsRef<Path>,
        blocked: I,
        allow_hidden: bool,
    ) -> Result<Self, FsToolError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let requested = root.as_ref();
        let root = requested
            .canonicalize()
            .map_err(|e| FsToolError::InvalidRoot {
                path: requested.to_path_buf(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(FsToolError::InvalidRoot {
                path: requested.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let blocked = blocked
            .into_iter()
            .map(|entry| {
                let joined = root.join(entry.as_ref());
                joined.canonicalize().unwrap_or_else(|e| {
                    tracing::warn!(
                        entry = %joined.display(),
                        error = %e,
                        "blocked entry not canonicalizable, using normalized form"
                    );
                    normalize_path(&joined)
                })
            })
            .collect();

        Ok(Self {
            root,
            blocked,
            allow_hidden,
        })
    }

    /// Builds the sandbox described by loaded settings.
    pub fn from_settings(settings: &SandboxSettings) -> Result<Self, FsToolError> {
        Self::new(
            &settings.sandbox_dir,
            &settings.blocked_files,
            settings.allow_hidden,
        )
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn allow_hidden(&self) -> bool {
        self.allow_hidden
    }

    /// Canonical (or normalized) blocked entries.
    pub fn blocked(&self) -> &[PathBuf] {
        &self.blocked
    }

    /// True if `absolute` equals or descends from a blocked entry.
    pub fn is_blocked(&self, absolute: &Path) -> bool {
        self.blocked.iter().any(|b| absolute.starts_with(b))
    }

    /// Validates `relative` against the root, the blocked set and the hidden policy.
    ///
    /// # Errors
    ///
    /// - [`FsToolError::PathEscape`] if the path leaves the root lexically (`..`) or after
    ///   symlink resolution.
    /// - [`FsToolError::NotFound`] if the path (or an ancestor) cannot be resolved.
    /// - [`FsToolError::BlockedPath`] if the canonical path is blocked.
    /// - [`FsToolError::HiddenPathDenied`] if a component of the requested or the canonical
    ///   path is hidden and hidden entries are not allowed.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<ResolvedPath, FsToolError> {
        let requested = relative.as_ref();
        let joined = self.root.join(requested);

        let lexical = normalize_path(&joined);
        let Ok(lexical_relative) = lexical.strip_prefix(&self.root) else {
            return Err(FsToolError::PathEscape(requested.to_path_buf()));
        };

        let absolute = joined.canonicalize().map_err(|e| {
            tracing::trace!(path = %requested.display(), error = %e, "canonicalize failed");
            FsToolError::NotFound(requested.to_path_buf())
        })?;
        let Ok(canonical_relative) = absolute.strip_prefix(&self.root) else {
            return Err(FsToolError::PathEscape(requested.to_path_buf()));
        };

        if self.is_blocked(&absolute) {
            return Err(FsToolError::BlockedPath(requested.to_path_buf()));
        }
        if !self.allow_hidden
            && (has_hidden_component(lexical_relative) || has_hidden_component(canonical_relative))
        {
            return Err(FsToolError::HiddenPathDenied(requested.to_path_buf()));
        }

        let relative = canonical_relative.to_path_buf();
        Ok(ResolvedPath { absolute, relative })
    }
}
