//! # readonly-fs
//!
//! Read-only, sandboxed filesystem queries for agents: list files by glob pattern, search
//! file contents by regex, and view a window of lines from one file. Nothing is ever
//! written, and no path outside the sandbox root is ever read or reported.
//!
//! ## Architecture
//!
//! - [`Sandbox`]: canonical root, blocked set and hidden-entry policy. Every path any
//!   component touches goes through [`Sandbox::resolve`].
//! - [`OutputBudget`]: per-call size ledger. Results are always a prefix of the full answer;
//!   when something was cut, the result says `truncated = true`.
//! - [`Globber`]: expands [`GlobPattern`]s into a deduplicated, ordered file list.
//! - [`Grepper`]: regex line search over files chosen by the globber.
//! - [`Viewer`]: line-windowed file reads.
//! - [`ReadonlyFsTools`]: the three operations above behind one object built from
//!   [`SandboxSettings`].
//!
//! ## Example
//!
//! ```no_run
//! use readonly_fs::{ReadonlyFsTools, SandboxSettings, DEFAULT_VIEW_LINE_COUNT};
//!
//! let settings = SandboxSettings::for_dir("/srv/project").with_blocked_files(["secrets.env"]);
//! let tools = ReadonlyFsTools::new(&settings)?;
//! let files = tools.glob(&["**/*.rs"]);
//! let hits = tools.grep("TODO", &["src/**/*.rs"])?;
//! let head = tools.view("README.md", 0, DEFAULT_VIEW_LINE_COUNT)?;
//! println!("{}\n{}\n{}", files, hits, head);
//! # Ok::<(), readonly_fs::FsToolError>(())
//! ```
//!
//! Logging goes through `tracing`; install a subscriber in the host binary to see it.

mod budget;
mod error;
mod glob;
mod grep;
mod output;
mod sandbox;
mod toolbox;
mod view;

pub use budget::OutputBudget;
pub use error::{FsToolError, SetupError};
pub use glob::{GlobPattern, Globber};
pub use grep::Grepper;
pub use output::{
    FileContent, FileWindow, GlobOutput, GrepOutput, ViewOutput, DEFAULT_VIEW_LINE_COUNT,
};
pub use sandbox::{ResolvedPath, Sandbox};
pub use toolbox::ReadonlyFsTools;
pub use view::Viewer;

pub use env_config::SandboxSettings;
