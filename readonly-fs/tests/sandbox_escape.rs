//! Containment tests across all three operations.
//!
//! Scenarios: every `..` path that leaves the root is `PathEscape` from resolve and view,
//! and the same text used as a glob/grep pattern yields nothing; absolute paths outside the
//! root are refused; a symlinked directory pointing outside is neither walked nor viewable.


use std::fs;
use std::path::Path;

use readonly_fs::{FsToolError, ReadonlyFsTools, SandboxSettings};

const ESCAPES: &[&str] = &[
    "../outside.txt",
    "../../outside.txt",
    "root/../../outside.txt",
    "./../outside.txt",
    "a/b/../../../outside.txt",
    "..",
];

fn layout() -> (tempfile::TempDir, std::path::PathBuf) {
    let outer = tempfile::tempdir().unwrap();
    fs::write(outer.path().join("outside.txt"), "needle outside\n").unwrap();
    let root = outer.path().join("root");
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::write(root.join("inside.txt"), "needle inside\n").unwrap();
    (outer, root)
}

fn tools(root: &Path) -> ReadonlyFsTools {
    ReadonlyFsTools::new(&SandboxSettings::for_dir(root)).unwrap()
}

/// Scenario: each escaping path fails resolve and view with `PathEscape`.
#[test]
fn dot_dot_paths_are_path_escape() {
    let (_outer, root) = layout();
    let t = tools(&root);
    for p in ESCAPES {
        assert!(
            matches!(t.sandbox().resolve(p), Err(FsToolError::PathEscape(_))),
            "resolve({p}) should escape"
        );
        assert!(
            matches!(t.view(p, 0, 10), Err(FsToolError::PathEscape(_))),
            "view({p}) should escape"
        );
    }
}

/// Scenario: the same paths used as patterns never list or grep outside content.
#[test]
fn dot_dot_patterns_return_nothing() {
    let (_outer, root) = layout();
    let t = tools(&root);
    for p in ESCAPES {
        let listed = t.glob(&[*p]);
        assert!(listed.paths.is_empty(), "glob({p}) listed {:?}", listed.paths);
        let hits = t.grep("needle", &[*p]).unwrap();
        assert!(hits.matches.is_empty(), "grep({p}) found {:?}", hits.matches);
    }
}

/// Scenario: absolute paths outside the root are refused.
#[test]
fn absolute_outside_is_refused() {
    let (outer, root) = layout();
    let t = tools(&root);
    let target = outer.path().join("outside.txt");
    let target = target.to_string_lossy();
    assert!(matches!(
        t.view(&target, 0, 10),
        Err(FsToolError::PathEscape(_))
    ));
}

/// Scenario: a symlinked directory pointing outside is not walked and not viewable.
#[cfg(unix)]
#[test]
fn symlinked_directory_outside_root() {
    let (outer, root) = layout();
    let elsewhere = outer.path().join("elsewhere");
    fs::create_dir(&elsewhere).unwrap();
    fs::write(elsewhere.join("data.txt"), "needle elsewhere\n").unwrap();
    std::os::unix::fs::symlink(&elsewhere, root.join("linked")).unwrap();

    let t = tools(&root);
    assert!(t.glob(&["**/*.txt"]).paths.iter().all(|p| !p.starts_with("linked")));
    assert!(t.glob(&["linked/*.txt"]).paths.is_empty());
    let hits = t.grep("needle", &["**/*", "linked/*"]).unwrap();
    assert_eq!(hits.matches.len(), 1);
    assert!(matches!(
        t.view("linked/data.txt", 0, 10),
        Err(FsToolError::PathEscape(_))
    ));
}
