//! Lexical path normalization for deterministic suppression matching.
//!
//! Suppressed paths are map keys, not filesystem handles, and the files they
//! name may no longer exist. Everything here is therefore pure string work:
//! no `canonicalize`, no filesystem access.

/// Normalize path separators to `/`.
///
/// # Examples
///
/// ```
/// use quell_path::normalize_slashes;
///
/// assert_eq!(normalize_slashes(r"foo\bar\baz.rs"), "foo/bar/baz.rs");
/// assert_eq!(normalize_slashes("already/fine"), "already/fine");
/// ```
#[must_use]
pub fn normalize_slashes(path: &str) -> String {
    if path.contains('\\') {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Fold `.` and `..` components textually and collapse repeated separators.
///
/// `..` components that would climb above the root of an absolute path are
/// dropped; a leading `/` is preserved.
///
/// # Examples
///
/// ```
/// use quell_path::lexical_normalize;
///
/// assert_eq!(lexical_normalize("/a/./b/../c"), "/a/c");
/// assert_eq!(lexical_normalize("a//b/../c"), "a/c");
/// assert_eq!(lexical_normalize("/../x"), "/x");
/// ```
#[must_use]
pub fn lexical_normalize(path: &str) -> String {
    let normalized = normalize_slashes(path);
    let absolute = normalized.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in normalized.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if absolute {
                    parts.pop();
                } else if parts.last().is_none_or(|last| *last == "..") {
                    // relative path escaping its base is kept verbatim;
                    // an accumulated `..` must not absorb another one
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Resolve `path` against `base` and normalize the result.
///
/// Absolute paths ignore `base` entirely.
///
/// # Examples
///
/// ```
/// use quell_path::resolve;
///
/// assert_eq!(resolve("/repo", "src/lib.rs"), "/repo/src/lib.rs");
/// assert_eq!(resolve("/repo", "../other/a.rs"), "/other/a.rs");
/// assert_eq!(resolve("/repo", "/abs/a.rs"), "/abs/a.rs");
/// ```
#[must_use]
pub fn resolve(base: &str, path: &str) -> String {
    let normalized = normalize_slashes(path);
    if normalized.starts_with('/') {
        lexical_normalize(&normalized)
    } else {
        lexical_normalize(&format!("{base}/{normalized}"))
    }
}

/// Strip `base` from `path` when `path` lies under it.
///
/// Returns `None` when `path` is outside `base`; `base` itself is not
/// considered "under".
///
/// # Examples
///
/// ```
/// use quell_path::relative_to;
///
/// assert_eq!(relative_to("/repo/src/lib.rs", "/repo"), Some("src/lib.rs".to_string()));
/// assert_eq!(relative_to("/elsewhere/lib.rs", "/repo"), None);
/// ```
#[must_use]
pub fn relative_to(path: &str, base: &str) -> Option<String> {
    let rest = path.strip_prefix(base)?;
    let rest = if base.ends_with('/') {
        rest
    } else {
        rest.strip_prefix('/')?
    };
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_slashes_replaces_backslash() {
        assert_eq!(normalize_slashes(r"foo\bar\baz.rs"), "foo/bar/baz.rs");
    }

    #[test]
    fn lexical_normalize_folds_dot_components() {
        assert_eq!(lexical_normalize("./src/./lib.rs"), "src/lib.rs");
    }

    #[test]
    fn lexical_normalize_folds_parent_components() {
        assert_eq!(lexical_normalize("/repo/sub/../src/lib.rs"), "/repo/src/lib.rs");
    }

    #[test]
    fn lexical_normalize_clamps_at_absolute_root() {
        assert_eq!(lexical_normalize("/../../x"), "/x");
    }

    #[test]
    fn lexical_normalize_keeps_leading_parent_on_relative() {
        assert_eq!(lexical_normalize("../src/lib.rs"), "../src/lib.rs");
    }

    #[test]
    fn lexical_normalize_stacks_consecutive_leading_parents() {
        assert_eq!(lexical_normalize("../../x"), "../../x");
        assert_eq!(lexical_normalize("../../../x"), "../../../x");
        assert_eq!(lexical_normalize("a/../../x"), "../x");
    }

    #[test]
    fn resolve_joins_relative_against_base() {
        assert_eq!(resolve("/repo/conf", "../src/a.rs"), "/repo/src/a.rs");
    }

    #[test]
    fn resolve_ignores_base_for_absolute() {
        assert_eq!(resolve("/repo", "/other/a.rs"), "/other/a.rs");
    }

    #[test]
    fn relative_to_requires_separator_boundary() {
        // "/repo2" must not count as being under "/repo"
        assert_eq!(relative_to("/repo2/lib.rs", "/repo"), None);
    }

    proptest! {
        #[test]
        fn lexical_normalize_idempotent(path in "\\PC*") {
            let once = lexical_normalize(&path);
            let twice = lexical_normalize(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn lexical_normalize_no_dot_components(path in "\\PC*") {
            let normalized = lexical_normalize(&path);
            prop_assert!(!normalized.split('/').any(|p| p == "."));
            prop_assert!(!normalized.contains("//"));
        }

        #[test]
        fn resolve_absolute_output_for_absolute_base(path in "[a-z./]{0,20}") {
            let resolved = resolve("/base", &path);
            prop_assert!(resolved.starts_with('/'));
        }
    }
}
