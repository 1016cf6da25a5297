use crate::config::PathsConfig;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "_publish.yml";

pub const POSTS_DIR: &str = "_posts";
pub const TAGS_FILE: &str = "_data/tags.yml";
pub const COMMENT_LINKS_FILE: &str = "_data/commentrefs.yml";
pub const TAGS_DIR: &str = "tags";
pub const ARCHIVE_DIR: &str = "archive";
pub const CREDENTIALS_FILE: &str = ".git/credentials";

pub const TAG_PAGE_EXT: &str = "md";
pub const ARCHIVE_INDEX: &str = "index.html";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `<root>/<tags_dir>/<key>.md`
pub fn tag_page(root: &Path, paths: &PathsConfig, key: &str) -> PathBuf {
    root.join(&paths.tags_dir).join(format!("{key}.{TAG_PAGE_EXT}"))
}

/// `<root>/<archive_dir>/<year>/<month>/index.html`
pub fn archive_index(root: &Path, paths: &PathsConfig, year: &str, month: &str) -> PathBuf {
    root.join(&paths.archive_dir)
        .join(year)
        .join(month)
        .join(ARCHIVE_INDEX)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A tag key becomes a file name, so it must not be able to escape `tags/`.
pub fn is_safe_file_stem(key: &str) -> bool {
    !(key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.contains('\0'))
}

/// True when `path` cannot be picked up by `git add -A` in `repo`: it lies
/// inside `repo/.git/` or outside the working tree.
///
/// Purely lexical; any `..` component is rejected.
pub fn is_private_to_git(repo: &Path, path: &Path) -> bool {
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }
    let Ok(rel) = path.strip_prefix(repo) else {
        return path.is_absolute();
    };
    let mut parts = rel.components().filter(|c| *c != Component::CurDir);
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(first)), Some(_)) => first == ".git",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_page_uses_key_and_extension() {
        let paths = PathsConfig::default();
        let p = tag_page(Path::new("/blog"), &paths, "go");
        assert_eq!(p, Path::new("/blog/tags/go.md"));
    }

    #[test]
    fn archive_index_nests_year_and_month() {
        let paths = PathsConfig::default();
        let p = archive_index(Path::new("/blog"), &paths, "2021", "03");
        assert_eq!(p, Path::new("/blog/archive/2021/03/index.html"));
    }

    #[test]
    fn unsafe_stems_rejected() {
        for key in ["", "a/b", "..", "a\\b", "x\0"] {
            assert!(!is_safe_file_stem(key), "expected unsafe: {key:?}");
        }
        for key in ["go", "rust-lang", "c++", "dotnet.core"] {
            assert!(is_safe_file_stem(key), "expected safe: {key}");
        }
    }

    #[test]
    fn credentials_under_dot_git_are_private() {
        let repo = Path::new("/blog");
        assert!(is_private_to_git(repo, Path::new("/blog/.git/credentials")));
        assert!(is_private_to_git(repo, Path::new("/blog/./.git/creds/store")));
        assert!(is_private_to_git(repo, Path::new("/home/me/.git-credentials")));
        assert!(is_private_to_git(Path::new(""), Path::new(CREDENTIALS_FILE)));
    }

    #[test]
    fn credentials_in_working_tree_are_not_private() {
        let repo = Path::new("/blog");
        for p in [
            "/blog/credentials",
            "/blog/_data/credentials",
            "/blog/.git",
            "/blog/.github/credentials",
            "/blog/.git/../credentials",
            "/blog",
        ] {
            assert!(!is_private_to_git(repo, Path::new(p)), "expected tracked: {p}");
        }
        assert!(!is_private_to_git(Path::new(""), Path::new("credentials")));
        assert!(!is_private_to_git(Path::new(""), Path::new("../outside")));
    }
}
