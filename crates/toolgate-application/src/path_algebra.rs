//! Validation & Path Algebra (C2): project/path/offset validation and the
//! directory-synthesis rules that let the virtual file system do without a
//! directory table.

use toolgate_domain::entities::File;
use toolgate_domain::error::{Error, Result};

/// Validates a project name: 1..128 chars from `[A-Za-z0-9_.-]`.
pub fn validate_project(project: &str) -> Result<()> {
    if project.is_empty() || project.len() > 128 {
        return Err(Error::invalid_argument("project must be 1..128 characters"));
    }
    if !project.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(Error::invalid_argument(
            "project may only contain [A-Za-z0-9_.-]",
        ));
    }
    Ok(())
}

/// Validates a virtual path per §4.2. Empty means project root.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    if path.len() > 512 {
        return Err(Error::invalid_path("path exceeds 512 characters"));
    }
    if !path.starts_with('/') {
        return Err(Error::invalid_path("non-empty path must start with '/'"));
    }
    if path.ends_with('/') {
        return Err(Error::invalid_path("path must not end with '/'"));
    }
    for segment in path[1..].split('/') {
        if segment.is_empty() {
            return Err(Error::invalid_path("path must not contain empty segments"));
        }
        if segment == "." || segment == ".." {
            return Err(Error::invalid_path("path must not contain '.' or '..' segments"));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(Error::invalid_path(
                "path segments may only contain [A-Za-z0-9_.-]",
            ));
        }
        if segment.chars().any(|c| c.is_ascii_control()) {
            return Err(Error::invalid_path("path must not contain control characters"));
        }
    }
    Ok(())
}

/// The `list` tool's path adapter: tolerates a bare `"/"` and normalizes it
/// to the empty (root) path before the strict validator runs.
#[must_use]
pub fn normalize_list_path(path: &str) -> &str {
    if path == "/" { "" } else { path }
}

/// Write mode, mirroring the tool surface's `mode` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Truncate,
    Overwrite,
}

impl WriteMode {
    /// Parses the wire string form (`"APPEND" | "TRUNCATE" | "OVERWRITE"`).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "APPEND" => Ok(Self::Append),
            "TRUNCATE" => Ok(Self::Truncate),
            "OVERWRITE" => Ok(Self::Overwrite),
            other => Err(Error::invalid_argument(format!("unknown write mode '{other}'"))),
        }
    }
}

/// Validates `offset` against `mode` and the existing file size, then returns
/// the spliced content a write should persist.
pub fn apply_write(existing: Option<&str>, mode: WriteMode, offset: i64, payload: &str) -> Result<String> {
    if offset < 0 {
        return Err(Error::InvalidOffset { message: "offset must be non-negative".to_owned() });
    }
    let existing = existing.unwrap_or("");
    match mode {
        WriteMode::Append => Ok(format!("{existing}{payload}")),
        WriteMode::Truncate => {
            if offset != 0 {
                return Err(Error::InvalidOffset {
                    message: "TRUNCATE requires offset == 0".to_owned(),
                });
            }
            Ok(payload.to_owned())
        }
        WriteMode::Overwrite => {
            let size = existing.len() as i64;
            if offset > size {
                return Err(Error::InvalidOffset {
                    message: "OVERWRITE offset must be <= current size".to_owned(),
                });
            }
            let offset = offset as usize;
            if !existing.is_char_boundary(offset) {
                return Err(Error::InvalidOffset {
                    message: "offset must fall on a UTF-8 character boundary".to_owned(),
                });
            }
            let tail_start = offset + payload.len();
            if tail_start < existing.len() && !existing.is_char_boundary(tail_start) {
                return Err(Error::InvalidOffset {
                    message: "offset + content length must fall on a UTF-8 character boundary".to_owned(),
                });
            }
            let mut spliced = String::with_capacity(existing.len().max(tail_start));
            spliced.push_str(&existing[..offset]);
            spliced.push_str(payload);
            if tail_start < existing.len() {
                spliced.push_str(&existing[tail_start..]);
            }
            Ok(spliced)
        }
    }
}

/// Whether `path` is a synthesized directory given the set of active files
/// under it (i.e. at least one active file path starts with `path + "/"`, or
/// any active file at all when `path` is the project root).
#[must_use]
pub fn is_directory(path: &str, descendant_count: u64) -> bool {
    let _ = path;
    descendant_count > 0
}

/// Returns the path prefix a descendant-search should use for `path`.
#[must_use]
pub fn descendant_prefix(path: &str) -> String {
    if path.is_empty() { String::new() } else { format!("{path}/") }
}

/// Returns every strict parent segment prefix of `path`, shortest first,
/// excluding `path` itself and the root. Used to reject `write`/`rename`
/// targets whose parent segment is itself an active file.
#[must_use]
pub fn strict_parent_prefixes(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let segments: Vec<&str> = path[1..].split('/').collect();
    let mut prefixes = Vec::with_capacity(segments.len().saturating_sub(1));
    let mut acc = String::new();
    for segment in &segments[..segments.len().saturating_sub(1)] {
        acc.push('/');
        acc.push_str(segment);
        prefixes.push(acc.clone());
    }
    prefixes
}

/// One listing entry: either an active file or a synthesized directory.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntryKind {
    File,
    Directory,
}

/// One entry in a `file_list` response.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub path: String,
    pub kind: ListEntryKind,
}

/// Synthesizes the listing for `path` at `depth` from the active files found
/// under it, per §4.3's `list` contract. `files` must already be filtered to
/// active rows under `descendant_prefix(path)`.
#[must_use]
pub fn synthesize_listing(path: &str, depth: u32, files: &[File], limit: usize) -> (Vec<ListEntry>, bool) {
    let prefix = descendant_prefix(path);
    let prefix_segments = if path.is_empty() { 0 } else { path[1..].split('/').count() };

    let mut seen_dirs = std::collections::BTreeSet::new();
    let mut entries = Vec::new();

    for file in files {
        let Some(relative) = file.path.strip_prefix(&prefix) else { continue };
        let segments: Vec<&str> = relative.split('/').collect();
        if depth == 0 {
            continue;
        }
        if segments.len() == 1 {
            entries.push(ListEntry { path: file.path.clone(), kind: ListEntryKind::File });
        } else {
            for d in 1..=(depth as usize).min(segments.len() - 1) {
                let dir_path = format!("{prefix}{}", segments[..d].join("/"));
                seen_dirs.insert(dir_path);
            }
        }
    }
    for dir in seen_dirs {
        entries.push(ListEntry { path: dir, kind: ListEntryKind::Directory });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    let _ = prefix_segments;

    let has_more = entries.len() > limit;
    entries.truncate(limit);
    (entries, has_more)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_validation_rejects_empty_and_bad_chars() {
        assert!(validate_project("demo").is_ok());
        assert!(validate_project("").is_err());
        assert!(validate_project("has space").is_err());
        assert!(validate_project(&"x".repeat(129)).is_err());
    }

    #[test]
    fn path_validation_rejects_dot_segments_and_trailing_slash() {
        assert!(validate_path("").is_ok());
        assert!(validate_path("/a/b.txt").is_ok());
        assert!(validate_path("a/b").is_err());
        assert!(validate_path("/a/").is_err());
        assert!(validate_path("/a/../b").is_err());
        assert!(validate_path("/a//b").is_err());
    }

    #[test]
    fn truncate_then_append_round_trips() {
        let truncated = apply_write(None, WriteMode::Truncate, 0, "hello").unwrap();
        assert_eq!(truncated, "hello");
        let appended = apply_write(Some(&truncated), WriteMode::Append, 0, " world").unwrap();
        assert_eq!(appended, "hello world");
    }

    #[test]
    fn overwrite_splices_without_truncating_tail() {
        let result = apply_write(Some("hello world"), WriteMode::Overwrite, 6, "there").unwrap();
        assert_eq!(result, "hello there");
    }

    #[test]
    fn overwrite_past_size_is_invalid_offset() {
        let err = apply_write(Some("hi"), WriteMode::Overwrite, 5, "x").unwrap_err();
        assert_eq!(err.code(), "INVALID_OFFSET");
    }

    #[test]
    fn strict_parent_prefixes_excludes_final_segment() {
        assert_eq!(strict_parent_prefixes("/a/b/c"), vec!["/a", "/a/b"]);
        assert_eq!(strict_parent_prefixes("/a"), Vec::<String>::new());
    }
}
