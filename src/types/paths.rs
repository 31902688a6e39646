//! Path helpers shared by the scanner and the writers.
//!
//! All paths that end up in a document are POSIX-form strings, whatever the
//! host platform.

use std::path::{Component, Path, PathBuf};

/// Render a path with forward slashes, dropping a Windows verbatim prefix.
pub fn to_posix(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let stripped = raw
        .strip_prefix(r"\\?\")
        .or_else(|| raw.strip_prefix(r"\\.\"))
        .unwrap_or(&raw);
    stripped.replace('\\', "/")
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Path of `target` relative to the directory `base`.
///
/// Both paths should be absolute (or both relative to the same point).
/// When they share no root, e.g. different Windows drives, `target` is
/// returned unchanged. Identical paths yield `.`.
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target_parts = normalize(target);
    let base_parts = normalize(base);

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && (target.has_root() || base.has_root()) {
        return target.to_path_buf();
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    }
}

/// `relative_path` rendered in POSIX form
pub fn relative_posix(target: &Path, base: &Path) -> String {
    to_posix(&relative_path(target, base))
}

/// Reference from one output document to another output file.
///
/// Both arguments are POSIX paths relative to the output directory. The
/// result is relative to the directory holding `document` and always starts
/// with `./` or `../`.
pub fn document_reference(document: &str, target: &str) -> String {
    let mut doc_dir: Vec<&str> = document.split('/').filter(|s| !s.is_empty()).collect();
    doc_dir.pop();
    let target_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = doc_dir
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = doc_dir.len() - common;
    let rest = target_parts[common..].join("/");
    if ups == 0 {
        format!("./{}", rest)
    } else {
        format!("{}{}", "../".repeat(ups), rest)
    }
}
