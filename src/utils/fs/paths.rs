//! Path utilities: relative display paths and upward file discovery.

use std::path::{Component, Path, PathBuf};

/// Path of `target` relative to `root`, using `/` separators.
///
/// Walks up with `..` where `target` is outside `root`. Both paths are compared
/// component-wise without touching the filesystem, so they should be in the same
/// form (both canonical, or both absolute).
///
/// # Examples
///
/// ```rust
/// use gcp_cli::utils::fs::relative_path;
/// use std::path::Path;
///
/// assert_eq!(relative_path(Path::new("/src"), Path::new("/src/views/item.ejs")), "views/item.ejs");
/// assert_eq!(relative_path(Path::new("/src/js"), Path::new("/src/tmpl/a.hbs")), "../tmpl/a.hbs");
/// ```
#[must_use]
pub fn relative_path(root: &Path, target: &Path) -> String {
    let root_components: Vec<Component<'_>> = root.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let common = root_components
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for component in &root_components[common..] {
        if !matches!(component, Component::CurDir) {
            parts.push("..".to_string());
        }
    }
    for component in &target_components[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    parts.join("/")
}

/// Search `start` and its ancestors for a file named `file_name`.
///
/// Returns the first match, closest to `start`.
#[must_use]
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    loop {
        let candidate = current.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}
