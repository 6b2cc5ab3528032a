//! Path arithmetic for the virtual tree.
//!
//! Everything here works on strings only. Ascending with `..` never touches
//! live nodes: the target is folded into an absolute path first and the tree
//! is always walked from the root.

pub const ROOT: &str = "/";

/// Fold `target` onto `cwd` and return a canonical absolute path.
///
/// Absolute targets ignore `cwd`. Empty and `.` segments are dropped, and `..`
/// pops the last kept segment; popping past the root is a no-op. Never fails.
pub fn normalize(cwd: &str, target: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    let base = if target.starts_with('/') { "" } else { cwd };

    for comp in base.split('/').chain(target.split('/')) {
        match comp {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(comp),
        }
    }

    if components.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", components.join("/"))
    }
}

/// Segments of an already normalized path. The root yields none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split a normalized path into its parent path and leaf name.
/// Returns `None` for the root, which has no parent.
pub fn split_leaf(path: &str) -> Option<(String, &str)> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let (parent, leaf) = trimmed.rsplit_once('/')?;
    let parent = if parent.is_empty() {
        ROOT.to_string()
    } else {
        parent.to_string()
    };
    Some((parent, leaf))
}
