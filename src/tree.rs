use serde::{Deserialize, Serialize};
use tracing::info;

use crate::path::{self, ROOT};
use crate::{FsError, Result};

/// A file or directory. The serialized form is the snapshot format:
/// `{ "name", "type": "dir" | "file", "children"?, "content"? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "dir")]
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<Node>,
    },
    #[serde(rename = "file")]
    File {
        name: String,
        #[serde(default)]
        content: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

impl Node {
    pub fn dir(name: impl Into<String>) -> Self {
        Node::Directory {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory { .. } => NodeKind::Directory,
            Node::File { .. } => NodeKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    /// Case-insensitive child lookup. Files have no children.
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Directory { children, .. } => children.iter().find(|c| same_name(c.name(), name)),
            Node::File { .. } => None,
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Directory { children, .. } => {
                children.iter_mut().find(|c| same_name(c.name(), name))
            }
            Node::File { .. } => None,
        }
    }

    fn children_mut(&mut self) -> Result<&mut Vec<Node>> {
        match self {
            Node::Directory { children, .. } => Ok(children),
            Node::File { name, .. } => Err(FsError::NotADirectory(name.clone())),
        }
    }

    /// Children in stored order, each tagged with its kind.
    pub fn list(&self) -> Result<Vec<(String, NodeKind)>> {
        match self {
            Node::Directory { children, .. } => Ok(children
                .iter()
                .map(|c| (c.name().to_string(), c.kind()))
                .collect()),
            Node::File { name, .. } => Err(FsError::NotADirectory(name.clone())),
        }
    }

    pub fn read_file(&self) -> Result<&str> {
        match self {
            Node::File { content, .. } => Ok(content),
            Node::Directory { name, .. } => Err(FsError::NotAFile(name.clone())),
        }
    }

    /// Append an empty directory. Any case-insensitive name collision fails,
    /// whatever the kind of the existing entry.
    pub fn create_directory(&mut self, name: &str) -> Result<&mut Node> {
        let children = self.children_mut()?;
        if children.iter().any(|c| same_name(c.name(), name)) {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        children.push(Node::dir(name));
        let idx = children.len() - 1;
        Ok(&mut children[idx])
    }

    /// Touch semantics: an existing file is returned untouched, an existing
    /// directory of that name is a collision.
    pub fn create_file(&mut self, name: &str) -> Result<&mut Node> {
        let children = self.children_mut()?;
        match children.iter().position(|c| same_name(c.name(), name)) {
            Some(idx) if children[idx].is_dir() => Err(FsError::AlreadyExists(name.to_string())),
            Some(idx) => Ok(&mut children[idx]),
            None => {
                children.push(Node::file(name, ""));
                let idx = children.len() - 1;
                Ok(&mut children[idx])
            }
        }
    }

    /// Detach one child. A directory goes with its whole subtree.
    pub fn remove(&mut self, name: &str) -> Result<Node> {
        let children = self.children_mut()?;
        let idx = children
            .iter()
            .position(|c| same_name(c.name(), name))
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        Ok(children.remove(idx))
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Walk `path` down from `root`. Any miss, or a file met mid-path, is `None`.
pub fn resolve<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    let mut node = root;
    for seg in path::segments(path) {
        node = node.child(seg)?;
    }
    Some(node)
}

pub fn resolve_mut<'a>(root: &'a mut Node, path: &str) -> Option<&'a mut Node> {
    let mut node = root;
    for seg in path::segments(path) {
        node = node.child_mut(seg)?;
    }
    Some(node)
}

/// The rooted tree a session operates on.
///
/// Path-level operations take normalized absolute paths. Every operation that
/// changes the tree bumps `generation`, which callers compare to decide whether
/// a snapshot needs persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystem {
    root: Node,
    generation: u64,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::seed()
    }
}

impl FileSystem {
    pub fn seed() -> Self {
        Self {
            root: seed_root(),
            generation: 0,
        }
    }

    /// Rebuild a tree from a snapshot, rejecting shapes that break the
    /// tree's invariants.
    pub fn from_snapshot(root: Node) -> Result<Self> {
        let Node::Directory { children, .. } = root else {
            return Err(FsError::CorruptSnapshot("root is not a directory".into()));
        };
        for child in &children {
            validate(child)?;
        }
        check_unique(ROOT, &children)?;
        Ok(Self {
            root: Node::Directory {
                name: ROOT.to_string(),
                children,
            },
            generation: 0,
        })
    }

    pub fn snapshot(&self) -> Node {
        self.root.clone()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolve(&self, path: &str) -> Option<&Node> {
        resolve(&self.root, path)
    }

    pub fn lookup(&self, path: &str) -> Result<&Node> {
        self.resolve(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    pub fn list(&self, path: &str) -> Result<Vec<(String, NodeKind)>> {
        self.lookup(path)?.list()
    }

    pub fn read_file(&self, path: &str) -> Result<&str> {
        self.lookup(path)?.read_file()
    }

    pub fn create_directory(&mut self, path: &str) -> Result<()> {
        let (parent, leaf) = self.parent_of(path)?;
        parent.create_directory(leaf)?;
        self.generation += 1;
        Ok(())
    }

    /// Create every missing directory along `path`. Existing directories are
    /// fine; a file anywhere along the way is not.
    pub fn create_directory_all(&mut self, path: &str) -> Result<()> {
        let mut created = false;
        let mut node = &mut self.root;
        for seg in path::segments(path) {
            if node.child(seg).is_none() {
                node.create_directory(seg)?;
                created = true;
            }
            node = node
                .child_mut(seg)
                .ok_or_else(|| FsError::NotFound(seg.to_string()))?;
        }
        if !node.is_dir() {
            return Err(FsError::NotADirectory(node.name().to_string()));
        }
        if created {
            self.generation += 1;
        }
        Ok(())
    }

    /// Returns `true` when a new file was created.
    pub fn create_file(&mut self, path: &str) -> Result<bool> {
        let (parent, leaf) = self.parent_of(path)?;
        let existed = parent.child(leaf).is_some();
        parent.create_file(leaf)?;
        if !existed {
            self.generation += 1;
        }
        Ok(!existed)
    }

    /// Create the file if needed, then replace its content.
    pub fn write_file(&mut self, path: &str, data: impl Into<String>) -> Result<()> {
        let (parent, leaf) = self.parent_of(path)?;
        if let Node::File { content, .. } = parent.create_file(leaf)? {
            *content = data.into();
        }
        self.generation += 1;
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Result<Node> {
        let (parent, leaf) = self.parent_of(path)?;
        let removed = parent
            .remove(leaf)
            .map_err(|_| FsError::NotFound(path.to_string()))?;
        self.generation += 1;
        Ok(removed)
    }

    pub fn reset(&mut self) {
        info!("resetting filesystem to seed content");
        self.root = seed_root();
        self.generation += 1;
    }

    fn parent_of<'p>(&mut self, path: &'p str) -> Result<(&mut Node, &'p str)> {
        let (parent_path, leaf) =
            path::split_leaf(path).ok_or_else(|| FsError::InvalidPath(path.to_string()))?;
        let parent = resolve_mut(&mut self.root, &parent_path)
            .ok_or_else(|| FsError::NotFound(parent_path.clone()))?;
        Ok((parent, leaf))
    }
}

fn seed_root() -> Node {
    Node::Directory {
        name: ROOT.to_string(),
        children: vec![
            Node::file("AUTOEXEC.BAT", "@ECHO OFF\nPROMPT $P$G\nPATH C:\\DOS"),
            Node::file("CONFIG.SYS", "FILES=30\nBUFFERS=20"),
            Node::Directory {
                name: "GAMES".to_string(),
                children: vec![Node::file(
                    "README.TXT",
                    "Welcome to the GAMES directory.\nType DIR to see what is installed.",
                )],
            },
        ],
    }
}

fn validate(node: &Node) -> Result<()> {
    let name = node.name();
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(FsError::CorruptSnapshot(format!("invalid name {name:?}")));
    }
    if let Node::Directory { children, .. } = node {
        for child in children {
            validate(child)?;
        }
        check_unique(name, children)?;
    }
    Ok(())
}

fn check_unique(dir: &str, children: &[Node]) -> Result<()> {
    for (i, a) in children.iter().enumerate() {
        if children[i + 1..].iter().any(|b| same_name(a.name(), b.name())) {
            return Err(FsError::CorruptSnapshot(format!(
                "duplicate entry {} in {}",
                a.name(),
                dir
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(fs: &FileSystem, path: &str) -> Vec<String> {
        fs.list(path).unwrap().into_iter().map(|(n, _)| n).collect()
    }

    #[test]
    fn seed_has_games_and_two_files() {
        let fs = FileSystem::seed();
        assert_eq!(names(&fs, "/"), vec!["AUTOEXEC.BAT", "CONFIG.SYS", "GAMES"]);
        assert_eq!(names(&fs, "/GAMES"), vec!["README.TXT"]);
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let fs = FileSystem::seed();
        let node = fs.resolve("/games/readme.txt").unwrap();
        assert_eq!(node.name(), "README.TXT");
        assert!(fs.resolve("/").unwrap().is_dir());
    }

    #[test]
    fn resolve_through_file_is_none() {
        let fs = FileSystem::seed();
        assert!(fs.resolve("/CONFIG.SYS/x").is_none());
        assert!(fs.resolve("/NOPE").is_none());
    }

    #[test]
    fn list_and_read_check_kind() {
        let fs = FileSystem::seed();
        assert!(matches!(
            fs.list("/CONFIG.SYS"),
            Err(FsError::NotADirectory(_))
        ));
        assert!(matches!(fs.read_file("/GAMES"), Err(FsError::NotAFile(_))));
        assert_eq!(fs.read_file("/CONFIG.SYS").unwrap(), "FILES=30\nBUFFERS=20");
    }

    #[test]
    fn create_directory_then_list_once() {
        let mut fs = FileSystem::seed();
        fs.create_directory("/UTILS").unwrap();
        let listing = fs.list("/").unwrap();
        let hits: Vec<_> = listing.iter().filter(|(n, _)| n == "UTILS").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, NodeKind::Directory);
    }

    #[test]
    fn collisions_leave_tree_unchanged() {
        let mut fs = FileSystem::seed();
        let before = fs.snapshot();
        assert!(matches!(
            fs.create_directory("/games"),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(
            fs.create_directory("/config.sys"),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(
            fs.create_file("/Games"),
            Err(FsError::AlreadyExists(_))
        ));
        assert_eq!(fs.snapshot(), before);
        assert_eq!(fs.generation(), 0);
    }

    #[test]
    fn create_file_is_idempotent() {
        let mut once = FileSystem::seed();
        once.create_file("/NOTES.TXT").unwrap();

        let mut twice = FileSystem::seed();
        assert!(twice.create_file("/NOTES.TXT").unwrap());
        assert!(!twice.create_file("/notes.txt").unwrap());
        assert_eq!(once.snapshot(), twice.snapshot());

        let before = twice.read_file("/CONFIG.SYS").unwrap().to_string();
        twice.create_file("/CONFIG.SYS").unwrap();
        assert_eq!(twice.read_file("/CONFIG.SYS").unwrap(), before);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut fs = FileSystem::seed();
        fs.write_file("/GAMES/SAVE.DAT", "level=3").unwrap();
        assert_eq!(fs.read_file("/GAMES/SAVE.DAT").unwrap(), "level=3");
        assert!(matches!(
            fs.write_file("/GAMES", "x"),
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn create_under_file_is_not_a_directory() {
        let mut fs = FileSystem::seed();
        assert!(matches!(
            fs.create_directory("/CONFIG.SYS/SUB"),
            Err(FsError::NotADirectory(_))
        ));
        assert!(matches!(
            fs.create_file("/MISSING/A.TXT"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn remove_drops_subtree() {
        let mut fs = FileSystem::seed();
        let removed = fs.remove("/games").unwrap();
        assert_eq!(removed.name(), "GAMES");
        assert!(fs.resolve("/GAMES/README.TXT").is_none());
        assert!(matches!(fs.remove("/GAMES"), Err(FsError::NotFound(_))));
        assert!(matches!(fs.remove("/"), Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn reset_restores_seed() {
        let mut fs = FileSystem::seed();
        fs.remove("/CONFIG.SYS").unwrap();
        fs.reset();
        assert_eq!(fs.snapshot(), FileSystem::seed().snapshot());
        assert_eq!(fs.generation(), 2);
    }

    #[test]
    fn snapshot_shape_matches_format() {
        let node = Node::Directory {
            name: "/".into(),
            children: vec![Node::file("A.TXT", "hi"), Node::dir("B")],
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "dir",
                "name": "/",
                "children": [
                    { "type": "file", "name": "A.TXT", "content": "hi" },
                    { "type": "dir", "name": "B", "children": [] }
                ]
            })
        );
        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn from_snapshot_rejects_bad_shapes() {
        assert!(FileSystem::from_snapshot(Node::file("x", "")).is_err());
        let dup = Node::Directory {
            name: "/".into(),
            children: vec![Node::dir("A"), Node::file("a", "")],
        };
        assert!(matches!(
            FileSystem::from_snapshot(dup),
            Err(FsError::CorruptSnapshot(_))
        ));
        let restored = FileSystem::from_snapshot(FileSystem::seed().snapshot()).unwrap();
        assert_eq!(restored.snapshot(), FileSystem::seed().snapshot());
    }
}
