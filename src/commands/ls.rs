use crate::registry::CommandContext;
use crate::tree::Node;
use crate::{Output, Result, path};

const EMPTY_DIR: &str = "Directory is empty.";

#[derive(Debug, Clone, Copy, Default)]
struct DirOptions {
    long: bool,
    recursive: bool,
}

pub fn run(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let (opts, target_arg) = parse_dir_args(ctx.args);
    let target = path::normalize(&ctx.session.cwd, target_arg.unwrap_or("."));
    let node = ctx.session.fs.lookup(&target)?;

    let mut out = Output::new();
    match node {
        Node::File { .. } => out.push(render(node, None, opts)),
        Node::Directory { children, .. } if children.is_empty() => out.push(EMPTY_DIR),
        Node::Directory { .. } if opts.recursive => walk(node, &target, opts, &mut out),
        Node::Directory { children, .. } => {
            for child in children {
                out.push(render(child, None, opts));
            }
        }
    }
    Ok(out)
}

fn parse_dir_args(args: &[String]) -> (DirOptions, Option<&str>) {
    let mut opts = DirOptions::default();
    let mut path: Option<&str> = None;

    for arg in args {
        if arg.starts_with('-') && arg.len() > 1 {
            for ch in arg.chars().skip(1) {
                match ch {
                    'l' => opts.long = true,
                    'R' => opts.recursive = true,
                    _ => {}
                }
            }
        } else {
            path = Some(arg.as_str());
            break;
        }
    }

    (opts, path)
}

/// Depth-first, printing full paths so nested entries stay unambiguous.
/// Each directory is followed by its own subtree before its next sibling.
fn walk(root: &Node, root_path: &str, opts: DirOptions, out: &mut Output) {
    let mut stack = Vec::new();
    push_children(root, root_path, &mut stack);
    while let Some((node, node_path)) = stack.pop() {
        out.push(render(node, Some(&node_path), opts));
        push_children(node, &node_path, &mut stack);
    }
}

fn push_children<'a>(node: &'a Node, node_path: &str, stack: &mut Vec<(&'a Node, String)>) {
    if let Node::Directory { children, .. } = node {
        for child in children.iter().rev() {
            stack.push((child, path::normalize(node_path, child.name())));
        }
    }
}

fn render(node: &Node, full_path: Option<&str>, opts: DirOptions) -> String {
    let label = full_path.unwrap_or(node.name());
    match node {
        Node::Directory { .. } if opts.long => format!("<DIR>    {:>8} {}/", "", label),
        Node::Directory { .. } => format!("{label}/"),
        Node::File { content, .. } if opts.long => {
            format!("         {:>8} {}", content.len(), label)
        }
        Node::File { .. } => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{FileSystem, Shell};

    fn run(shell: &mut Shell, line: &str) -> Vec<String> {
        shell.execute(line).lines.split_off(1)
    }

    #[test]
    fn dir_marks_directories() {
        let mut sh = Shell::new(FileSystem::seed());
        assert_eq!(
            run(&mut sh, "dir"),
            vec!["AUTOEXEC.BAT", "CONFIG.SYS", "GAMES/"]
        );
        assert_eq!(run(&mut sh, "ls games"), vec!["README.TXT"]);
    }

    #[test]
    fn dir_of_file_prints_its_name() {
        let mut sh = Shell::new(FileSystem::seed());
        assert_eq!(run(&mut sh, "dir /config.sys"), vec!["CONFIG.SYS"]);
    }

    #[test]
    fn dir_of_empty_directory_prints_sentinel() {
        let mut sh = Shell::new(FileSystem::seed());
        run(&mut sh, "mkdir EMPTY");
        assert_eq!(run(&mut sh, "dir EMPTY"), vec!["Directory is empty."]);
    }

    #[test]
    fn dir_missing_path_is_reported() {
        let mut sh = Shell::new(FileSystem::seed());
        assert_eq!(
            run(&mut sh, "dir NOWHERE"),
            vec!["The system cannot find the path specified: /NOWHERE"]
        );
    }

    #[test]
    fn dir_long_shows_sizes() {
        let mut sh = Shell::new(FileSystem::seed());
        let lines = run(&mut sh, "dir -l");
        assert_eq!(lines[1], format!("         {:>8} CONFIG.SYS", 19));
        assert!(lines[2].starts_with("<DIR>"));
        assert!(lines[2].ends_with("GAMES/"));
    }

    #[test]
    fn dir_recursive_walks_subtree() {
        let mut sh = Shell::new(FileSystem::seed());
        run(&mut sh, "mkdir -p GAMES/SAVES");
        run(&mut sh, "touch GAMES/SAVES/SLOT1.DAT");
        assert_eq!(
            run(&mut sh, "dir -R /GAMES"),
            vec![
                "/GAMES/README.TXT",
                "/GAMES/SAVES/",
                "/GAMES/SAVES/SLOT1.DAT",
            ]
        );
    }

    #[test]
    fn dir_recursive_keeps_sibling_subtrees_together() {
        let mut sh = Shell::new(FileSystem::seed());
        run(&mut sh, "mkdir -p X/A");
        run(&mut sh, "mkdir -p X/B");
        run(&mut sh, "touch X/A/a1");
        run(&mut sh, "touch X/B/b1");
        assert_eq!(
            run(&mut sh, "dir -R /X"),
            vec!["/X/A/", "/X/A/a1", "/X/B/", "/X/B/b1"]
        );
    }
}
