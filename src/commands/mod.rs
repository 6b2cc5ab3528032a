//! Built-in commands.
//!
//! Every handler here goes through `CommandRegistry::register`, the same
//! entry point hosts use for their own commands.

use crate::registry::CommandRegistry;

mod fs_ops;
mod ls;
mod shell;
pub mod util;

pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register("help", "Show available commands, or describe one", shell::help);
    registry.register("cls", "Clear the screen", shell::cls);
    registry.register("clear", "Clear the screen", shell::cls);
    registry.register("dir", "List a directory: dir [-l] [-R] [path]", ls::run);
    registry.register("ls", "List a directory: ls [-l] [-R] [path]", ls::run);
    registry.register("cd", "Change the current directory: cd [path]", shell::cd);
    registry.register("pwd", "Print the current directory", shell::pwd);
    registry.register("type", "Print a file: type <path>", fs_ops::cat);
    registry.register("cat", "Print a file: cat <path>", fs_ops::cat);
    registry.register("echo", "Print the arguments", shell::echo);
    registry.register("mkdir", "Create a directory: mkdir [-p] <path>", fs_ops::mkdir);
    registry.register("touch", "Create an empty file: touch <path>", fs_ops::touch);
    registry.register(
        "write",
        "Replace a file's content: write <path> <text...>",
        fs_ops::write_file,
    );
    registry.register("rm", "Remove a file or directory: rm <path>", fs_ops::rm);
    registry.register("clearfs", "Reset the filesystem to its defaults", fs_ops::clearfs);
    registry.register("ver", "Show the version", shell::ver);
}
