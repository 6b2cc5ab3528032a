use crate::registry::CommandContext;
use crate::{FsError, Output, Result};

use super::util::required_path;

pub fn cat(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let path = required_path(ctx, "type <path>")?;
    let mut out = Output::new();
    out.push_text(ctx.session.fs.read_file(&path)?);
    Ok(out)
}

pub fn mkdir(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let mut parents = false;
    let mut targets = Vec::new();
    for arg in ctx.args {
        if arg == "-p" {
            parents = true;
        } else {
            targets.push(arg.as_str());
        }
    }

    match targets.as_slice() {
        [target] => {
            let path = crate::path::normalize(&ctx.session.cwd, target);
            if parents {
                ctx.session.fs.create_directory_all(&path)?;
            } else {
                ctx.session.fs.create_directory(&path)?;
            }
            Ok(Output::new())
        }
        _ => Err(FsError::MissingArgument("mkdir [-p] <path>")),
    }
}

pub fn touch(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let path = required_path(ctx, "touch <path>")?;
    ctx.session.fs.create_file(&path)?;
    Ok(Output::new())
}

pub fn write_file(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let path = required_path(ctx, "write <path> <text...>")?;
    let content = ctx.args[1..].join(" ");
    ctx.session.fs.write_file(&path, content)?;
    Ok(Output::new())
}

pub fn rm(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let path = required_path(ctx, "rm <path>")?;
    ctx.session.fs.remove(&path)?;
    if ctx.session.fs.resolve(&ctx.session.cwd).is_none() {
        ctx.session.cwd = crate::path::ROOT.to_string();
    }
    Ok(Output::new())
}

pub fn clearfs(ctx: &mut CommandContext<'_>) -> Result<Output> {
    ctx.session.fs.reset();
    ctx.session.cwd = crate::path::ROOT.to_string();
    Ok(Output::line("Filesystem reset to defaults."))
}
