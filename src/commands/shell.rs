use crate::registry::CommandContext;
use crate::{FsError, Output, Result, path};

pub fn pwd(ctx: &mut CommandContext<'_>) -> Result<Output> {
    Ok(Output::line(ctx.session.cwd.clone()))
}

pub fn cd(ctx: &mut CommandContext<'_>) -> Result<Output> {
    let target = path::normalize(&ctx.session.cwd, ctx.arg(0).unwrap_or(path::ROOT));
    let node = ctx.session.fs.lookup(&target)?;
    if !node.is_dir() {
        return Err(FsError::NotADirectory(target));
    }
    ctx.session.cwd = target;
    Ok(Output::new())
}

pub fn echo(ctx: &mut CommandContext<'_>) -> Result<Output> {
    Ok(Output::line(ctx.args.join(" ")))
}

pub fn cls(_ctx: &mut CommandContext<'_>) -> Result<Output> {
    Ok(Output::cleared())
}

pub fn ver(_ctx: &mut CommandContext<'_>) -> Result<Output> {
    Ok(Output::line(format!(
        "{} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )))
}

pub fn help(ctx: &mut CommandContext<'_>) -> Result<Output> {
    if let Some(name) = ctx.arg(0) {
        return Ok(match ctx.registry.lookup(name) {
            Some(entry) => Output::line(format!("{} - {}", entry.name, entry.description)),
            None => Output::line(format!(
                "'{}' is not recognized as an internal or external command",
                name.to_lowercase()
            )),
        });
    }

    let mut out = Output::line("Commands:");
    let width = ctx.registry.names().map(str::len).max().unwrap_or(0);
    for entry in ctx.registry.entries() {
        out.push(format!("  {:<width$}  {}", entry.name, entry.description));
    }
    Ok(out)
}
