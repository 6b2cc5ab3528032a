use crate::registry::CommandContext;
use crate::{FsError, Result};

/// The first argument as a normalized path, or a usage error.
pub fn required_path(ctx: &CommandContext<'_>, usage: &'static str) -> Result<String> {
    ctx.path_arg(0).ok_or(FsError::MissingArgument(usage))
}
