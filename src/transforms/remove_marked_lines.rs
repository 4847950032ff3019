use tracing::debug;

use crate::{Error, Transform, TransformCtx};

/// Drops every token that starts on a line marked by the earlier passes.
pub struct RemoveMarkedLines;

impl Transform for RemoveMarkedLines {
    fn name(&self) -> &'static str {
        "removeMarkedLines"
    }

    fn run(&self, ctx: &mut TransformCtx<'_>) -> Result<bool, Error> {
        if ctx.lines_to_remove.is_empty() {
            return Ok(false);
        }
        let before = ctx.tokens.len();
        let lines = &ctx.lines_to_remove;
        ctx.tokens.retain(|token| !lines.contains(token.line()));
        let removed = before - ctx.tokens.len();
        debug!(removed, "removed tokens on marked lines");
        Ok(removed > 0)
    }
}
