use tracing::debug;

use crate::{tokens::TokenKind, Error, Transform, TransformCtx};

pub struct HelperAlias {
    pub name: &'static str,
    pub replacement: &'static str,
    /// Tokens after the match to blank out, e.g. `.call` in `__slice.call(...)`.
    pub erase_following: usize,
    pub requires_goog_array: bool,
}

pub const HELPER_ALIASES: [HelperAlias; 5] = [
    HelperAlias { name: "__bind", replacement: "goog.bind", erase_following: 0, requires_goog_array: false },
    HelperAlias { name: "__indexOf", replacement: "goog.array.indexOf", erase_following: 2, requires_goog_array: true },
    HelperAlias { name: "__slice", replacement: "goog.array.slice", erase_following: 2, requires_goog_array: true },
    HelperAlias { name: "__super__", replacement: "superClass_", erase_following: 0, requires_goog_array: false },
    HelperAlias { name: "__extends", replacement: "goog.inherits", erase_following: 0, requires_goog_array: false },
];

pub fn helper_alias(name: &str) -> Option<&'static HelperAlias> {
    HELPER_ALIASES.iter().find(|alias| alias.name == name)
}

/// Points the remaining uses of removed helpers at their Closure Library
/// equivalents.
pub struct AliasInjectedHelpers;

impl Transform for AliasInjectedHelpers {
    fn name(&self) -> &'static str {
        "aliasInjectedHelpers"
    }

    fn run(&self, ctx: &mut TransformCtx<'_>) -> Result<bool, Error> {
        let mut modified = false;
        for idx in 0..ctx.tokens.len() {
            let token = &mut ctx.tokens[idx];
            if token.kind != TokenKind::Identifier {
                continue;
            }
            let Some(alias) = helper_alias(&token.value) else { continue };

            debug!(helper = alias.name, line = token.line(), "aliasing injected helper");
            token.kind = TokenKind::Resolved;
            token.value = alias.replacement.to_string();
            for following in ctx.tokens.iter_mut().skip(idx + 1).take(alias.erase_following) {
                following.value.clear();
            }
            ctx.requires_goog_array |= alias.requires_goog_array;
            modified = true;
        }
        Ok(modified)
    }
}
