use std::ops::ControlFlow;

use tracing::debug;

use crate::{
    syntax::{traverse, SyntaxNode},
    tokens::{TokenKind, TokenStream},
    transforms::{is_injected_helper, LinesToRemove},
    Error, Transform, TransformCtx,
};

/// Marks the lines of every `var` statement declaring a CoffeeScript helper.
///
/// When the statement starts with plain declarators (`var Foo,`) and only the
/// helpers continue on later lines, the first line survives with its trailing
/// `,` turned into `;`.
pub struct RemoveInjectedHelpers;

impl Transform for RemoveInjectedHelpers {
    fn name(&self) -> &'static str {
        "removeInjectedHelpers"
    }

    fn run(&self, ctx: &mut TransformCtx<'_>) -> Result<bool, Error> {
        let syntax = ctx.syntax;
        let tokens = &mut ctx.tokens;
        let lines = &mut ctx.lines_to_remove;
        let mut modified = false;
        let mut failure = None;

        traverse(syntax, &mut |node| {
            if !declares_injected_helper(node) {
                return ControlFlow::Continue(());
            }
            match mark_declaration(node, tokens, lines) {
                Ok(()) => {
                    modified = true;
                    ControlFlow::Continue(())
                }
                Err(err) => {
                    failure = Some(err);
                    ControlFlow::Break(())
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(modified),
        }
    }
}

fn declares_injected_helper(node: &SyntaxNode) -> bool {
    node.declared_names().any(is_injected_helper)
}

fn mark_declaration(node: &SyntaxNode, tokens: &mut TokenStream, lines: &mut LinesToRemove) -> Result<(), Error> {
    let mut start_line = node.loc.start.line;
    let end_line = node.loc.end.line;
    let first_line = tokens.line_range(start_line);

    let helper_on_first_line = tokens[first_line.clone()]
        .iter()
        .any(|token| token.kind == TokenKind::Identifier && is_injected_helper(&token.value));

    if end_line > start_line && !helper_on_first_line {
        let separator = first_line.end.checked_sub(1).filter(|&idx| idx >= first_line.start);
        match separator {
            Some(idx) if tokens[idx].is_punctuator(",") => tokens[idx].value = ";".to_string(),
            other => {
                let found = other.map(|idx| tokens[idx].value.clone()).unwrap_or_default();
                return Err(Error::MalformedDeclaration { line: start_line, found });
            }
        }
        start_line += 1;
    }

    debug!(start_line, end_line, "removing injected helper declaration");
    lines.mark_range(start_line..=end_line);
    Ok(())
}
