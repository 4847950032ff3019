use std::ops::Range;

use tracing::{debug, warn};

use crate::{
    tokens::{Token, TokenId, TokenKind, TokenStream},
    transforms::{LinesToRemove, INDENT},
    Error, Transform, TransformCtx,
};

/// CoffeeScript names the inner helper of `__extends` like this.
const RESERVED_CONSTRUCTOR_ALIAS: &str = "ctor";
/// Parameter through which a class wrapper receives its parent.
const SUPERCLASS_ALIAS: &str = "_super";

/// Unwraps CoffeeScript class declarations.
///
/// ```js
/// Foo = (function(_super) {
///   __extends(Foo, _super);
///   function Foo() {}
///   return Foo;
/// })(Bar);
/// ```
///
/// becomes `Foo = function() {}` followed by the class body, one level
/// shallower, with `_super` replaced by the parent expression. The
/// constructor is moved up to be the first statement so its annotations stay
/// attached to it.
pub struct UnwrapClassDeclarations;

impl Transform for UnwrapClassDeclarations {
    fn name(&self) -> &'static str {
        "unwrapClassDeclarations"
    }

    fn run(&self, ctx: &mut TransformCtx<'_>) -> Result<bool, Error> {
        let mut modified = false;
        for constructor in find_constructors(&ctx.tokens) {
            if unwrap_class(&mut ctx.tokens, &mut ctx.lines_to_remove, &constructor)? {
                modified = true;
            }
        }
        Ok(modified)
    }
}

/// A `function` keyword introducing a class constructor.
#[derive(Clone, Debug)]
pub struct Constructor {
    pub token: TokenId,
    pub class_name: String,
}

/// Function declarations in CoffeeScript output are always class constructors.
pub fn find_constructors(tokens: &[Token]) -> Vec<Constructor> {
    tokens
        .windows(2)
        .filter(|pair| is_constructor(&pair[0], &pair[1]))
        .map(|pair| Constructor { token: pair[0].id, class_name: pair[1].value.clone() })
        .collect()
}

fn is_constructor(token: &Token, next: &Token) -> bool {
    token.is_keyword("function") && next.kind == TokenKind::Identifier && next.value != RESERVED_CONSTRUCTOR_ALIAS
}

/// Where one class wrapper starts and ends, relative to its constructor.
struct Wrapper {
    /// First token of the `Foo = (function(...) {` line.
    start: usize,
    /// First token of the `})(Parent);` line.
    end: usize,
    /// Column of both boundary lines, one level shallower than the constructor.
    column: u32,
    namespace: String,
    parent_namespace: String,
}

// The column is read from the stream, not from detection time: an enclosing
// class unwrapped earlier has already dedented this one.
fn locate_wrapper(tokens: &TokenStream, ctor_idx: usize, ctor: &Constructor) -> Option<Wrapper> {
    let boundary = tokens[ctor_idx].column().checked_sub(INDENT)?;

    let end = (ctor_idx + 1..tokens.len()).find(|&idx| tokens[idx].column() == boundary)?;
    let end_line = tokens[end].line();
    let parent_namespace: String = tokens[end..]
        .iter()
        .take_while(|token| token.line() == end_line)
        .filter(|token| token.kind == TokenKind::Identifier || token.is_punctuator("."))
        .map(|token| token.value.as_str())
        .collect();

    let start = (0..ctor_idx).rev().find(|&idx| tokens[idx].column() == boundary)?;
    let assign = (start..ctor_idx).find(|&idx| tokens[idx].is_punctuator("="))?;
    let raw: String = tokens[start..assign].iter().map(|token| token.value.as_str()).collect();
    let namespace = raw.strip_suffix(ctor.class_name.as_str())?.to_string();

    Some(Wrapper { start, end, column: boundary, namespace, parent_namespace })
}

/// Finds `var ..., Foo, ...` in the scope around the wrapper and drops the
/// declarator. Returns how many tokens were removed before the wrapper, or
/// `None` when there is no such declaration.
fn remove_var_declarator(
    tokens: &mut TokenStream,
    lines: &mut LinesToRemove,
    wrapper_start: usize,
    boundary: u32,
    ctor: &Constructor,
) -> Result<Option<usize>, Error> {
    for var_idx in (0..wrapper_start).rev() {
        let token = &tokens[var_idx];
        if token.column() < boundary {
            break;
        }
        if !token.is_keyword("var") {
            continue;
        }
        let Some(name_idx) = tokens.rest_of_line(var_idx).find(|&idx| tokens[idx].is_identifier(&ctor.class_name)) else {
            continue;
        };

        let line = tokens[var_idx].line();
        let next = tokens
            .get(name_idx + 1)
            .filter(|next| next.kind == TokenKind::Punctuator)
            .ok_or_else(|| Error::MalformedVarStatement { line, name: ctor.class_name.clone() })?;

        if name_idx == var_idx + 1 && next.value == ";" {
            lines.mark(line);
            return Ok(Some(0));
        }
        let first = if tokens[name_idx - 1].is_punctuator(",") { name_idx - 1 } else { name_idx };
        tokens.excise(first, 2);
        return Ok(Some(2));
    }
    Ok(None)
}

/// Tokens to move so the constructor (with its doc comment) leads the body,
/// or `None` when it already does.
fn constructor_run(tokens: &TokenStream, ctor_idx: usize, first_in_body: usize) -> Option<Range<usize>> {
    let has_comment = ctor_idx > 0 && tokens[ctor_idx - 1].kind == TokenKind::BlockComment;
    let run_start = if has_comment { ctor_idx - 1 } else { ctor_idx };
    if run_start <= first_in_body {
        return None;
    }

    // Without a later statement at the constructor's column the run reaches
    // the end of the stream.
    let column = tokens[ctor_idx].column();
    let run_end = match (ctor_idx + 1..tokens.len()).find(|&idx| tokens[idx].column() == column) {
        Some(idx) if tokens[idx].kind == TokenKind::Punctuator || tokens[idx].value == "}" => idx + 1,
        Some(idx) => idx,
        None => tokens.len(),
    };
    Some(run_start..run_end)
}

fn unwrap_class(tokens: &mut TokenStream, lines: &mut LinesToRemove, ctor: &Constructor) -> Result<bool, Error> {
    let Some(mut ctor_idx) = tokens.position(ctor.token) else {
        return Ok(false);
    };
    let Some(Wrapper { mut start, mut end, column, namespace, parent_namespace }) = locate_wrapper(tokens, ctor_idx, ctor)
    else {
        warn!(class = %ctor.class_name, line = tokens[ctor_idx].line(), "no class wrapper around constructor, skipping");
        return Ok(false);
    };

    let end_line = tokens[end].line();
    lines.mark_range(end_line.saturating_sub(2)..=end_line);
    lines.mark(tokens[start].line());

    let removed = remove_var_declarator(tokens, lines, start, column, ctor)?;
    if let Some(count) = removed {
        ctor_idx -= count;
        start -= count;
        end -= count;
    }

    let maybe_var = if removed.is_some() && namespace.is_empty() { "var " } else { "" };
    tokens[ctor_idx].value = format!("{maybe_var}{namespace}{} =", ctor.class_name);
    tokens[ctor_idx + 1].value = "function".to_string();

    let wrapper_line = tokens[start].line();
    if let Some(first_in_body) = (start..tokens.len()).find(|&idx| tokens[idx].line() != wrapper_line) {
        if let Some(run) = constructor_run(tokens, ctor_idx, first_in_body) {
            debug!(class = %ctor.class_name, "moving constructor to the top of the class body");
            tokens.relocate(run, first_in_body);
        }
    }

    // Everything from the wrapper head to the last statement before `})(...)`.
    let mut line = None;
    for idx in start + 1..end {
        let previous_is_dot = tokens[idx - 1].is_punctuator(".");
        let token = &mut tokens[idx];
        if !namespace.is_empty() && token.is_identifier(&ctor.class_name) && !previous_is_dot {
            token.value = format!("{namespace}{}", ctor.class_name);
        }
        if !parent_namespace.is_empty() && token.is_identifier(SUPERCLASS_ALIAS) {
            token.value = parent_namespace.clone();
        }
        if token.kind == TokenKind::BlockComment {
            token.value = token.value.replace("\n  ", "\n");
        }
        if line != Some(token.line()) {
            line = Some(token.line());
            tokens.dedent_line(idx, INDENT);
        }
    }

    debug!(class = %ctor.class_name, %namespace, parent = %parent_namespace, "unwrapped class declaration");
    Ok(true)
}
