use oxc_span::SourceType;
use thiserror::Error;
use tracing::debug;

pub mod position;
pub mod printer;
pub mod syntax;
pub mod tokens;
pub mod transforms;

pub use syntax::{parse, traverse, NodeKind, SyntaxNode};

use tokens::{TokenKind, TokenStream};
use transforms::LinesToRemove;

/// Identifier whose presence marks a CommonJS module, which is left alone.
const MODULE_MARKER: &str = "exports";

pub struct Coffee2Closure {
    transforms: Vec<Box<dyn Transform>>,
}

impl Default for Coffee2Closure {
    fn default() -> Self {
        Self {
            transforms: vec![
                Box::new(transforms::remove_injected_helpers::RemoveInjectedHelpers),
                Box::new(transforms::unwrap_class_declarations::UnwrapClassDeclarations),
                Box::new(transforms::remove_marked_lines::RemoveMarkedLines),
                Box::new(transforms::alias_injected_helpers::AliasInjectedHelpers),
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct FixOptions {
    pub add_generated_by_header: bool,
    /// Defaults to a classic script.
    pub source_type: Option<SourceType>,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self { add_generated_by_header: true, source_type: None }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Parsing failed: {message}")]
    ParseFailed { message: String },
    #[error("Expected `,` at the end of line {line} of an injected helper declaration, found `{found}`")]
    MalformedDeclaration { line: u32, found: String },
    #[error("Expected punctuation after `{name}` in the var statement on line {line}")]
    MalformedVarStatement { line: u32, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixResult {
    pub modified: bool,
    pub requires_goog_array: bool,
    pub code: String,
}

pub trait Transform {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut TransformCtx<'_>) -> Result<bool, Error>;
}

/// State of one `fix` call, shared by the passes in order.
pub struct TransformCtx<'a> {
    pub source_text: &'a str,
    pub syntax: &'a SyntaxNode,
    pub tokens: TokenStream,
    pub lines_to_remove: LinesToRemove,
    /// Set when an alias needs `goog.array`.
    pub requires_goog_array: bool,
}

impl Coffee2Closure {
    pub fn fix(&self, source_text: &str, opts: FixOptions) -> Result<FixResult, Error> {
        let source_type = opts.source_type.unwrap_or_else(SourceType::cjs);

        let parsed = syntax::parse(source_text, source_type)?;
        if parsed.tokens.iter().any(|token| token.kind == TokenKind::Identifier && token.value == MODULE_MARKER) {
            debug!("source uses `exports`, leaving it untouched");
            return Ok(FixResult { modified: false, requires_goog_array: false, code: source_text.to_string() });
        }

        let mut ctx = TransformCtx {
            source_text,
            syntax: &parsed.tree,
            tokens: TokenStream::prepare(parsed.tokens, parsed.comments),
            lines_to_remove: LinesToRemove::default(),
            requires_goog_array: false,
        };

        let mut modified = false;
        for t in &self.transforms {
            if t.run(&mut ctx)? {
                debug!(transform = t.name(), "modified");
                modified = true;
            }
        }

        let mut code = printer::print_tokens(&ctx.tokens);
        if ctx.source_text.ends_with('\n') && !code.is_empty() {
            code.push('\n');
        }
        if ctx.requires_goog_array {
            code = format!("{}\n{code}", printer::GOOG_ARRAY_REQUIRE);
        }
        if opts.add_generated_by_header {
            code = format!("{}\n{code}", printer::generated_by_banner());
        }

        Ok(FixResult { modified, requires_goog_array: ctx.requires_goog_array, code })
    }
}

/// Runs the default pipeline and returns only the code.
pub fn fix(source_text: &str, opts: &FixOptions) -> Result<String, Error> {
    Coffee2Closure::default().fix(source_text, opts.clone()).map(|result| result.code)
}
