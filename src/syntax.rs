//! Read-only syntax tree and the parser boundary.
//!
//! The oxc AST lives in an arena tied to one parse, so the passes never see
//! it directly: it is lowered once into owned [`SyntaxNode`]s, together with
//! the code tokens and comments recovered from the same parse.

use std::ops::ControlFlow;

use oxc_allocator::Allocator;
use oxc_ast::{ast::BindingPattern, AstKind};
use oxc_ast_visit::Visit;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::{GetSpan, SourceType, Span};

use crate::{
    position::{LineIndex, Loc},
    tokens::{Scanner, Token, TokenKind},
    Error,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declarator {
    /// `None` for destructuring patterns.
    pub name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Numeric,
    BigInt,
    RegExp,
    Template,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    VariableDeclaration { declarators: Vec<Declarator> },
    Literal(LiteralKind),
    Other,
}

#[derive(Clone, Debug)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub loc: Loc,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Declared names, when this node is a variable declaration.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        let declarators: &[Declarator] = match &self.kind {
            NodeKind::VariableDeclaration { declarators } => declarators,
            _ => &[],
        };
        declarators.iter().filter_map(|d| d.name.as_deref())
    }
}

/// Walks `node` depth first, children in source order.
///
/// Returns `false` when the visitor broke out; a break stops the whole walk,
/// not just the current subtree.
pub fn traverse<F>(node: &SyntaxNode, visitor: &mut F) -> bool
where
    F: FnMut(&SyntaxNode) -> ControlFlow<()>,
{
    walk(node, visitor).is_continue()
}

fn walk<F>(node: &SyntaxNode, visitor: &mut F) -> ControlFlow<()>
where
    F: FnMut(&SyntaxNode) -> ControlFlow<()>,
{
    visitor(node)?;
    for child in &node.children {
        walk(child, visitor)?;
    }
    ControlFlow::Continue(())
}

/// Everything the passes need from one parse.
#[derive(Debug)]
pub struct ParsedSource {
    pub tree: SyntaxNode,
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
}

pub fn parse(source_text: &str, source_type: SourceType) -> Result<ParsedSource, Error> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source_text, source_type)
        .with_options(ParseOptions { parse_regular_expression: false, ..ParseOptions::default() })
        .parse();

    if let Some(err) = ret.errors.first() {
        return Err(Error::ParseFailed { message: err.to_string() });
    }
    if ret.panicked {
        return Err(Error::ParseFailed { message: "parser gave up".to_string() });
    }

    let line_index = LineIndex::new(source_text);
    let mut builder = TreeBuilder { line_index: &line_index, stack: Vec::new(), literals: Vec::new() };
    builder.visit_program(&ret.program);
    let tree = builder.stack.pop().ok_or_else(|| Error::ParseFailed { message: "empty syntax tree".to_string() })?;

    let comment_spans: Vec<Span> = ret.program.comments.iter().map(|comment| comment.span).collect();
    let mut scanner = Scanner::new(source_text, &line_index);
    let tokens = scanner.scan(&builder.literals, &comment_spans);
    let comments = comment_spans.iter().map(|&span| scanner.comment(span)).collect();

    Ok(ParsedSource { tree, tokens, comments })
}

struct TreeBuilder<'s> {
    line_index: &'s LineIndex<'s>,
    stack: Vec<SyntaxNode>,
    literals: Vec<(Span, TokenKind)>,
}

impl TreeBuilder<'_> {
    fn literal(&mut self, span: Span, literal: LiteralKind) -> NodeKind {
        let kind = match literal {
            LiteralKind::String => TokenKind::String,
            LiteralKind::Numeric | LiteralKind::BigInt => TokenKind::Numeric,
            LiteralKind::RegExp => TokenKind::RegularExpression,
            LiteralKind::Template => TokenKind::Template,
        };
        self.literals.push((span, kind));
        NodeKind::Literal(literal)
    }
}

impl<'a> Visit<'a> for TreeBuilder<'_> {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        let span = kind.span();
        let node_kind = match kind {
            AstKind::Program(_) => NodeKind::Program,
            AstKind::VariableDeclaration(decl) => NodeKind::VariableDeclaration {
                declarators: decl
                    .declarations
                    .iter()
                    .map(|d| Declarator {
                        name: match &d.id {
                            BindingPattern::BindingIdentifier(id) => Some(id.name.to_string()),
                            _ => None,
                        },
                    })
                    .collect(),
            },
            AstKind::StringLiteral(_) => self.literal(span, LiteralKind::String),
            AstKind::NumericLiteral(_) => self.literal(span, LiteralKind::Numeric),
            AstKind::BigIntLiteral(_) => self.literal(span, LiteralKind::BigInt),
            AstKind::RegExpLiteral(_) => self.literal(span, LiteralKind::RegExp),
            AstKind::TemplateLiteral(_) => self.literal(span, LiteralKind::Template),
            _ => NodeKind::Other,
        };
        let loc = self.line_index.loc(span.start, span.end);
        self.stack.push(SyntaxNode { kind: node_kind, loc, children: Vec::new() });
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        if self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                if let Some(parent) = self.stack.last_mut() {
                    parent.children.push(node);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_declarations_with_names_and_lines() {
        let parsed = parse("var a = 1,\n  b = 2;\nf(a);\n", SourceType::cjs()).unwrap();
        let decl = &parsed.tree.children[0];
        assert!(matches!(decl.kind, NodeKind::VariableDeclaration { .. }));
        assert_eq!(decl.declared_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!((decl.loc.start.line, decl.loc.end.line), (1, 2));
    }

    #[test]
    fn tokens_and_comments_come_out_of_one_parse() {
        let parsed = parse("x = 'a' /* b */ + /c/g; // d\n", SourceType::cjs()).unwrap();
        let kinds: Vec<_> = parsed.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Punctuator,
                TokenKind::String,
                TokenKind::Punctuator,
                TokenKind::RegularExpression,
                TokenKind::Punctuator,
            ]
        );
        let comments: Vec<_> = parsed.comments.iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(comments, vec![(TokenKind::BlockComment, " b "), (TokenKind::LineComment, " d")]);
    }

    #[test]
    fn traverse_stops_the_whole_walk_on_break() {
        let parsed = parse("var a = 1;\nfunction f() { var b = 2; }\nvar c = 3;\n", SourceType::cjs()).unwrap();
        let mut seen = Vec::new();
        let completed = traverse(&parsed.tree, &mut |node| {
            let names: Vec<_> = node.declared_names().map(str::to_string).collect();
            if names.is_empty() {
                return ControlFlow::Continue(());
            }
            seen.extend(names);
            if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(!completed);
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn literals_are_lowered_with_their_kind() {
        let parsed = parse("f('a', 1, 2n, /b/, `c`);\n", SourceType::cjs()).unwrap();
        let mut literals = Vec::new();
        traverse(&parsed.tree, &mut |node| {
            if let NodeKind::Literal(kind) = node.kind {
                literals.push((kind, node.loc.start.column));
            }
            ControlFlow::Continue(())
        });
        assert_eq!(
            literals,
            vec![
                (LiteralKind::String, 2),
                (LiteralKind::Numeric, 7),
                (LiteralKind::BigInt, 10),
                (LiteralKind::RegExp, 14),
                (LiteralKind::Template, 19),
            ]
        );
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(parse("var = ;", SourceType::cjs()), Err(Error::ParseFailed { .. })));
    }
}
