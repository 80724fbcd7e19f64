//! TSX/JSX parser using Tree-sitter.

use std::path::Path;

use brand_lint_core::{NodeKind, Span, SyntaxNode, SyntaxTree};
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::parser::{ParseError, SourceParser};

/// Grammar flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// TypeScript with JSX; also used for `.jsx` and `.js`.
    Tsx,
    /// Plain TypeScript, where `<T>expr` is a type assertion.
    TypeScript,
}

impl Dialect {
    /// Dialect for a file path, by extension. Unknown extensions use TSX.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts" | "mts" | "cts") => Self::TypeScript,
            _ => Self::Tsx,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Tsx => "tsx",
            Self::TypeScript => "typescript",
        }
    }
}

/// Lowers TSX, JSX and TypeScript sources into the engine's syntax tree.
pub struct TsxParser {
    dialect: Dialect,
    language: Language,
}

impl TsxParser {
    /// Creates a TSX parser.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dialect(Dialect::Tsx)
    }

    /// Creates a parser for the given dialect.
    #[must_use]
    pub fn with_dialect(dialect: Dialect) -> Self {
        let language = match dialect {
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        };
        Self { dialect, language }
    }

    /// Creates the parser matching `path`'s extension.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self::with_dialect(Dialect::for_path(path))
    }

    /// The grammar flavor in use.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, ParseError> {
        let dialect = self.dialect.name();
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Language {
                dialect,
                reason: e.to_string(),
            })?;
        parser
            .parse(source, None)
            .ok_or(ParseError::NoTree { dialect })
    }
}

impl Default for TsxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TsxParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsxParser")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl SourceParser for TsxParser {
    fn language_id(&self) -> &'static str {
        self.dialect.name()
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self.dialect {
            Dialect::Tsx => &["tsx", "jsx", "js", "mjs", "cjs"],
            Dialect::TypeScript => &["ts", "mts", "cts"],
        }
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            debug!("Source contains syntax errors; lowering them as Other nodes");
        }
        Ok(SyntaxTree::new(lower(root, source), source))
    }

    fn check_syntax(&self, source: &str) -> Result<(), ParseError> {
        let tree = self.parse_tree(source)?;
        match first_error(tree.root_node()) {
            Some(node) => {
                let at = node.start_position();
                Err(ParseError::Syntax {
                    line: at.row + 1,
                    column: at.column + 1,
                })
            }
            None => Ok(()),
        }
    }
}

fn kind_of(node: &Node<'_>) -> NodeKind {
    if node.is_error() {
        return NodeKind::Other;
    }
    match node.kind() {
        "program" => NodeKind::Program,
        "import_statement" => NodeKind::ImportDeclaration,
        "string" => NodeKind::StringLiteral,
        "template_string" => NodeKind::TemplateLiteral,
        "jsx_element" | "jsx_self_closing_element" => NodeKind::JsxElement,
        "jsx_attribute" => NodeKind::JsxAttribute,
        "jsx_expression" => NodeKind::JsxExpression,
        "object" => NodeKind::ObjectExpression,
        "pair" => NodeKind::Property,
        "call_expression" => NodeKind::CallExpression,
        "identifier" => NodeKind::Identifier,
        _ => NodeKind::Other,
    }
}

fn text<'a>(node: &Node<'_>, src: &'a str) -> &'a str {
    src.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

fn span(node: &Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        (start.row + 1, start.column + 1),
        (end.row + 1, end.column + 1),
        (node.start_byte(), node.end_byte()),
    )
}

/// Strips one pair of matching quotes or backticks.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Unquoted content of `node` when it is a string literal.
fn string_value(node: Option<Node<'_>>, src: &str) -> Option<String> {
    node.filter(|n| n.kind() == "string")
        .map(|n| unquote(text(&n, src)).to_string())
}

fn tag_name(node: &Node<'_>, src: &str) -> Option<String> {
    let tag = if node.kind() == "jsx_element" {
        node.child_by_field_name("open_tag")?
    } else {
        *node
    };
    tag.child_by_field_name("name")
        .map(|n| text(&n, src).to_string())
}

fn lower(node: Node<'_>, src: &str) -> SyntaxNode {
    let kind = kind_of(&node);
    let raw = text(&node, src);
    let mut out = SyntaxNode::new(kind, span(&node), raw);

    match kind {
        NodeKind::ImportDeclaration => {
            out.value = string_value(node.child_by_field_name("source"), src);
        }
        NodeKind::StringLiteral => {
            // Fragments and escapes are not interesting to rules.
            out.value = Some(unquote(raw).to_string());
            return out;
        }
        NodeKind::TemplateLiteral => {
            out.value = Some(unquote(raw).to_string());
        }
        NodeKind::JsxElement => out.name = tag_name(&node, src),
        NodeKind::JsxAttribute => {
            let mut cursor = node.walk();
            let mut named = node.named_children(&mut cursor);
            out.name = named.next().map(|n| text(&n, src).to_string());
            out.value = string_value(named.next(), src);
        }
        NodeKind::Property => {
            out.name = node
                .child_by_field_name("key")
                .map(|k| unquote(text(&k, src)).to_string());
            out.value = string_value(node.child_by_field_name("value"), src);
        }
        NodeKind::CallExpression => {
            out.name = node
                .child_by_field_name("function")
                .map(|f| text(&f, src).to_string());
        }
        NodeKind::Identifier => out.name = Some(raw.to_string()),
        _ => {}
    }

    let mut cursor = node.walk();
    out.children = node
        .named_children(&mut cursor)
        .map(|child| lower(child, src))
        .collect();
    out
}

/// First error or missing node in pre-order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).filter(Node::has_error).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}
