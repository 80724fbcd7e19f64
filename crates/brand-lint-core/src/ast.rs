//! Parser-neutral syntax tree consumed by the engine.
//!
//! The engine never parses source text itself. A parser collaborator
//! (see `brand-lint-ts`) lowers its concrete tree into [`SyntaxTree`],
//! keeping only the node kinds brand rules bind to and tagging the rest
//! as [`NodeKind::Other`].

use serde::{Deserialize, Serialize};

use crate::types::Span;

/// Kind of a syntax node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a file.
    Program,
    /// `import ... from "module"`; `value` holds the module specifier.
    ImportDeclaration,
    /// Quoted string; `value` holds the unquoted content.
    StringLiteral,
    /// Backtick template; `value` holds the content between backticks.
    TemplateLiteral,
    /// JSX element; `name` holds the tag name.
    JsxElement,
    /// JSX attribute; `name` holds the attribute name.
    JsxAttribute,
    /// `{ ... }` expression container inside JSX.
    JsxExpression,
    /// Object literal.
    ObjectExpression,
    /// `key: value` pair; `name` holds the key.
    Property,
    /// Function call; `name` holds the callee text.
    CallExpression,
    /// Identifier reference.
    Identifier,
    /// Any node no rule can bind to.
    #[default]
    Other,
}

impl NodeKind {
    /// Node kinds rules may bind handlers to.
    pub const BINDABLE: &'static [Self] = &[
        Self::Program,
        Self::ImportDeclaration,
        Self::StringLiteral,
        Self::TemplateLiteral,
        Self::JsxElement,
        Self::JsxAttribute,
        Self::JsxExpression,
        Self::ObjectExpression,
        Self::Property,
        Self::CallExpression,
        Self::Identifier,
    ];

    /// Canonical binding name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::ImportDeclaration => "ImportDeclaration",
            Self::StringLiteral => "StringLiteral",
            Self::TemplateLiteral => "TemplateLiteral",
            Self::JsxElement => "JsxElement",
            Self::JsxAttribute => "JsxAttribute",
            Self::JsxExpression => "JsxExpression",
            Self::ObjectExpression => "ObjectExpression",
            Self::Property => "Property",
            Self::CallExpression => "CallExpression",
            Self::Identifier => "Identifier",
            Self::Other => "Other",
        }
    }

    /// Resolves a binding name. `Other` is not bindable and yields `None`.
    #[must_use]
    pub fn from_binding(name: &str) -> Option<Self> {
        Self::BINDABLE.iter().copied().find(|k| k.as_str() == name)
    }

    /// Whether this kind is a string-like literal.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Self::StringLiteral | Self::TemplateLiteral)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Node kind.
    pub kind: NodeKind,
    /// Source range.
    pub span: Span,
    /// Raw source text covered by the node.
    pub text: String,
    /// Attribute name, property key, tag name or callee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Literal content or module specifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Child nodes in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Creates a leaf node.
    #[must_use]
    pub fn new(kind: NodeKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            name: None,
            value: None,
            children: Vec::new(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// First direct child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// A parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Root node, normally of kind [`NodeKind::Program`].
    pub root: SyntaxNode,
    /// Full source text the spans refer to.
    pub source: String,
}

impl SyntaxTree {
    /// Creates a tree from its root and source text.
    #[must_use]
    pub fn new(root: SyntaxNode, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}
