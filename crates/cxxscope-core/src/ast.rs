//! The opaque AST interface this core consumes.
//!
//! The parser, and everything that builds declarations from parsed syntax,
//! are external collaborators. This module defines the narrow boundary the
//! core actually needs from them: four operations on an opaque, `Copy` node
//! handle. A production driver supplies its own [`AstNode`] implementation;
//! [`TsNode`] below is a tree-sitter-backed one used by this crate's own
//! integration tests so the engine is exercisable without a real driver
//! existing yet.

use cxxscope_common::Span;
use smol_str::SmolStr;

/// The id-expression shapes `query_id_expression` dispatches on, plus a
/// catch-all for every other node the core holds a handle to but does not
/// itself interpret (expressions it treats as opaque: array sizes, `typeof`
/// operands, dependent-type spellings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    Symbol,
    TemplateId,
    DestructorId,
    OperatorFunctionId,
    ConversionFunctionId,
    QualifiedId,
    QualifiedTemplate,
    QualifiedTemplateId,
    QualifiedOperatorFunctionId,
    /// Anything the core does not need to interpret structurally.
    Other,
}

/// A node handle from the external AST. Implementations are expected to be
/// as cheap as a pointer or index — the core copies these freely.
pub trait AstNode: Copy + Eq + std::fmt::Debug {
    fn kind(self) -> AstKind;
    fn child(self, index: usize) -> Option<Self>;
    fn text(self) -> SmolStr;
    fn source_location(self) -> Span;
}

/// A tree-sitter-cpp node, source buffer attached so `text()` can slice it.
///
/// This is demo/test scaffolding — the production parser is a separate
/// concern — grounded in the same `tree-sitter-cpp` pipeline this
/// workspace's other front ends use to turn source text into a `Tree`.
/// Gated behind the `tree-sitter` feature (on by default for this crate's
/// own tests) so a production driver can depend on this crate without
/// pulling in a parser it doesn't use.
#[cfg(feature = "tree-sitter")]
#[derive(Clone, Copy)]
pub struct TsNode<'a> {
    node: tree_sitter::Node<'a>,
    source: &'a str,
    file: cxxscope_common::SourceId,
}

#[cfg(feature = "tree-sitter")]
impl<'a> TsNode<'a> {
    pub fn new(node: tree_sitter::Node<'a>, source: &'a str, file: cxxscope_common::SourceId) -> Self {
        Self { node, source, file }
    }

    pub fn inner(self) -> tree_sitter::Node<'a> {
        self.node
    }
}

#[cfg(feature = "tree-sitter")]
impl<'a> std::fmt::Debug for TsNode<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TsNode({})", self.node.kind())
    }
}

#[cfg(feature = "tree-sitter")]
impl<'a> PartialEq for TsNode<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }
}
#[cfg(feature = "tree-sitter")]
impl<'a> Eq for TsNode<'a> {}

#[cfg(feature = "tree-sitter")]
impl<'a> AstNode for TsNode<'a> {
    fn kind(self) -> AstKind {
        match self.node.kind() {
            "identifier" | "field_identifier" | "namespace_identifier" | "type_identifier" => {
                AstKind::Symbol
            }
            "template_function" | "template_type" => AstKind::TemplateId,
            "destructor_name" => AstKind::DestructorId,
            "operator_name" => AstKind::OperatorFunctionId,
            "operator_cast" => AstKind::ConversionFunctionId,
            "qualified_identifier" => AstKind::QualifiedId,
            _ => AstKind::Other,
        }
    }

    fn child(self, index: usize) -> Option<Self> {
        self.node
            .child(index as u32)
            .map(|n| TsNode::new(n, self.source, self.file))
    }

    fn text(self) -> SmolStr {
        self.node
            .utf8_text(self.source.as_bytes())
            .map(SmolStr::new)
            .unwrap_or_default()
    }

    fn source_location(self) -> Span {
        let r = self.node.byte_range();
        Span::new(self.file, r.start as u32, r.end as u32)
    }
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use cxxscope_common::SourceMap;
    use tree_sitter::Parser;

    fn parse(source: &'static str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn identifier_node_reports_symbol_kind() {
        let source = "int x;";
        let tree = parse(source);
        let root = tree.root_node();
        // declaration -> init_declarator/identifier depending on grammar version;
        // walk down to the first identifier node.
        let mut cursor = root.walk();
        let mut found = None;
        for n in root.children(&mut cursor) {
            if let Some(id) = find_identifier(n) {
                found = Some(id);
                break;
            }
        }
        let id = found.expect("identifier present in `int x;`");

        let sources = SourceMap::new();
        let file = sources.add_file("test.cpp", source.to_string()).unwrap();
        let wrapped = TsNode::new(id, source, file);
        assert_eq!(wrapped.kind(), AstKind::Symbol);
        assert_eq!(wrapped.text(), "x");
    }

    fn find_identifier(n: tree_sitter::Node) -> Option<tree_sitter::Node> {
        if n.kind() == "identifier" {
            return Some(n);
        }
        let mut cursor = n.walk();
        for child in n.children(&mut cursor) {
            if let Some(found) = find_identifier(child) {
                return Some(found);
            }
        }
        None
    }
}
