//! `else if` chains as nested blocks.

use super::{RewriteError, Rule, Strategy, SynthContext};
use crate::cst::{Cst, NodeId, Span};

/// `if (a) A else if (b) B else C` → `if (a) A else { if (b) B else C }`.
///
/// Chains are rewritten innermost first, so every `else if` link of a chain
/// ends up wrapped in its own block.
pub struct ElseIfToBlock;

impl Rule for ElseIfToBlock {
    fn name(&self) -> &str {
        "else_if_to_block"
    }

    fn description(&self) -> &str {
        "Wrap the `if` of an `else if` in an explicit block"
    }

    fn strategy(&self) -> Strategy {
        Strategy::Structural
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        cst.else_if(node).is_some()
    }

    fn target(&self, cst: &Cst, node: NodeId) -> Span {
        cst.else_if(node)
            .map_or_else(|| cst.span(node), |shape| cst.span(shape.else_clause))
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let shape = cst
            .else_if(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        Ok(format!(
            "{} {{ {} }}",
            cst.text(shape.keyword),
            cst.text(shape.nested_if)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn wrap(source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0))
            .apply_to_tree(&ElseIfToBlock, &cst)
            .unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn wraps_single_else_if() {
        assert_eq!(
            wrap("void f() { if (a) x(); else if (b) y(); else z(); }"),
            "void f() { if (a) x(); else { if (b) y(); else z(); } }"
        );
    }

    #[test]
    fn wraps_every_link_of_a_chain() {
        assert_eq!(
            wrap("void f() { if (a) x(); else if (b) y(); else if (c) z(); }"),
            "void f() { if (a) x(); else { if (b) y(); else { if (c) z(); } } }"
        );
    }

    #[test]
    fn plain_else_is_untouched() {
        let source = "void f() { if (a) x(); else { y(); } }";
        assert_eq!(wrap(source), source);
    }
}
