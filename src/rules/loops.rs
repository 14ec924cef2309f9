//! Conversions between `for` and `while` loops.

use super::{RewriteError, Rule, Strategy, SynthContext};
use crate::cst::{Cst, ForInit, NodeId, NodeKind, Span};

/// `for (init; cond; update) body` → `{ init ; while ( cond ) { body update ; } }`.
///
/// A `continue` bound to the loop would skip the moved update, so such loops
/// are left alone.
pub struct ForToWhile;

impl ForToWhile {
    fn has_own_continue(cst: &Cst, body: NodeId) -> bool {
        let mut stack = vec![body];
        while let Some(id) = stack.pop() {
            let kind = cst.kind(id);
            if kind == &NodeKind::ContinueStatement {
                return true;
            }
            if id != body && (kind.is_loop() || kind == &NodeKind::LambdaExpression) {
                continue;
            }
            stack.extend_from_slice(cst.children(id));
        }
        false
    }
}

impl Rule for ForToWhile {
    fn name(&self) -> &str {
        "for_to_while"
    }

    fn description(&self) -> &str {
        "Rewrite a `for` loop as a scoped `while` loop"
    }

    fn strategy(&self) -> Strategy {
        Strategy::Structural
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        cst.for_header(node)
            .is_some_and(|header| !Self::has_own_continue(cst, header.body))
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let header = cst
            .for_header(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;

        let init = match header.init {
            ForInit::Empty => String::new(),
            ForInit::Declaration(decl) => format!("{} ", cst.render_tokens(decl)),
            ForInit::Expression(expr) => format!("{} ; ", cst.text(expr)),
        };
        let condition = header.condition.map_or("true", |c| cst.text(c));
        let body = cst.render_tokens(header.body);
        let body = match header.update {
            Some(update) => format!("{{ {body} {} ; }}", cst.text(update)),
            None => body,
        };
        Ok(format!("{{ {init}while ( {condition} ) {body} }}"))
    }
}

/// `while (cond) body` → `for ( ; cond ; ) body`.
///
/// Only the header is replaced. The trailing `while (cond);` of a `do`
/// loop is never touched.
pub struct WhileToFor;

impl WhileToFor {
    /// The source just before `at` is the closing brace of a `do { … }`
    /// block, i.e. this `while` belongs to a do-while loop.
    fn closes_do_block(cst: &Cst, at: usize) -> bool {
        let root = cst.span(cst.root());
        let Some(before) = cst.original(Span::new(root.start, at)) else {
            return false;
        };
        let before = before.trim_end();
        if !before.ends_with('}') {
            return false;
        }
        let mut depth = 0usize;
        for (i, c) in before.char_indices().rev() {
            match c {
                '}' => depth += 1,
                '{' => {
                    depth -= 1;
                    if depth == 0 {
                        let head = before[..i].trim_end();
                        return head.ends_with("do")
                            && !head[..head.len() - 2]
                                .ends_with(|c: char| c.is_alphanumeric() || c == '_');
                    }
                }
                _ => {}
            }
        }
        false
    }
}

impl Rule for WhileToFor {
    fn name(&self) -> &str {
        "while_to_for"
    }

    fn description(&self) -> &str {
        "Rewrite a `while` loop header as `for ( ; cond ; )`"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        let Some(shape) = cst.while_header(node) else {
            return false;
        };
        cst.kind(shape.condition) != &NodeKind::Declaration
            && !Self::closes_do_block(cst, cst.span(shape.keyword).start)
    }

    fn target(&self, cst: &Cst, node: NodeId) -> Span {
        match cst.while_header(node) {
            Some(shape) => Span::new(cst.span(shape.keyword).start, cst.span(shape.clause).end),
            None => cst.span(node),
        }
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let shape = cst
            .while_header(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        Ok(format!("for ( ; {} ; )", cst.text(shape.condition)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn rewrite(rule: &dyn Rule, source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0)).apply_to_tree(rule, &cst).unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn for_loop_becomes_scoped_while() {
        assert_eq!(
            rewrite(&ForToWhile, "for (int i = 0; i < 10; i++) { sum += i; }"),
            "{ int i = 0 ; while ( i < 10 ) { { sum += i ; } i++ ; } }"
        );
    }

    #[test]
    fn empty_header_slots() {
        assert_eq!(
            rewrite(&ForToWhile, "void f() { for (;;) { g(); } }"),
            "void f() { { while ( true ) { g() ; } } }"
        );
        assert_eq!(
            rewrite(&ForToWhile, "void f() { for (i = 0; i < n;) g(); }"),
            "void f() { { i = 0 ; while ( i < n ) g() ; } }"
        );
    }

    #[test]
    fn loops_with_continue_are_skipped() {
        let source = "void f() { for (int i = 0; i < n; i++) { if (i) continue; g(); } }";
        assert_eq!(rewrite(&ForToWhile, source), source);
    }

    #[test]
    fn continue_in_nested_loop_does_not_block() {
        let source = "void f() { for (int i = 0; i < n; i++) { while (g()) continue; } }";
        let out = rewrite(&ForToWhile, source);
        assert!(out.contains("while ( i < n )"), "{out}");
    }

    #[test]
    fn nested_for_loops_both_convert() {
        let out = rewrite(
            &ForToWhile,
            "void f() { for (int i = 0; i < 2; i++) { for (int j = 0; j < 3; j++) { s += j; } } }",
        );
        assert!(!out.contains("for"), "{out}");
        assert!(out.contains("while ( i < 2 )"), "{out}");
        assert!(out.contains("while ( j < 3 )"), "{out}");
    }

    #[test]
    fn while_header_becomes_for() {
        assert_eq!(
            rewrite(&WhileToFor, "void f() { while (n > 0) { n--; } }"),
            "void f() { for ( ; n > 0 ; ) { n--; } }"
        );
    }

    #[test]
    fn nested_while_headers() {
        assert_eq!(
            rewrite(&WhileToFor, "void f() { while (a) { while (b) g(); } }"),
            "void f() { for ( ; a ; ) { for ( ; b ; ) g(); } }"
        );
    }

    #[test]
    fn do_while_is_untouched() {
        let source = "void f() { do { n--; } while (n > 0); }";
        assert_eq!(rewrite(&WhileToFor, source), source);
    }

    #[test]
    fn condition_declarations_are_untouched() {
        let source = "void f() { while (int c = next()) { use(c); } }";
        assert_eq!(rewrite(&WhileToFor, source), source);
    }
}
