use super::{Cst, NodeId};

impl Cst {
    /// Render a node for inclusion in synthesized code.
    ///
    /// Statement-level nodes are re-emitted token by token, separated by
    /// single spaces; expressions, leaves and anything already rewritten in
    /// this pass contribute their current text. Line comments and
    /// preprocessor lines are terminated with a newline so they cannot
    /// swallow the tokens that follow them.
    pub fn render_tokens(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if node.kind().is_statement() && !node.is_rewritten() && !self.is_leaf(id) {
            for &child in node.children() {
                self.render_into(child, out);
            }
        } else {
            push_piece(out, self.text(id).trim());
        }
    }
}

fn push_piece(out: &mut String, piece: &str) {
    if piece.is_empty() {
        return;
    }
    let directive = piece.starts_with('#');
    if !out.is_empty() && !out.ends_with('\n') {
        out.push(if directive { '\n' } else { ' ' });
    }
    out.push_str(piece);
    if directive || piece.starts_with("//") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use crate::cst::{CstBuilder, Span};

    /// `{ sum += i; }`
    fn block() -> crate::cst::Cst {
        let source = "{ sum += i; }";
        let mut b = CstBuilder::new(source, "compound_statement", Span::new(0, 13));
        let root = b.root();
        b.push(root, "{", Span::new(0, 1));
        let stmt = b.push(root, "expression_statement", Span::new(2, 11));
        let assign = b.push(stmt, "assignment_expression", Span::new(2, 10));
        b.push(assign, "identifier", Span::new(2, 5));
        b.push(assign, "+=", Span::new(6, 8));
        b.push(assign, "identifier", Span::new(9, 10));
        b.push(stmt, ";", Span::new(10, 11));
        b.push(root, "}", Span::new(12, 13));
        b.finish().unwrap()
    }

    #[test]
    fn statements_render_as_spaced_tokens() {
        let cst = block();
        assert_eq!(cst.render_tokens(cst.root()), "{ sum += i ; }");
    }

    #[test]
    fn line_comments_end_the_line() {
        let source = "{ // note\n}";
        let mut b = CstBuilder::new(source, "compound_statement", Span::new(0, 11));
        let root = b.root();
        b.push(root, "{", Span::new(0, 1));
        b.push(root, "comment", Span::new(2, 9));
        b.push(root, "}", Span::new(10, 11));
        let cst = b.finish().unwrap();
        assert_eq!(cst.render_tokens(cst.root()), "{ // note\n}");
    }
}
