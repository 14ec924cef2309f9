//! Typed views over the child layouts rules care about.
//!
//! Each accessor returns `None` when the node is not of the expected kind or
//! its children do not have the expected layout; rules treat that as "not a
//! match" rather than indexing into children blindly.

use super::{Cst, NodeId, NodeKind};

/// `left op right`, for binary and assignment expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryShape {
    pub left: NodeId,
    pub operator: NodeId,
    pub right: NodeId,
}

/// `v++`, `v--`, `++v` or `--v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateShape {
    pub operand: NodeId,
    pub operator: NodeId,
    pub prefix: bool,
}

/// The init slot of a `for` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForInit {
    Empty,
    /// A declaration, which carries its own `;`.
    Declaration(NodeId),
    Expression(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForShape {
    pub init: ForInit,
    pub condition: Option<NodeId>,
    pub update: Option<NodeId>,
    pub body: NodeId,
}

/// `while (condition) body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhileShape {
    pub keyword: NodeId,
    /// The parenthesized clause, parentheses included.
    pub clause: NodeId,
    /// The single expression between the parentheses.
    pub condition: NodeId,
    pub body: NodeId,
}

/// An `if` whose else branch is itself an `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElseIfShape {
    pub else_clause: NodeId,
    pub keyword: NodeId,
    pub nested_if: NodeId,
}

/// Return type and declarator of a function definition or prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionShape {
    pub return_type: NodeId,
    pub declarator: NodeId,
    pub name: Option<NodeId>,
}

/// A `;`-terminated declaration split into specifiers and declarators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationShape {
    /// Children before the first declarator: qualifiers, storage, type.
    pub specifiers: Vec<NodeId>,
    /// Declarators in order, separators excluded.
    pub declarators: Vec<NodeId>,
}

impl Cst {
    /// A grammar token child, matched by both kind and literal text.
    pub fn is_operator(&self, id: NodeId, token: &str) -> bool {
        self.kind(id).is_token(token) && self.text(id) == token
    }

    pub fn binary(&self, id: NodeId) -> Option<BinaryShape> {
        match self.kind(id) {
            NodeKind::BinaryExpression | NodeKind::LogicalExpression => self.triple(id),
            _ => None,
        }
    }

    pub fn assignment(&self, id: NodeId) -> Option<BinaryShape> {
        match self.kind(id) {
            NodeKind::AssignmentExpression => self.triple(id),
            _ => None,
        }
    }

    fn triple(&self, id: NodeId) -> Option<BinaryShape> {
        match *self.children(id) {
            [left, operator, right] => Some(BinaryShape {
                left,
                operator,
                right,
            }),
            _ => None,
        }
    }

    pub fn update(&self, id: NodeId) -> Option<UpdateShape> {
        if self.kind(id) != &NodeKind::UpdateExpression {
            return None;
        }
        let is_step = |c: NodeId| self.is_operator(c, "++") || self.is_operator(c, "--");
        match *self.children(id) {
            [operand, operator] if is_step(operator) => Some(UpdateShape {
                operand,
                operator,
                prefix: false,
            }),
            [operator, operand] if is_step(operator) => Some(UpdateShape {
                operand,
                operator,
                prefix: true,
            }),
            _ => None,
        }
    }

    /// `for ( init ; condition ; update ) body`, with every slot optional.
    pub fn for_header(&self, id: NodeId) -> Option<ForShape> {
        if self.kind(id) != &NodeKind::ForStatement {
            return None;
        }
        let children = self.children(id);
        let (&body, rest) = children.split_last()?;
        let [keyword, open, header @ .., close] = rest else {
            return None;
        };
        if !self.is_operator(*keyword, "for")
            || !self.is_operator(*open, "(")
            || !self.is_operator(*close, ")")
        {
            return None;
        }

        let mut slots: [Vec<NodeId>; 3] = Default::default();
        let mut init = ForInit::Empty;
        let mut slot = 0;
        for &child in header {
            if self.kind(child).is_token(";") {
                slot += 1;
                continue;
            }
            if slot == 0 && self.kind(child) == &NodeKind::Declaration {
                init = ForInit::Declaration(child);
                slot = 1;
                continue;
            }
            if self.kind(child) == &NodeKind::Comment {
                continue;
            }
            slots.get_mut(slot)?.push(child);
        }
        if slot != 2 {
            return None;
        }

        let single = |nodes: &[NodeId]| -> Option<Option<NodeId>> {
            match nodes {
                [] => Some(None),
                [only] => Some(Some(*only)),
                _ => None,
            }
        };
        if let Some(expr) = single(&slots[0])? {
            init = ForInit::Expression(expr);
        }
        Some(ForShape {
            init,
            condition: single(&slots[1])?,
            update: single(&slots[2])?,
            body,
        })
    }

    pub fn while_header(&self, id: NodeId) -> Option<WhileShape> {
        if self.kind(id) != &NodeKind::WhileStatement {
            return None;
        }
        let [keyword, clause, body] = *self.children(id) else {
            return None;
        };
        if !self.is_operator(keyword, "while") {
            return None;
        }
        let condition = match self.kind(clause) {
            NodeKind::ConditionClause | NodeKind::ParenthesizedExpression => {
                match *self.children(clause) {
                    [open, inner, close]
                        if self.is_operator(open, "(") && self.is_operator(close, ")") =>
                    {
                        inner
                    }
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(WhileShape {
            keyword,
            clause,
            condition,
            body,
        })
    }

    pub fn else_if(&self, id: NodeId) -> Option<ElseIfShape> {
        if self.kind(id) != &NodeKind::IfStatement {
            return None;
        }
        let else_clause = self.child_of_kind(id, &NodeKind::ElseClause)?;
        match *self.children(else_clause) {
            [keyword, nested_if]
                if self.is_operator(keyword, "else")
                    && self.kind(nested_if) == &NodeKind::IfStatement =>
            {
                Some(ElseIfShape {
                    else_clause,
                    keyword,
                    nested_if,
                })
            }
            _ => None,
        }
    }

    pub fn function_signature(&self, id: NodeId) -> Option<FunctionShape> {
        if !matches!(
            self.kind(id),
            NodeKind::FunctionDefinition | NodeKind::Declaration
        ) {
            return None;
        }
        let children = self.children(id);
        let at = children
            .iter()
            .position(|&c| self.kind(c) == &NodeKind::FunctionDeclarator)?;
        let declarator = children[at];
        let return_type = children[..at]
            .iter()
            .copied()
            .find(|&c| self.kind(c).is_type_specifier())?;
        let name = self.child(declarator, 0).filter(|&n| {
            matches!(
                self.kind(n),
                NodeKind::Identifier | NodeKind::FieldIdentifier | NodeKind::QualifiedIdentifier
            )
        });
        Some(FunctionShape {
            return_type,
            declarator,
            name,
        })
    }

    pub fn declaration(&self, id: NodeId) -> Option<DeclarationShape> {
        if self.kind(id) != &NodeKind::Declaration {
            return None;
        }
        let (&last, body) = self.children(id).split_last()?;
        if !self.is_operator(last, ";") {
            return None;
        }
        let first = body.iter().position(|&c| self.kind(c).is_declarator())?;
        let declarators: Vec<NodeId> = body[first..]
            .iter()
            .copied()
            .filter(|&c| !self.kind(c).is_token(","))
            .collect();
        if declarators.iter().any(|&d| !self.kind(d).is_declarator()) {
            return None;
        }
        Some(DeclarationShape {
            specifiers: body[..first].to_vec(),
            declarators,
        })
    }
}
