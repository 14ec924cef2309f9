use std::fmt;

macro_rules! grammar_kinds {
    ($($variant:ident => $name:literal,)+) => {
        /// Node kinds of the C/C++ grammar that rewrite rules inspect.
        ///
        /// Everything else (anonymous tokens such as `(`, `+=` or `for`
        /// included) is carried verbatim in [`NodeKind::Other`]; every
        /// `preproc_*` kind collapses into [`NodeKind::Preproc`].
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)+
            Preproc(String),
            Other(String),
        }

        impl NodeKind {
            /// Map a grammar kind name onto its variant.
            pub fn from_grammar(name: &str) -> Self {
                match name {
                    $($name => NodeKind::$variant,)+
                    other if other.starts_with("preproc_") => NodeKind::Preproc(other.to_string()),
                    other => NodeKind::Other(other.to_string()),
                }
            }

            /// The grammar kind name, as written in persisted trees.
            pub fn as_str(&self) -> &str {
                match self {
                    $(NodeKind::$variant => $name,)+
                    NodeKind::Preproc(name) | NodeKind::Other(name) => name,
                }
            }
        }
    };
}

grammar_kinds! {
    TranslationUnit => "translation_unit",
    FunctionDefinition => "function_definition",
    FunctionDeclarator => "function_declarator",
    Declaration => "declaration",
    FieldDeclaration => "field_declaration",
    InitDeclarator => "init_declarator",
    PointerDeclarator => "pointer_declarator",
    ReferenceDeclarator => "reference_declarator",
    ArrayDeclarator => "array_declarator",
    InitializerList => "initializer_list",
    ArgumentList => "argument_list",
    ParameterList => "parameter_list",
    PrimitiveType => "primitive_type",
    TypeIdentifier => "type_identifier",
    SizedTypeSpecifier => "sized_type_specifier",
    TemplateType => "template_type",
    QualifiedIdentifier => "qualified_identifier",
    TypeQualifier => "type_qualifier",
    StorageClassSpecifier => "storage_class_specifier",
    TemplateArgumentList => "template_argument_list",
    TemplateParameterList => "template_parameter_list",
    Identifier => "identifier",
    FieldIdentifier => "field_identifier",
    NumberLiteral => "number_literal",
    BinaryExpression => "binary_expression",
    LogicalExpression => "logical_expression",
    AssignmentExpression => "assignment_expression",
    UpdateExpression => "update_expression",
    UnaryExpression => "unary_expression",
    CallExpression => "call_expression",
    SubscriptExpression => "subscript_expression",
    SubscriptArgumentList => "subscript_argument_list",
    FieldExpression => "field_expression",
    PointerExpression => "pointer_expression",
    ParenthesizedExpression => "parenthesized_expression",
    ConditionalExpression => "conditional_expression",
    CommaExpression => "comma_expression",
    LambdaExpression => "lambda_expression",
    CompoundStatement => "compound_statement",
    ExpressionStatement => "expression_statement",
    ReturnStatement => "return_statement",
    IfStatement => "if_statement",
    ElseClause => "else_clause",
    ConditionClause => "condition_clause",
    ForStatement => "for_statement",
    ForRangeLoop => "for_range_loop",
    WhileStatement => "while_statement",
    DoStatement => "do_statement",
    SwitchStatement => "switch_statement",
    CaseStatement => "case_statement",
    ContinueStatement => "continue_statement",
    Comment => "comment",
}

impl NodeKind {
    /// Anonymous token or unrecognized kind with exactly this name.
    pub fn is_token(&self, token: &str) -> bool {
        matches!(self, NodeKind::Other(name) if name == token)
    }

    pub fn is_preproc(&self) -> bool {
        matches!(self, NodeKind::Preproc(_))
    }

    /// Loop constructs that own `continue`/`break` statements in their body.
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::ForStatement
                | NodeKind::ForRangeLoop
                | NodeKind::WhileStatement
                | NodeKind::DoStatement
        )
    }

    /// Statement-level nodes, re-rendered token by token when they are
    /// moved into synthesized code.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Declaration | NodeKind::ElseClause | NodeKind::ForRangeLoop
        ) || self.as_str().ends_with("_statement")
    }

    /// Declarator kinds that name the entity introduced by a declaration.
    pub fn is_declarator(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier
                | NodeKind::FieldIdentifier
                | NodeKind::InitDeclarator
                | NodeKind::PointerDeclarator
                | NodeKind::ReferenceDeclarator
                | NodeKind::ArrayDeclarator
                | NodeKind::FunctionDeclarator
        )
    }

    /// Type specifier kinds that can stand as a function's return type.
    pub fn is_type_specifier(&self) -> bool {
        matches!(
            self,
            NodeKind::PrimitiveType
                | NodeKind::TypeIdentifier
                | NodeKind::SizedTypeSpecifier
                | NodeKind::QualifiedIdentifier
                | NodeKind::TemplateType
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_kinds_round_trip() {
        for name in ["for_statement", "number_literal", "else_clause", "translation_unit"] {
            assert_eq!(NodeKind::from_grammar(name).as_str(), name);
        }
    }

    #[test]
    fn tokens_and_preprocessor_kinds() {
        assert!(NodeKind::from_grammar("+=").is_token("+="));
        assert!(!NodeKind::from_grammar("+=").is_token("-="));
        assert!(NodeKind::from_grammar("preproc_ifdef").is_preproc());
        assert_eq!(
            NodeKind::from_grammar("preproc_def"),
            NodeKind::Preproc("preproc_def".to_string())
        );
    }

    #[test]
    fn statement_classification() {
        assert!(NodeKind::CompoundStatement.is_statement());
        assert!(NodeKind::Declaration.is_statement());
        assert!(NodeKind::from_grammar("break_statement").is_statement());
        assert!(!NodeKind::BinaryExpression.is_statement());
    }
}
