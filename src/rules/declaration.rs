//! `T a = 1, b = 2;` → `T a, b; a = 1; b = 2;`.

use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};

/// Specifier words whose variables must be initialized where declared, or
/// whose type depends on the initializer.
const BINDING_SPECIFIERS: [&str; 9] = [
    "const",
    "constexpr",
    "consteval",
    "constinit",
    "static",
    "extern",
    "thread_local",
    "auto",
    "decltype",
];

/// Callees that look like types but are ordinary functions.
const KNOWN_FUNCTIONS: [&str; 15] = [
    "GCD", "gcd", "min", "max", "abs", "sin", "cos", "tan", "sqrt", "pow", "log", "exp", "floor",
    "ceil", "round",
];

/// How one declarator fares when the declaration is split.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Declarator<'a> {
    /// Stays in the declaration as written.
    Keep { text: &'a str, initialized: bool },
    /// Declared bare, initialized by a following assignment.
    Split { name: &'a str, value: &'a str },
}

pub struct DeclarationSplit;

impl DeclarationSplit {
    fn specifiers_allow_split(cst: &Cst, specifiers: &[NodeId]) -> bool {
        specifiers.iter().all(|&s| {
            let text = cst.text(s);
            let binds = text
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .any(|word| BINDING_SPECIFIERS.contains(&word));
            let indirect = text.contains(['&', '*']);
            let complex_template =
                text.contains('<') && (text.matches('<').count() > 1 || text.contains(','));
            !(binds || indirect || complex_template)
        })
    }

    /// `Type(...)` or `ns::make(...)`: construction whose side effects should
    /// not move away from the declaration.
    fn is_constructor_call(cst: &Cst, value: NodeId) -> bool {
        if cst.kind(value) != &NodeKind::CallExpression {
            return false;
        }
        let Some(callee) = cst.child(value, 0) else {
            return false;
        };
        let callee = cst.text(callee);
        (callee.starts_with(|c: char| c.is_ascii_uppercase()) || callee.contains("::"))
            && !KNOWN_FUNCTIONS.contains(&callee)
    }

    fn classify<'a>(cst: &'a Cst, declarator: NodeId) -> Declarator<'a> {
        let keep = |initialized| Declarator::Keep {
            text: cst.text(declarator),
            initialized,
        };
        if cst.kind(declarator) != &NodeKind::InitDeclarator {
            return keep(false);
        }
        match *cst.children(declarator) {
            [name, equals, value]
                if cst.kind(name) == &NodeKind::Identifier
                    && cst.is_operator(equals, "=")
                    && cst.kind(value) != &NodeKind::InitializerList
                    && !Self::is_constructor_call(cst, value) =>
            {
                Declarator::Split {
                    name: cst.text(name),
                    value: cst.text(value),
                }
            }
            _ => keep(true),
        }
    }

    fn plan<'a>(cst: &'a Cst, node: NodeId) -> Option<(Vec<NodeId>, Vec<Declarator<'a>>)> {
        let shape = cst.declaration(node)?;
        if !Self::specifiers_allow_split(cst, &shape.specifiers) {
            return None;
        }
        let declarators: Vec<_> = shape
            .declarators
            .iter()
            .map(|&d| Self::classify(cst, d))
            .collect();

        // A kept initializer after a split one would now run first.
        let first_split = declarators
            .iter()
            .position(|d| matches!(d, Declarator::Split { .. }))?;
        let reordered = declarators[first_split..]
            .iter()
            .any(|d| matches!(d, Declarator::Keep { initialized: true, .. }));
        if reordered {
            return None;
        }
        // A kept declarator reading a split name (`int n = 5, a[n];`) would
        // see it before its assignment.
        let mut split_names = Vec::new();
        for (&node, declarator) in shape.declarators.iter().zip(&declarators) {
            match declarator {
                Declarator::Split { name, .. } => split_names.push(*name),
                Declarator::Keep { .. } => {
                    let reads_split = cst
                        .descendants(node)
                        .filter(|&id| cst.kind(id) == &NodeKind::Identifier)
                        .any(|id| split_names.contains(&cst.text(id)));
                    if reads_split {
                        return None;
                    }
                }
            }
        }
        Some((shape.specifiers, declarators))
    }
}

impl Rule for DeclarationSplit {
    fn name(&self) -> &str {
        "declaration_split"
    }

    fn description(&self) -> &str {
        "Move initializers out of a local declaration into assignments"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        cst.kind(node) == &NodeKind::Declaration
            && cst
                .parent(node)
                .is_some_and(|p| cst.kind(p) == &NodeKind::CompoundStatement)
            && Self::plan(cst, node).is_some()
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let (specifiers, declarators) =
            Self::plan(cst, node).ok_or_else(|| RewriteError::shape(cst, node))?;

        let specifiers: Vec<&str> = specifiers.iter().map(|&s| cst.text(s)).collect();
        let names: Vec<&str> = declarators
            .iter()
            .map(|d| match d {
                Declarator::Keep { text, .. } => *text,
                Declarator::Split { name, .. } => *name,
            })
            .collect();

        let mut out = format!("{} {};", specifiers.join(" "), names.join(", "));
        for declarator in &declarators {
            if let Declarator::Split { name, value } = declarator {
                out.push_str(&format!(" {name} = {value};"));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn split(source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0))
            .apply_to_tree(&DeclarationSplit, &cst)
            .unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn splits_single_initializer() {
        assert_eq!(
            split("void f() { int x = 5; }"),
            "void f() { int x; x = 5; }"
        );
    }

    #[test]
    fn splits_many_declarators_in_order() {
        assert_eq!(
            split("void f() { int a = 1, b, c = a + 2; }"),
            "void f() { int a, b, c; a = 1; c = a + 2; }"
        );
    }

    #[test]
    fn binding_qualifiers_are_left_alone() {
        for source in [
            "void f() { const int x = 5; }",
            "void f() { static int x = 5; }",
            "void f() { constexpr int x = 5; }",
            "void f() { auto x = 5; }",
            "void f() { int &r = x; }",
            "void f() { int *p = &x; }",
            "void f() { int a[3] = {1, 2, 3}; }",
            "void f() { std::vector<int> v = {1, 2}; }",
            "void f() { std::map<int, int> m = make(); }",
            "void f() { Point p = Point(1, 2); }",
        ] {
            assert_eq!(split(source), source, "{source}");
        }
    }

    #[test]
    fn math_calls_are_not_constructors() {
        assert_eq!(
            split("void f() { double r = sqrt(x); }"),
            "void f() { double r; r = sqrt(x); }"
        );
    }

    #[test]
    fn kept_initializer_after_split_blocks() {
        let source = "void f() { int a = 1, *p = &a; }";
        assert_eq!(split(source), source);
        assert_eq!(
            split("void f() { int *p = &a, b = 2; }"),
            "void f() { int *p = &a, b; b = 2; }"
        );
    }

    #[test]
    fn kept_declarator_reading_a_split_name_blocks() {
        let source = "void f() { int n = 5, arr[n]; }";
        assert_eq!(split(source), source);
        assert_eq!(
            split("void f() { int m, n = 5, arr[m]; }"),
            "void f() { int m, n, arr[m]; n = 5; }"
        );
    }

    #[test]
    fn only_block_scope_declarations() {
        for source in [
            "int g = 1;",
            "void f() { for (int i = 0; i < n; i++) {} }",
            "struct S { int x = 1; };",
        ] {
            assert_eq!(split(source), source, "{source}");
        }
    }
}
