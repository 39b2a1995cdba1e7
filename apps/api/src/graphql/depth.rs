//! Query depth guard
//!
//! Runs on the parsed document before execution. Depth counts nesting
//! levels: root fields sit at level 0 and every field below a selection set
//! is one level deeper. Fragment spreads and inline fragments are inlined
//! and add no level of their own. Introspection fields (`__schema`,
//! `__type`, ...) count at their own level but are not descended into.
//!
//! Each fragment body is measured once and reused at every spread, so the
//! check is linear in the size of the document. Spreads that form a cycle
//! contribute nothing; validation reports the cycle itself.

use std::collections::{HashMap, HashSet};

use async_graphql::parser::types::{ExecutableDocument, FragmentDefinition, Selection, SelectionSet};
use async_graphql::{ErrorExtensionValues, Name, Pos, Positioned, ServerError};

/// An operation nested deeper than allowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthViolation {
    /// Operation name, `None` for an anonymous operation
    pub operation: Option<String>,
    /// Measured depth of the operation
    pub depth: usize,
    pub max_depth: usize,
    /// Position of the operation in the document
    pub pos: Pos,
}

impl DepthViolation {
    pub fn message(&self) -> String {
        format!(
            "'{}' exceeds maximum operation depth of {}",
            self.operation.as_deref().unwrap_or("anonymous"),
            self.max_depth
        )
    }
}

impl From<DepthViolation> for ServerError {
    fn from(violation: DepthViolation) -> Self {
        let mut err = ServerError::new(violation.message(), Some(violation.pos));
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("code", "DEPTH_LIMIT_EXCEEDED");
        extensions.set("depth", violation.depth as u64);
        err.extensions = Some(extensions);
        err
    }
}

/// Check every operation in `document` against `max_depth`
///
/// Returns one violation per offending operation, in document order.
pub fn check_depth(document: &ExecutableDocument, max_depth: usize) -> Vec<DepthViolation> {
    let mut walker = DepthWalker {
        fragments: &document.fragments,
        memo: HashMap::new(),
        visiting: HashSet::new(),
    };

    let mut violations = Vec::new();
    for (name, operation) in document.operations.iter() {
        let depth = walker
            .selection_set(&operation.node.selection_set.node)
            .unwrap_or(0);
        if depth > max_depth {
            violations.push(DepthViolation {
                operation: name.map(|n| n.to_string()),
                depth,
                max_depth,
                pos: operation.pos,
            });
        }
    }
    violations.sort_by_key(|v| (v.pos.line, v.pos.column));
    violations
}

/// Measures selection sets relative to their own level
struct DepthWalker<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    memo: HashMap<&'a Name, Option<usize>>,
    visiting: HashSet<&'a Name>,
}

impl<'a> DepthWalker<'a> {
    /// Deepest level reached below `set`, `None` if nothing is selected
    fn selection_set(&mut self, set: &'a SelectionSet) -> Option<usize> {
        set.items
            .iter()
            .filter_map(|item| self.selection(&item.node))
            .max()
    }

    fn selection(&mut self, selection: &'a Selection) -> Option<usize> {
        match selection {
            Selection::Field(field) => {
                let field = &field.node;
                let children = &field.selection_set.node;
                if field.name.node.as_str().starts_with("__") || children.items.is_empty() {
                    return Some(0);
                }
                Some(1 + self.selection_set(children).unwrap_or(0))
            }
            Selection::FragmentSpread(spread) => self.fragment(&spread.node.fragment_name.node),
            Selection::InlineFragment(inline) => self.selection_set(&inline.node.selection_set.node),
        }
    }

    fn fragment(&mut self, name: &'a Name) -> Option<usize> {
        if let Some(depth) = self.memo.get(name) {
            return *depth;
        }
        // Unknown fragments are left to validation
        let definition = self.fragments.get(name)?;
        if !self.visiting.insert(name) {
            return None;
        }

        let depth = self.selection_set(&definition.node.selection_set.node);

        self.visiting.remove(name);
        self.memo.insert(name, depth);
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::parser::parse_query;
    use rstest::rstest;

    fn depth_violations(query: &str, max_depth: usize) -> Vec<DepthViolation> {
        let document = parse_query(query).unwrap();
        check_depth(&document, max_depth)
    }

    const SIX_LEVELS: &str = "{ users { userSubscribedTo { userSubscribedTo { userSubscribedTo \
                              { userSubscribedTo { subscribedToUser { id } } } } } } }";

    #[rstest]
    #[case::flat("{ users { id name } }", 1)]
    #[case::leaf_root("{ memberTypes { id } posts { id } }", 1)]
    #[case::two_levels("{ users { id posts { title } } }", 2)]
    #[case::six_levels(SIX_LEVELS, 6)]
    #[case::fragment_adds_no_level(
        "{ users { ...F } } fragment F on User { posts { title } }",
        2
    )]
    #[case::inline_fragment("{ users { ... on User { profile { id } } } }", 2)]
    #[case::introspection_not_descended("{ __schema { types { fields { name } } } }", 0)]
    fn test_measured_depth(#[case] query: &str, #[case] expected: usize) {
        let at_bound = depth_violations(query, expected);
        assert!(at_bound.is_empty(), "depth {} should be allowed", expected);

        if expected > 0 {
            let below = depth_violations(query, expected - 1);
            assert_eq!(below.len(), 1);
            assert_eq!(below[0].depth, expected);
        }
    }

    #[test]
    fn test_six_levels_exceed_default_bound() {
        let violations = depth_violations(SIX_LEVELS, 5);

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message(),
            "'anonymous' exceeds maximum operation depth of 5"
        );
    }

    #[test]
    fn test_named_operation_in_message() {
        let violations = depth_violations(
            "query Deep { users { posts { id } } } query Shallow { users { id } }",
            1,
        );

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].operation.as_deref(), Some("Deep"));
        assert_eq!(
            violations[0].message(),
            "'Deep' exceeds maximum operation depth of 1"
        );
    }

    #[test]
    fn test_shared_fragment_measured_at_each_spread() {
        let query = "
            { users { ...Leaf userSubscribedTo { ...Leaf } } }
            fragment Leaf on User { profile { memberType { id } } }
        ";

        let violations = depth_violations(query, 3);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].depth, 4);
    }

    #[test]
    fn test_cyclic_fragments_terminate() {
        let query = "
            { users { ...A } }
            fragment A on User { userSubscribedTo { ...B } }
            fragment B on User { subscribedToUser { ...A } }
        ";

        assert!(depth_violations(query, 5).is_empty());
    }

    #[test]
    fn test_unknown_fragment_adds_nothing() {
        let violations = depth_violations("{ users { ...Missing } }", 0);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].depth, 1);
    }

    #[test]
    fn test_violation_converts_to_server_error() {
        let violation = depth_violations(SIX_LEVELS, 5).remove(0);
        let err = ServerError::from(violation);

        assert_eq!(err.message, "'anonymous' exceeds maximum operation depth of 5");
        assert_eq!(err.locations.len(), 1);
        assert!(err.extensions.is_some());
    }
}
