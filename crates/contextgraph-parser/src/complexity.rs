// ABOUTME: Cyclomatic-style complexity from tree-sitter TypeScript syntax trees
// ABOUTME: Counts branch, loop, conditional, catch and case constructs in one walk

use tree_sitter::Node;

/// Complexity of a subtree: `1 + count(decision_points)`.
///
/// Decision points are `if`, `for`, `for…in/of`, `while`, `do`, ternaries,
/// `catch` clauses and `case` labels.
pub fn calculate_cyclomatic_complexity(node: &Node) -> u32 {
    1 + count_decision_points(node)
}

/// Iterative walk so deeply nested files cannot exhaust the call stack.
fn count_decision_points(root: &Node) -> u32 {
    let mut count = 0;
    let mut cursor = root.walk();
    loop {
        if is_decision_point(cursor.node().kind()) {
            count += 1;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == *root {
                return count;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return count;
            }
        }
    }
}

fn is_decision_point(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "for_statement"
            | "for_in_statement"
            | "while_statement"
            | "do_statement"
            | "ternary_expression"
            | "catch_clause"
            | "switch_case"
    )
}
