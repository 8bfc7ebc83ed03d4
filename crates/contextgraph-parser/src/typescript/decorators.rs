// ABOUTME: Decorator discovery and literal-argument flattening
// ABOUTME: Turns `@Name(args)` into annotations and relation hints

use super::utils::{children, named_children, node_text, string_literal};
use contextgraph_core::Annotation;
use serde_json::Value;
use std::collections::HashSet;
use tree_sitter::Node;

/// Decorators attached to a declaration, wherever the grammar placed them:
/// as children, on the wrapping `export` statement, or as preceding
/// siblings inside a class body.
pub fn decorators_of<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut found: Vec<Node<'t>> = Vec::new();

    let exported = node
        .parent()
        .filter(|parent| parent.kind() == "export_statement");
    if let Some(parent) = exported {
        found.extend(children(&parent).into_iter().filter(|c| c.kind() == "decorator"));
    }

    let mut preceding = Vec::new();
    let mut prev = node.prev_named_sibling();
    while let Some(p) = prev {
        if p.kind() != "decorator" {
            break;
        }
        preceding.push(p);
        prev = p.prev_named_sibling();
    }
    preceding.reverse();
    found.extend(preceding);

    found.extend(children(node).into_iter().filter(|c| c.kind() == "decorator"));

    // The export statement's decorators are also the declaration's preceding siblings.
    let mut seen = HashSet::new();
    found.retain(|d| seen.insert(d.id()));
    found
}

/// The call or reference inside a decorator, e.g. the `Injectable()` of `@Injectable()`.
fn decorator_expression<'t>(decorator: &Node<'t>) -> Option<Node<'t>> {
    named_children(decorator).into_iter().next()
}

/// Final identifier of the decorator: `@Injectable()` and `@nest.Injectable`
/// are both `Injectable`.
pub fn decorator_name(decorator: &Node, content: &str) -> String {
    let Some(expr) = decorator_expression(decorator) else {
        return String::new();
    };
    let callee = match expr.kind() {
        "call_expression" => expr.child_by_field_name("function").unwrap_or(expr),
        "parenthesized_expression" => expr,
        _ => expr,
    };
    let text = node_text(&callee, content);
    text.rsplit('.').next().unwrap_or(text).trim().to_string()
}

/// Argument list of a called decorator.
pub fn decorator_arguments<'t>(decorator: &Node<'t>) -> Vec<Node<'t>> {
    match decorator_expression(decorator) {
        Some(expr) if expr.kind() == "call_expression" => expr
            .child_by_field_name("arguments")
            .map(|args| named_children(&args))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn has_decorator(node: &Node, content: &str, names: &[String]) -> bool {
    decorators_of(node)
        .iter()
        .any(|d| names.iter().any(|n| *n == decorator_name(d, content)))
}

pub fn to_annotation(decorator: &Node, content: &str) -> Annotation {
    let mut arguments = Vec::new();
    for arg in decorator_arguments(decorator) {
        flatten_literals(&arg, content, &mut arguments);
    }
    Annotation {
        name: decorator_name(decorator, content),
        arguments,
    }
}

/// Collects literal values found anywhere in `node`, depth first.
/// Object keys are not literals of interest and are skipped.
pub fn flatten_literals(node: &Node, content: &str, out: &mut Vec<Value>) {
    match node.kind() {
        "string" => out.push(Value::String(string_literal(node, content))),
        "template_string" => {
            if !named_children(node)
                .iter()
                .any(|c| c.kind() == "template_substitution")
            {
                out.push(Value::String(string_literal(node, content)));
            }
        }
        "number" => out.push(number_value(node_text(node, content))),
        "true" => out.push(Value::Bool(true)),
        "false" => out.push(Value::Bool(false)),
        "null" => out.push(Value::Null),
        "pair" => {
            if let Some(value) = node.child_by_field_name("value") {
                flatten_literals(&value, content, out);
            }
        }
        _ => {
            for child in named_children(node) {
                flatten_literals(&child, content, out);
            }
        }
    }
}

fn number_value(text: &str) -> Value {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Ok(i) = cleaned.parse::<i64>() {
        return Value::from(i);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::String(cleaned))
}

/// Target of a decorator-style relation such as `@ManyToOne(() => User)`.
pub fn relation_target(decorator: &Node, content: &str) -> Option<String> {
    let first = decorator_arguments(decorator).into_iter().next()?;
    match first.kind() {
        "arrow_function" => {
            let body = first.child_by_field_name("body")?;
            match body.kind() {
                "identifier" | "member_expression" => {
                    let text = node_text(&body, content);
                    Some(text.rsplit('.').next().unwrap_or(text).to_string())
                }
                _ => None,
            }
        }
        "identifier" => Some(node_text(&first, content).to_string()),
        "string" => Some(string_literal(&first, content)),
        _ => None,
    }
}
