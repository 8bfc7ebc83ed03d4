// ABOUTME: Shared helpers for walking tree-sitter TypeScript nodes
// ABOUTME: Text access, child lookup, type annotation and doc comment handling

use tree_sitter::Node;

#[inline]
pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
    node.utf8_text(content.as_bytes()).unwrap_or("")
}

pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn child_by_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

/// Whether an anonymous token such as `?`, `async` or `default` is a direct child.
pub fn has_token(node: &Node, token: &str) -> bool {
    children(node)
        .iter()
        .any(|c| !c.is_named() && c.kind() == token)
}

pub fn field_text(node: &Node, field: &str, content: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| node_text(&child, content).to_string())
}

/// Strips the quotes of a string literal node.
pub fn string_literal(node: &Node, content: &str) -> String {
    let text = node_text(node, content);
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// Text of the type inside a `type_annotation` (without the leading `:`).
pub fn annotation_type(node: &Node, content: &str) -> Option<String> {
    let annotation = node.child_by_field_name("type")?;
    Some(type_annotation_text(&annotation, content))
}

pub fn type_annotation_text(annotation: &Node, content: &str) -> String {
    if annotation.kind() == "type_annotation" {
        if let Some(inner) = named_children(annotation).into_iter().next() {
            return node_text(&inner, content).trim().to_string();
        }
    }
    node_text(annotation, content)
        .trim_start_matches(':')
        .trim()
        .to_string()
}

/// The symbol a type refers to: `Repository<User>` is `Repository`,
/// `ns.Logger` is `Logger`. Other shapes yield their full text.
pub fn type_symbol(type_node: &Node, content: &str) -> String {
    match type_node.kind() {
        "type_annotation" => match named_children(type_node).into_iter().next() {
            Some(inner) => type_symbol(&inner, content),
            None => String::new(),
        },
        "generic_type" => match type_node.child_by_field_name("name") {
            Some(name) => type_symbol(&name, content),
            None => node_text(type_node, content).to_string(),
        },
        "nested_type_identifier" | "member_expression" => {
            let text = node_text(type_node, content);
            text.rsplit('.').next().unwrap_or(text).trim().to_string()
        }
        _ => node_text(type_node, content).trim().to_string(),
    }
}

/// Declaration node used as the anchor for leading comments and decorators.
pub fn statement_anchor<'t>(node: &Node<'t>) -> Node<'t> {
    match node.parent() {
        Some(parent) if parent.kind() == "export_statement" => parent,
        _ => *node,
    }
}

/// Nearest preceding `/** … */` comment, skipping decorators in between.
pub fn leading_doc(node: &Node, content: &str) -> Option<String> {
    let anchor = statement_anchor(node);
    let mut prev = anchor.prev_sibling();
    while let Some(p) = prev {
        match p.kind() {
            "decorator" => prev = p.prev_sibling(),
            "comment" => {
                let text = node_text(&p, content);
                return if text.starts_with("/**") {
                    clean_doc(text)
                } else {
                    None
                };
            }
            _ => return None,
        }
    }
    None
}

fn clean_doc(raw: &str) -> Option<String> {
    let body = raw.trim_start_matches("/**").trim_end_matches("*/");
    let lines: Vec<&str> = body
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_doc_strips_markers() {
        let doc = clean_doc("/**\n * Finds users.\n *\n * @param id user id\n */");
        assert_eq!(doc.as_deref(), Some("Finds users.\n@param id user id"));
        assert_eq!(clean_doc("/** */"), None);
        assert_eq!(clean_doc("/** One line */").as_deref(), Some("One line"));
    }
}
