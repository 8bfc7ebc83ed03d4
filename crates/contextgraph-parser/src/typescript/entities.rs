// ABOUTME: Entity extraction for interfaces, classes and object type aliases
// ABOUTME: Resolves properties, relation shapes and decorator annotations

use super::decorators::{decorator_name, decorators_of, relation_target, to_annotation};
use super::utils::{annotation_type, has_token, leading_doc, named_children, node_text};
use contextgraph_core::{
    EntityDefinition, EntityKind, EntityMetadata, PropertyDefinition, RelationDefinition,
    RelationKind,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static RELATION_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(OneToOne|OneToMany|ManyToOne|ManyToMany)<\s*([A-Za-z_$][\w$]*)")
        .expect("relation shape pattern is valid")
});

const UNKNOWN_TYPE: &str = "unknown";

/// Top-level declarations of a file, looking through `export` wrappers.
pub fn top_level_declarations<'t>(root: &Node<'t>) -> Vec<Node<'t>> {
    named_children(root)
        .into_iter()
        .filter_map(|stmt| {
            if stmt.kind() == "export_statement" {
                stmt.child_by_field_name("declaration")
            } else {
                Some(stmt)
            }
        })
        .collect()
}

pub fn extract_entities(root: &Node, content: &str, file: &str) -> Vec<EntityDefinition> {
    top_level_declarations(root)
        .iter()
        .filter_map(|decl| entity_from_declaration(decl, content, file))
        .collect()
}

fn entity_from_declaration(decl: &Node, content: &str, file: &str) -> Option<EntityDefinition> {
    let (kind, members, is_abstract) = match decl.kind() {
        "interface_declaration" => (EntityKind::Interface, decl.child_by_field_name("body")?, false),
        "class_declaration" => (EntityKind::Class, decl.child_by_field_name("body")?, false),
        "abstract_class_declaration" => (EntityKind::Class, decl.child_by_field_name("body")?, true),
        "type_alias_declaration" => {
            let value = decl.child_by_field_name("value")?;
            if value.kind() != "object_type" {
                return None;
            }
            (EntityKind::TypeAlias, value, false)
        }
        _ => return None,
    };
    let name = node_text(&decl.child_by_field_name("name")?, content).to_string();

    let mut properties = Vec::new();
    let mut relations = Vec::new();
    for member in named_children(&members) {
        if !matches!(member.kind(), "public_field_definition" | "property_signature") {
            continue;
        }
        let Some(property) = property_of(&member, content) else {
            continue;
        };
        if let Some(relation) = relation_of(&member, &property, content) {
            relations.push(relation);
        }
        properties.push(property);
    }

    let annotations = decorators_of(decl)
        .iter()
        .map(|d| to_annotation(d, content))
        .collect();

    Some(EntityDefinition {
        name,
        kind,
        properties,
        relations,
        doc: leading_doc(decl, content),
        file: file.to_string(),
        metadata: EntityMetadata {
            is_abstract,
            annotations,
        },
    })
}

fn property_of(member: &Node, content: &str) -> Option<PropertyDefinition> {
    let name = node_text(&member.child_by_field_name("name")?, content).to_string();
    Some(PropertyDefinition {
        name,
        type_name: annotation_type(member, content).unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        optional: has_token(member, "?"),
        doc: leading_doc(member, content),
    })
}

/// Relation from the declared type shape, else from a relation decorator.
fn relation_of(
    member: &Node,
    property: &PropertyDefinition,
    content: &str,
) -> Option<RelationDefinition> {
    if let Some(caps) = RELATION_SHAPE.captures(&property.type_name) {
        let kind = RelationKind::from_shape(&caps[1])?;
        return Some(RelationDefinition {
            kind,
            target: caps[2].to_string(),
            property_name: property.name.clone(),
            optional: property.optional,
        });
    }

    decorators_of(member).iter().find_map(|d| {
        let kind = RelationKind::from_shape(&decorator_name(d, content))?;
        let target = relation_target(d, content)?;
        Some(RelationDefinition {
            kind,
            target,
            property_name: property.name.clone(),
            optional: property.optional,
        })
    })
}
