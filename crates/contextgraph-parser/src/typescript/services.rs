// ABOUTME: Injectable service extraction: methods, constructor dependencies
// ABOUTME: and per-class complexity; file-level facts are filled in by the caller

use super::decorators::{decorator_name, decorators_of, has_decorator};
use super::entities::top_level_declarations;
use super::utils::{
    annotation_type, child_by_kind, has_token, leading_doc, named_children, node_text,
    type_annotation_text, type_symbol,
};
use crate::complexity::calculate_cyclomatic_complexity;
use contextgraph_core::{
    MethodDefinition, ParameterDefinition, ServiceDefinition, ServiceDependency, ServiceMetadata,
    ServiceMetrics, Visibility,
};
use tree_sitter::Node;

const UNKNOWN_TYPE: &str = "unknown";
const CONSTRUCTOR: &str = "constructor";
const OPTIONAL_DECORATOR: &str = "Optional";

/// Services declared in a file. `has_tests` and `coverage` are left at their
/// defaults; they depend on the surrounding tree, not on the syntax.
pub fn extract_services(
    root: &Node,
    content: &str,
    file: &str,
    injectable_decorators: &[String],
) -> Vec<ServiceDefinition> {
    top_level_declarations(root)
        .iter()
        .filter(|decl| matches!(decl.kind(), "class_declaration" | "abstract_class_declaration"))
        .filter(|decl| has_decorator(decl, content, injectable_decorators))
        .filter_map(|decl| service_from_class(decl, content, file))
        .collect()
}

fn service_from_class(class: &Node, content: &str, file: &str) -> Option<ServiceDefinition> {
    let name = node_text(&class.child_by_field_name("name")?, content).to_string();
    let body = class.child_by_field_name("body")?;

    let mut methods = Vec::new();
    let mut dependencies = Vec::new();
    for member in named_children(&body) {
        if member.kind() != "method_definition" {
            continue;
        }
        let Some(method_name) = member.child_by_field_name("name") else {
            continue;
        };
        let method_name = node_text(&method_name, content);
        if method_name == CONSTRUCTOR {
            dependencies = constructor_dependencies(&member, content);
        } else {
            methods.push(method_of(&member, method_name, content));
        }
    }

    let is_async = methods.iter().any(|m| m.is_async);
    let metrics = ServiceMetrics {
        complexity: calculate_cyclomatic_complexity(class),
        dependency_count: dependencies.len(),
        coverage: 0.0,
    };

    Some(ServiceDefinition {
        name,
        methods,
        dependencies,
        file: file.to_string(),
        metadata: ServiceMetadata {
            is_async,
            has_tests: false,
            metrics,
        },
    })
}

fn method_of(method: &Node, name: &str, content: &str) -> MethodDefinition {
    let visibility = if name.starts_with('#') {
        Visibility::Private
    } else {
        child_by_kind(method, "accessibility_modifier")
            .map(|m| visibility_of(node_text(&m, content)))
            .unwrap_or_default()
    };
    let parameters = method
        .child_by_field_name("parameters")
        .map(|params| {
            named_children(&params)
                .iter()
                .filter_map(|p| parameter_of(p, content))
                .collect()
        })
        .unwrap_or_default();
    let return_type = method
        .child_by_field_name("return_type")
        .map(|rt| type_annotation_text(&rt, content))
        .unwrap_or_else(|| UNKNOWN_TYPE.to_string());

    MethodDefinition {
        name: name.to_string(),
        return_type,
        parameters,
        is_async: has_token(method, "async"),
        visibility,
        doc: leading_doc(method, content),
    }
}

fn visibility_of(modifier: &str) -> Visibility {
    match modifier.trim() {
        "private" => Visibility::Private,
        "protected" => Visibility::Protected,
        _ => Visibility::Public,
    }
}

fn parameter_of(param: &Node, content: &str) -> Option<ParameterDefinition> {
    if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
        return None;
    }
    let pattern = param.child_by_field_name("pattern")?;
    Some(ParameterDefinition {
        name: node_text(&pattern, content).to_string(),
        type_name: annotation_type(param, content).unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        optional: param.kind() == "optional_parameter",
    })
}

fn constructor_dependencies(constructor: &Node, content: &str) -> Vec<ServiceDependency> {
    let Some(params) = constructor.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(&params)
        .iter()
        .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
        .filter_map(|param| {
            let ty = param.child_by_field_name("type")?;
            let service = type_symbol(&ty, content);
            if service.is_empty() {
                return None;
            }
            let optional = param.kind() == "optional_parameter"
                || decorators_of(param)
                    .iter()
                    .any(|d| decorator_name(d, content) == OPTIONAL_DECORATOR);
            Some(ServiceDependency { service, optional })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    fn services(code: &str) -> Vec<ServiceDefinition> {
        let mut parser = Dialect::TypeScript.create_parser().unwrap();
        let tree = parser.parse(code, None).unwrap();
        extract_services(
            &tree.root_node(),
            code,
            "src/services/user.service.ts",
            &["Injectable".to_string()],
        )
    }

    const USER_SERVICE: &str = r#"
        import { Injectable, Optional } from '@nestjs/common';

        @Injectable()
        export class UserService {
            constructor(
                private readonly repo: Repository<User>,
                private readonly logger: core.Logger,
                @Optional() private readonly cache: Cache,
                private readonly metrics?: Metrics,
            ) {}

            /** Loads one user. */
            async findOne(id: string): Promise<User> {
                if (!id) {
                    throw new Error('missing id');
                }
                return this.repo.findOne(id);
            }

            protected count(filter?: Filter) {
                return this.repo.count(filter);
            }

            private normalize(name: string): string {
                return name ? name.trim() : '';
            }
        }

        export class NotAService {
            run(): void {}
        }
    "#;

    #[test]
    fn extracts_injectable_classes_only() {
        let found = services(USER_SERVICE);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "UserService");
        assert_eq!(found[0].file, "src/services/user.service.ts");
    }

    #[test]
    fn resolves_methods_without_constructor() {
        let service = &services(USER_SERVICE)[0];
        let names: Vec<&str> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["findOne", "count", "normalize"]);

        let find_one = service.method("findOne").unwrap();
        assert!(find_one.is_async);
        assert_eq!(find_one.return_type, "Promise<User>");
        assert_eq!(find_one.visibility, Visibility::Public);
        assert_eq!(find_one.doc.as_deref(), Some("Loads one user."));
        assert_eq!(find_one.parameters.len(), 1);
        assert_eq!(find_one.parameters[0].name, "id");
        assert_eq!(find_one.parameters[0].type_name, "string");
        assert!(!find_one.parameters[0].optional);

        let count = service.method("count").unwrap();
        assert_eq!(count.visibility, Visibility::Protected);
        assert_eq!(count.return_type, "unknown");
        assert!(count.parameters[0].optional);

        assert_eq!(
            service.method("normalize").unwrap().visibility,
            Visibility::Private
        );
        assert!(service.metadata.is_async);
    }

    #[test]
    fn resolves_constructor_dependencies() {
        let service = &services(USER_SERVICE)[0];
        assert_eq!(
            service.dependencies,
            vec![
                ServiceDependency { service: "Repository".into(), optional: false },
                ServiceDependency { service: "Logger".into(), optional: false },
                ServiceDependency { service: "Cache".into(), optional: true },
                ServiceDependency { service: "Metrics".into(), optional: true },
            ]
        );
        assert_eq!(service.metadata.metrics.dependency_count, 4);
        // one `if` plus one ternary
        assert_eq!(service.metadata.metrics.complexity, 3);
    }
}
