// ABOUTME: Three-axis structural diff between two captures
// ABOUTME: Entities and services by (name, file), dependency edges by (source, target, kind)

use contextgraph_core::{
    ChangeAction, ChangeType, ContextChange, DependencyGraphEdge, DomainContext, EntityDefinition,
    ServiceDefinition,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// All structural changes from `previous` to `current`.
///
/// Order: entities, then services, then dependencies; within an axis the
/// current capture's order for additions and modifications, followed by
/// removals in the previous capture's order.
pub fn diff_contexts(previous: &DomainContext, current: &DomainContext) -> Vec<ContextChange> {
    let mut changes = diff_entities(&previous.entities, &current.entities);
    changes.extend(diff_services(&previous.services, &current.services));
    changes.extend(diff_dependencies(&previous.graph.edges, &current.graph.edges));
    changes
}

/// A change set is worth persisting when anything was added or removed, or
/// when any service changed.
pub fn is_significant(changes: &[ContextChange]) -> bool {
    changes.iter().any(ContextChange::is_significant)
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Declaration identity: name, declaring file, and the ordinal among
/// same-named declarations of that file (merged interfaces).
type DeclKey<'a> = (&'a str, &'a str, usize);

trait Declaration {
    fn name(&self) -> &str;
    fn file(&self) -> &str;
}

impl Declaration for EntityDefinition {
    fn name(&self) -> &str {
        &self.name
    }
    fn file(&self) -> &str {
        &self.file
    }
}

impl Declaration for ServiceDefinition {
    fn name(&self) -> &str {
        &self.name
    }
    fn file(&self) -> &str {
        &self.file
    }
}

fn declaration_keys<T: Declaration>(items: &[T]) -> Vec<(DeclKey<'_>, &T)> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let slot = seen.entry((item.name(), item.file())).or_insert(0);
            let key = (item.name(), item.file(), *slot);
            *slot += 1;
            (key, item)
        })
        .collect()
}

pub fn diff_entities(
    previous: &[EntityDefinition],
    current: &[EntityDefinition],
) -> Vec<ContextChange> {
    let previous = declaration_keys(previous);
    let current = declaration_keys(current);
    let before: HashMap<DeclKey, &EntityDefinition> = previous.iter().copied().collect();
    let after: HashSet<DeclKey> = current.iter().map(|(key, _)| *key).collect();
    let mut changes = Vec::new();

    for (key, entity) in &current {
        let change = match before.get(key) {
            None => ContextChange::new(ChangeType::Entity, ChangeAction::Added, &entity.name)
                .with_after(to_value(entity)),
            Some(old) if old != entity => {
                ContextChange::new(ChangeType::Entity, ChangeAction::Modified, &entity.name)
                    .with_before(to_value(old))
                    .with_after(to_value(entity))
            }
            Some(_) => continue,
        };
        changes.push(change.with_file(&entity.file));
    }
    for (key, entity) in &previous {
        if !after.contains(key) {
            changes.push(
                ContextChange::new(ChangeType::Entity, ChangeAction::Removed, &entity.name)
                    .with_file(&entity.file)
                    .with_before(to_value(entity)),
            );
        }
    }
    changes
}

pub fn diff_services(
    previous: &[ServiceDefinition],
    current: &[ServiceDefinition],
) -> Vec<ContextChange> {
    let previous = declaration_keys(previous);
    let current = declaration_keys(current);
    let before: HashMap<DeclKey, &ServiceDefinition> = previous.iter().copied().collect();
    let after: HashSet<DeclKey> = current.iter().map(|(key, _)| *key).collect();
    let mut changes = Vec::new();

    for (key, service) in &current {
        match before.get(key) {
            None => changes.push(
                ContextChange::new(ChangeType::Service, ChangeAction::Added, &service.name)
                    .with_file(&service.file)
                    .with_after(to_value(service)),
            ),
            Some(old) => {
                changes.extend(diff_methods(old, service));
                if old.dependencies != service.dependencies {
                    changes.push(
                        ContextChange::new(
                            ChangeType::Service,
                            ChangeAction::DependenciesChanged,
                            &service.name,
                        )
                        .with_file(&service.file)
                        .with_before(to_value(&old.dependencies))
                        .with_after(to_value(&service.dependencies)),
                    );
                }
            }
        }
    }
    for (key, service) in &previous {
        if !after.contains(key) {
            changes.push(
                ContextChange::new(ChangeType::Service, ChangeAction::Removed, &service.name)
                    .with_file(&service.file)
                    .with_before(to_value(service)),
            );
        }
    }
    changes
}

fn diff_methods(old: &ServiceDefinition, new: &ServiceDefinition) -> Vec<ContextChange> {
    let qualified = |method: &str| format!("{}.{}", new.name, method);
    let mut changes = Vec::new();

    for method in &new.methods {
        let change = match old.method(&method.name) {
            None => ContextChange::new(
                ChangeType::Service,
                ChangeAction::MethodAdded,
                qualified(&method.name),
            )
            .with_after(to_value(method)),
            Some(previous) if previous != method => ContextChange::new(
                ChangeType::Service,
                ChangeAction::MethodModified,
                qualified(&method.name),
            )
            .with_before(to_value(previous))
            .with_after(to_value(method)),
            Some(_) => continue,
        };
        changes.push(change.with_file(&new.file));
    }
    for method in &old.methods {
        if new.method(&method.name).is_none() {
            changes.push(
                ContextChange::new(
                    ChangeType::Service,
                    ChangeAction::MethodRemoved,
                    qualified(&method.name),
                )
                .with_file(&new.file)
                .with_before(to_value(method)),
            );
        }
    }
    changes
}

/// Edges have no "modified" state: a changed weight or kind is a removal
/// plus an addition.
pub fn diff_dependencies(
    previous: &[DependencyGraphEdge],
    current: &[DependencyGraphEdge],
) -> Vec<ContextChange> {
    let before: HashSet<_> = previous.iter().map(DependencyGraphEdge::key).collect();
    let after: HashSet<_> = current.iter().map(DependencyGraphEdge::key).collect();
    let mut changes = Vec::new();

    for edge in current {
        if !before.contains(&edge.key()) {
            changes.push(
                dependency_change(edge, ChangeAction::Added).with_after(to_value(edge)),
            );
        }
    }
    for edge in previous {
        if !after.contains(&edge.key()) {
            changes.push(
                dependency_change(edge, ChangeAction::Removed).with_before(to_value(edge)),
            );
        }
    }
    changes
}

fn dependency_change(edge: &DependencyGraphEdge, action: ChangeAction) -> ContextChange {
    ContextChange::new(
        ChangeType::Dependency,
        action,
        format!("{} -> {}", edge.source, edge.target),
    )
    .with_file(&edge.source)
}
