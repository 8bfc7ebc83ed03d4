use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Interface,
    Class,
    TypeAlias,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationKind {
    /// Maps a relation shape name (`OneToMany`) to its kind.
    pub fn from_shape(shape: &str) -> Option<Self> {
        match shape {
            "OneToOne" => Some(RelationKind::OneToOne),
            "OneToMany" => Some(RelationKind::OneToMany),
            "ManyToOne" => Some(RelationKind::ManyToOne),
            "ManyToMany" => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDefinition {
    pub kind: RelationKind,
    pub target: String,
    pub property_name: String,
    pub optional: bool,
}

/// A decorator attached to a declaration, with its literal arguments flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub is_abstract: bool,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub name: String,
    pub kind: EntityKind,
    pub properties: Vec<PropertyDefinition>,
    pub relations: Vec<RelationDefinition>,
    pub doc: Option<String>,
    pub file: String,
    pub metadata: EntityMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDefinition {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParameterDefinition>,
    pub is_async: bool,
    pub visibility: Visibility,
    pub doc: Option<String>,
}

/// A constructor-injected collaborator of a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDependency {
    pub service: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetrics {
    pub complexity: u32,
    pub dependency_count: usize,
    /// Statement coverage percentage, 0 when no report covers the file.
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub is_async: bool,
    pub has_tests: bool,
    pub metrics: ServiceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    pub methods: Vec<MethodDefinition>,
    pub dependencies: Vec<ServiceDependency>,
    pub file: String,
    pub metadata: ServiceMetadata,
}

impl ServiceDefinition {
    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&RelationKind::ManyToOne).unwrap();
        assert_eq!(json, "\"many-to-one\"");
        assert_eq!(RelationKind::from_shape("OneToMany"), Some(RelationKind::OneToMany));
        assert_eq!(RelationKind::from_shape("Array"), None);
    }

    #[test]
    fn property_uses_type_key() {
        let prop = PropertyDefinition {
            name: "email".into(),
            type_name: "string".into(),
            optional: true,
            doc: None,
        };
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(value["type"], "string");
        assert_eq!(value["optional"], true);
    }
}
