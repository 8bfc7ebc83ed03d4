use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Type,
    Value,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRef {
    pub name: String,
    /// Module specifier exactly as written in the source.
    pub path: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Class,
    Interface,
    Type,
    Enum,
    Function,
    Variable,
    Default,
    ReExport,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportRef {
    pub name: String,
    pub kind: ExportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    Entity,
    Service,
    Util,
    Test,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeKind {
    Import,
    Extend,
    Implement,
    Use,
    Other(String),
}

impl EdgeKind {
    pub fn weight(&self) -> f64 {
        match self {
            EdgeKind::Import => 1.0,
            EdgeKind::Extend => 2.0,
            EdgeKind::Implement => 1.5,
            EdgeKind::Use => 0.5,
            EdgeKind::Other(_) => 1.0,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Import => "import",
            EdgeKind::Extend => "extend",
            EdgeKind::Implement => "implement",
            EdgeKind::Use => "use",
            EdgeKind::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EdgeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "import" => EdgeKind::Import,
            "extend" => EdgeKind::Extend,
            "implement" => EdgeKind::Implement,
            "use" => EdgeKind::Use,
            other => EdgeKind::Other(other.to_string()),
        })
    }
}

impl From<String> for EdgeKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<EdgeKind> for String {
    fn from(kind: EdgeKind) -> Self {
        kind.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraphNode {
    /// Root-relative path with `/` separators.
    pub id: String,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportRef>,
    pub file_class: FileClass,
    pub size: u64,
    pub complexity: u32,
    pub stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraphEdge {
    pub source: String,
    /// Either a node id or an opaque package specifier.
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f64,
}

impl DependencyGraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let weight = kind.weight();
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight,
        }
    }

    /// Identity of an edge across captures.
    pub fn key(&self) -> (&str, &str, &EdgeKind) {
        (&self.source, &self.target, &self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<DependencyGraphNode>,
    pub edges: Vec<DependencyGraphEdge>,
}

impl DependencyGraph {
    pub fn node(&self, id: &str) -> Option<&DependencyGraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}

/// A dependency found while reading one file, before graph metrics exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawDependency {
    pub target: String,
    pub kind: EdgeKind,
}

/// Everything the extractor learned about a single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub id: String,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportRef>,
    pub file_class: FileClass,
    pub size: u64,
    pub complexity: u32,
    pub dependencies: Vec<RawDependency>,
}
