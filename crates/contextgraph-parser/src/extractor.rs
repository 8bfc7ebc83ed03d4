use crate::complexity::calculate_cyclomatic_complexity;
use crate::conventions::Conventions;
use crate::coverage::CoverageReport;
use crate::file_collect::{collect_source_files, relative_id};
use crate::language::Dialect;
use crate::resolve::ImportResolver;
use crate::typescript::{extract_entities, extract_services, extract_symbols, FileSymbols};
use contextgraph_core::{
    ContextGraphError, EdgeKind, EntityDefinition, ExtractionConfig, Operation, RawDependency,
    Result, ServiceDefinition, SourceFile, SourceModel, StageExt,
};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-file outcome before the pass is merged.
struct FileExtraction {
    file: SourceFile,
    entities: Vec<EntityDefinition>,
    services: Vec<ServiceDefinition>,
}

/// Context shared read-only by every per-file job of one pass.
struct PassContext<'a> {
    root: &'a Path,
    conventions: Conventions,
    resolver: ImportResolver,
    coverage: CoverageReport,
    injectable_decorators: &'a [String],
}

/// Walks a TypeScript tree and produces entities, services and raw
/// per-file dependency records.
pub struct SourceModelExtractor {
    config: ExtractionConfig,
}

impl SourceModelExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, root: &Path) -> Result<SourceModel> {
        let start = Instant::now();
        info!("Extracting source model from: {:?}", root);

        check_root(root)?;
        let project_config = root.join(&self.config.project_config);
        if !project_config.is_file() {
            return Err(ContextGraphError::stage(
                Operation::Extract,
                format!("no project configuration found at {}", project_config.display()),
            ));
        }

        let paths = collect_source_files(root, &self.config).stage(Operation::Extract)?;
        let ids: Vec<String> = paths.iter().map(|p| relative_id(root, p)).collect();

        let coverage = CoverageReport::load(root, &self.config.coverage_summary);
        if coverage.is_empty() {
            debug!("No coverage summary entries under {:?}", root);
        }
        let pass = PassContext {
            root,
            conventions: Conventions::from_config(&self.config),
            resolver: ImportResolver::new(ids.iter().cloned()),
            coverage,
            injectable_decorators: &self.config.injectable_decorators,
        };

        let jobs: Vec<(PathBuf, String)> = paths.into_iter().zip(ids).collect();
        let mut results: Vec<FileExtraction> = if self.config.parallel {
            jobs.par_iter()
                .map(|(path, id)| extract_file(&pass, path, id))
                .collect()
        } else {
            jobs.iter()
                .map(|(path, id)| extract_file(&pass, path, id))
                .collect()
        };
        results.sort_by(|a, b| a.file.id.cmp(&b.file.id));

        let mut model = SourceModel {
            root: root.to_path_buf(),
            ..SourceModel::default()
        };
        for result in results {
            model.entities.extend(result.entities);
            model.services.extend(result.services);
            model.files.push(result.file);
        }

        info!(
            "Extraction complete: {} files, {} entities, {} services in {:.2}s",
            model.files.len(),
            model.entities.len(),
            model.services.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(model)
    }
}

fn check_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(ContextGraphError::stage(
            Operation::Extract,
            format!("{} is not a directory", root.display()),
        ));
    }
    std::fs::read_dir(root)
        .map(|_| ())
        .map_err(|e| ContextGraphError::stage(Operation::Extract, format!("{}: {}", root.display(), e)))
}

/// One file, fail-soft: unreadable or unparseable files still become nodes
/// with zero size and complexity.
fn extract_file(pass: &PassContext<'_>, path: &Path, id: &str) -> FileExtraction {
    let file_class = pass.conventions.classify(id);
    let mut extraction = FileExtraction {
        file: SourceFile {
            id: id.to_string(),
            imports: Vec::new(),
            exports: Vec::new(),
            file_class,
            size: 0,
            complexity: 0,
            dependencies: Vec::new(),
        },
        entities: Vec::new(),
        services: Vec::new(),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", id, e);
            return extraction;
        }
    };
    let Some(mut parser) = Dialect::detect(path).and_then(Dialect::create_parser) else {
        warn!("No TypeScript grammar for {}", id);
        return extraction;
    };
    let Some(tree) = parser.parse(&content, None) else {
        warn!("Failed to parse {}", id);
        return extraction;
    };
    let root = tree.root_node();
    if root.has_error() {
        debug!("Syntax errors in {}, extracting what parsed", id);
    }

    let symbols = extract_symbols(&root, &content);
    extraction.file.size = content.len() as u64;
    extraction.file.complexity = calculate_cyclomatic_complexity(&root);
    extraction.file.dependencies = dependencies_of(&pass.resolver, id, &symbols);
    extraction.file.imports = symbols.imports;
    extraction.file.exports = symbols.exports;

    let is_test = pass.conventions.is_test_file(id);
    if !is_test && pass.conventions.is_entity_scope(id) {
        extraction.entities = extract_entities(&root, &content, id);
    }
    if !is_test && pass.conventions.is_service_scope(id) {
        let has_tests = pass.conventions.has_test_file(pass.root, id);
        let coverage = pass.coverage.statement_pct(id);
        extraction.services = extract_services(&root, &content, id, pass.injectable_decorators)
            .into_iter()
            .map(|mut service| {
                service.metadata.has_tests = has_tests;
                service.metadata.metrics.coverage = coverage;
                service
            })
            .collect();
    }

    extraction
}

/// One edge per module (`use` when only types were imported) plus heritage
/// edges for base types that came from another module.
fn dependencies_of(resolver: &ImportResolver, id: &str, symbols: &FileSymbols) -> Vec<RawDependency> {
    let target_of = |specifier: &str| {
        if ImportResolver::is_relative(specifier) {
            resolver.resolve(id, specifier)
        } else {
            specifier.to_string()
        }
    };

    let mut seen = HashSet::new();
    let mut dependencies = Vec::new();
    let mut push = |target: String, kind: EdgeKind| {
        let dep = RawDependency { target, kind };
        if seen.insert(dep.clone()) {
            dependencies.push(dep);
        }
    };

    for module in &symbols.modules {
        let kind = if module.type_only {
            EdgeKind::Use
        } else {
            EdgeKind::Import
        };
        push(target_of(&module.specifier), kind);
    }
    for heritage in &symbols.heritage {
        if let Some(specifier) = symbols.module_for(&heritage.symbol) {
            push(target_of(specifier), heritage.kind.clone());
        }
    }
    dependencies
}
