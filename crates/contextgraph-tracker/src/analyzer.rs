use contextgraph_core::{
    DependencyAnalysis, DomainContext, ExtractionConfig, Operation, Result, StageExt,
};
use contextgraph_graph::{analyze_dependencies, build_context};
use contextgraph_parser::SourceModelExtractor;
use std::path::Path;

/// Runs extraction and graph assembly for one tree.
pub struct ContextAnalyzer {
    extractor: SourceModelExtractor,
}

impl ContextAnalyzer {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            extractor: SourceModelExtractor::new(config),
        }
    }

    /// One whole-tree capture.
    pub fn capture(&self, root: &Path) -> Result<DomainContext> {
        let model = self.extractor.extract(root).stage(Operation::Extract)?;
        Ok(build_context(&model))
    }

    /// Graph, cycles, clusters and metrics for the tree's current state.
    pub fn analyze(&self, root: &Path) -> Result<DependencyAnalysis> {
        let context = self.capture(root).stage(Operation::Analyze)?;
        Ok(analyze_dependencies(&context.graph))
    }
}
