//! bspm Core - dependency resolution and build-ordering engine
//!
//! Discovers translation units, extracts module declarations and imports,
//! builds the dependency graph, orders units topologically and synthesizes
//! the build plan. Spawns no processes and never touches the process-wide
//! working directory; file access goes through a `VirtualFileSystem`.

pub mod catalog;
pub mod command;
pub mod error;
pub mod extract;
pub mod graph;
pub mod order;
pub mod plan;
pub mod unit;

use std::path::Path;

use bspm_vfs::VirtualFileSystem;
use tracing::info;

pub use command::{CommandSpec, Toolchain};
pub use error::{CoreError, CoreResult, Warning, WarningKind};
pub use extract::{classify_line, extract_declarations, Declarations, LineKind};
pub use graph::{DependencyGraph, ModuleIndex, UnresolvedImport};
pub use order::topological_order;
pub use plan::{synthesize, BuildPlan, BuildStep, LinkRule, LinkRules, PlanSettings, PlannedStep};
pub use unit::{Import, ImportForm, TranslationUnit, UnitKind};

// Re-export config types from bspm-config
pub use bspm_config::{Phase, Profile, ToolchainConfig};

/// Everything derived from one directory scan
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    /// Units in catalog order; graph nodes are indices into this
    pub units: Vec<TranslationUnit>,
    pub graph: DependencyGraph,
    /// Compile order as unit indices
    pub order: Vec<usize>,
    pub plan: BuildPlan,
    /// Recoverable extraction problems
    pub warnings: Vec<Warning>,
}

impl ProjectPlan {
    /// Units in compile order
    pub fn ordered_units(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.order.iter().map(|&i| &self.units[i])
    }
}

/// Run catalog, extraction, graph, ordering and synthesis for `dir`
pub fn plan_project(
    fs: &dyn VirtualFileSystem,
    dir: &Path,
    settings: &PlanSettings,
) -> CoreResult<ProjectPlan> {
    let mut units = catalog::discover(fs, dir)?;
    let warnings = extract::extract_all(fs, &mut units);
    let graph = DependencyGraph::build(&units)?;
    let order = topological_order(&units, &graph)?;
    let plan = synthesize(&units, &order, &graph, settings);

    info!(
        target: "bspm::plan",
        units = units.len(),
        steps = plan.len(),
        warnings = warnings.len(),
        dir = %dir.display(),
        "project planned"
    );

    Ok(ProjectPlan {
        units,
        graph,
        order,
        plan,
        warnings,
    })
}
