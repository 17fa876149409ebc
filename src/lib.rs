//! bspm - a minimal build orchestrator for C++20 modules
//!
//! # Architecture
//!
//! ```text
//! bspm-config/        - Toolchain defaults, profiles, build options
//! bspm-vfs/           - File system seam (native and in-memory)
//! bspm-core/          - Catalog, extraction, graph, ordering, plan (no process IO)
//! bspm-orchestrator/  - Step execution (sequential or rayon waves)
//! bspm-api/           - init / build / run / clean
//! bspm-cli/           - `bspm` binary
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use bspm_workspace::{plan, BuildConfig, NativeFileSystem};
//!
//! let project = plan(&NativeFileSystem::new(), "/path/to/project".as_ref(), &BuildConfig::default())?;
//! for unit in project.ordered_units() {
//!     println!("{}", unit.path.display());
//! }
//! ```

pub use bspm_api::{
    build, clean, init, plan, run, BspmError, BuildConfig, BuildOutcome, CleanReport,
    ErrorReport, InitReport, ProjectFile, MODULE_CACHE_DIR, PROJECT_FILE,
};
pub use bspm_config::{BuildOptions, Phase, Profile, ToolchainConfig};
pub use bspm_core::{BuildPlan, BuildStep, CommandSpec, ProjectPlan, TranslationUnit};
pub use bspm_orchestrator::{ProcessRunner, StepOutput, StepRunner};
pub use bspm_vfs::{MemoryFileSystem, NativeFileSystem, VirtualFileSystem};
