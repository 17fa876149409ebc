//! bspm API - Build orchestration layer
//!
//! Provides the operations behind the command line:
//! - `init`: scaffold a project directory
//! - `plan` / `build`: scan, order and (optionally) execute
//! - `run`: execute the linked artifact
//! - `clean`: remove build products
//!
//! Every operation takes the file system and the project directory
//! explicitly; the process working directory is never changed.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use bspm_core::{catalog, plan_project, ProjectPlan};
use bspm_orchestrator::{Executor, StepRunner};
use bspm_vfs::VirtualFileSystem;
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod types;

pub use config::{BuildConfig, ProjectFile, MODULE_CACHE_DIR, PROJECT_FILE};
pub use error::{BspmError, ErrorReport};
pub use types::{BuildOutcome, CleanReport, InitReport};

// Re-export config types from bspm_config
pub use bspm_config::{BuildOptions, Phase, Profile, ToolchainConfig};

/// Starter source written by `init`
pub const MAIN_SOURCE: &str = "main.cpp";

const STARTER_MAIN: &str = r#"import <iostream>;

int main() {
    std::cout << "Hello from bspm!" << std::endl;
    return 0;
}
"#;

/// Scan `dir` and produce the ordered build plan
pub fn plan(
    fs: &dyn VirtualFileSystem,
    dir: &Path,
    config: &BuildConfig,
) -> Result<ProjectPlan, BspmError> {
    Ok(plan_project(fs, dir, &config.plan_settings(dir))?)
}

/// Plan and execute a build of `dir`
pub fn build(
    fs: &dyn VirtualFileSystem,
    dir: &Path,
    config: &BuildConfig,
    runner: Arc<dyn StepRunner>,
) -> Result<BuildOutcome, BspmError> {
    info!(target: "bspm::plan", dir = %dir.display(), profile = config.options.profile().as_str(), "build");

    let project = plan(fs, dir, config)?;
    let toolchain = config.toolchain_for(dir);
    let commands = Executor::render(&project.plan, &toolchain);

    if config.dry_run || project.plan.is_empty() {
        debug!(target: "bspm::exec", dry_run = config.dry_run, steps = commands.len(), "execution skipped");
        return Ok(BuildOutcome {
            project,
            commands,
            execution: None,
        });
    }

    let report = Executor::new(runner)
        .with_jobs(config.options.jobs)
        .execute(&project.plan, &toolchain)?;

    Ok(BuildOutcome {
        project,
        commands,
        execution: Some(report),
    })
}

/// Run the linked artifact of `dir`, returning its exit code
///
/// Standard streams are inherited; only the child's working directory is set.
pub fn run(fs: &dyn VirtualFileSystem, dir: &Path, config: &BuildConfig) -> Result<i32, BspmError> {
    let artifact = config.output_path(dir);
    if !fs.is_file(&artifact) {
        return Err(BspmError::ArtifactNotFound { path: artifact });
    }

    info!(target: "bspm::exec", artifact = %artifact.display(), "run");
    let status = Command::new(&artifact).current_dir(dir).status()?;
    // 被信号终止时没有退出码
    Ok(status.code().unwrap_or(1))
}

/// Remove object files, the artifact and the module cache of `dir`
pub fn clean(
    fs: &dyn VirtualFileSystem,
    dir: &Path,
    config: &BuildConfig,
) -> Result<CleanReport, BspmError> {
    let units = catalog::discover(fs, dir)?;
    let mut report = CleanReport::default();

    let files = units
        .iter()
        .map(|u| u.object_path(&config.toolchain.object_extension))
        .chain(std::iter::once(config.output_path(dir)));
    for path in files {
        if fs.is_file(&path) {
            fs.remove_file(&path)?;
            debug!(target: "bspm::exec", path = %path.display(), "removed");
            report.removed.push(path);
        }
    }

    let cache = dir.join(MODULE_CACHE_DIR);
    if fs.is_dir(&cache) {
        fs.remove_dir_all(&cache)?;
        debug!(target: "bspm::exec", path = %cache.display(), "removed");
        report.removed.push(cache);
    }

    info!(target: "bspm::exec", removed = report.removed.len(), "clean");
    Ok(report)
}

/// Create `dir` with a starter source and project file; existing files are kept
pub fn init(fs: &dyn VirtualFileSystem, dir: &Path) -> Result<InitReport, BspmError> {
    if !fs.is_dir(dir) {
        fs.create_dir_all(dir)?;
    }

    let project_json = ProjectFile::starter().to_json_pretty()? + "\n";
    let files = [
        (dir.join(MAIN_SOURCE), STARTER_MAIN.to_string()),
        (dir.join(PROJECT_FILE), project_json),
    ];

    let mut report = InitReport::default();
    for (path, content) in files {
        if fs.exists(&path) {
            report.kept.push(path);
        } else {
            fs.write_file(&path, content.as_bytes())?;
            report.created.push(path);
        }
    }

    info!(target: "bspm::cli", dir = %dir.display(), created = report.created.len(), "init");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bspm_core::CommandSpec;
    use bspm_orchestrator::{ExecError, StepOutput};
    use bspm_vfs::MemoryFileSystem;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        commands: Mutex<Vec<String>>,
    }

    impl StepRunner for Recorder {
        fn run(&self, command: &CommandSpec) -> Result<StepOutput, ExecError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(StepOutput::success(""))
        }
    }

    fn sample_fs() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/p/math.cppm", b"export module math;\nimport <cmath>;\n".to_vec()),
            ("/p/main.cpp", b"import math;\nint main() {}\n".to_vec()),
        ])
    }

    #[test]
    fn test_build_runs_every_step() {
        let fs = sample_fs();
        let recorder = Arc::new(Recorder::default());

        let outcome = build(&fs, Path::new("/p"), &BuildConfig::default(), recorder.clone()).unwrap();

        let ran = recorder.commands.lock().unwrap().clone();
        let rendered: Vec<String> = outcome.commands.iter().map(|c| c.to_string()).collect();
        assert_eq!(ran, rendered);
        assert_eq!(ran.len(), 4);
        assert!(ran[3].ends_with(&format!("-lstdc++ -lm -o {}", bspm_config::DEFAULT_OUTPUT_NAME)));
        assert_eq!(outcome.execution.unwrap().steps.len(), 4);
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let fs = sample_fs();
        let recorder = Arc::new(Recorder::default());
        let config = BuildConfig {
            dry_run: true,
            ..BuildConfig::default()
        };

        let outcome = build(&fs, Path::new("/p"), &config, recorder.clone()).unwrap();

        assert!(recorder.commands.lock().unwrap().is_empty());
        assert_eq!(outcome.commands.len(), 4);
        assert!(outcome.execution.is_none());
    }

    #[test]
    fn test_empty_project_builds_nothing() {
        let fs = MemoryFileSystem::new();
        fs.create_dir_all(Path::new("/empty")).unwrap();
        let recorder = Arc::new(Recorder::default());

        let outcome =
            build(&fs, Path::new("/empty"), &BuildConfig::default(), recorder.clone()).unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.execution.is_none());
    }

    #[test]
    fn test_build_missing_directory() {
        let fs = MemoryFileSystem::new();
        let err = build(
            &fs,
            Path::new("/missing"),
            &BuildConfig::default(),
            Arc::new(Recorder::default()),
        )
        .unwrap_err();
        assert_eq!(err.to_report().error_kind, "DirectoryNotFound");
    }

    #[test]
    fn test_run_without_artifact() {
        let fs = sample_fs();
        let err = run(&fs, Path::new("/p"), &BuildConfig::default()).unwrap_err();
        assert!(matches!(err, BspmError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_clean_removes_products_only() {
        let fs = sample_fs();
        let out = format!("/p/{}", bspm_config::DEFAULT_OUTPUT_NAME);
        fs.write_file(Path::new("/p/math.o"), b"obj").unwrap();
        fs.write_file(Path::new(&out), b"exe").unwrap();
        fs.write_file(Path::new("/p/gcm.cache/math.gcm"), b"bmi").unwrap();
        fs.write_file(Path::new("/p/notes.o"), b"unrelated").unwrap();

        let report = clean(&fs, Path::new("/p"), &BuildConfig::default()).unwrap();

        assert_eq!(
            report.removed,
            vec![
                PathBuf::from("/p/math.o"),
                PathBuf::from(&out),
                PathBuf::from("/p/gcm.cache"),
            ]
        );
        assert!(fs.is_file(Path::new("/p/main.cpp")));
        assert!(fs.is_file(Path::new("/p/notes.o")));
        assert!(!fs.is_dir(Path::new("/p/gcm.cache")));

        // 再次清理不报错
        assert!(clean(&fs, Path::new("/p"), &BuildConfig::default())
            .unwrap()
            .removed
            .is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        let fs = MemoryFileSystem::new();
        let dir = Path::new("/new/project");

        let first = init(&fs, dir).unwrap();
        assert_eq!(first.created.len(), 2);
        assert!(fs.is_file(&dir.join("main.cpp")));
        let project = ProjectFile::load(&fs, dir).unwrap();
        assert_eq!(project, ProjectFile::starter());

        fs.write_file(&dir.join("main.cpp"), b"// edited").unwrap();
        let second = init(&fs, dir).unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.kept.len(), 2);
        assert_eq!(fs.read_file(&dir.join("main.cpp")).unwrap(), b"// edited");
    }

    #[test]
    fn test_init_project_builds() {
        let fs = MemoryFileSystem::new();
        init(&fs, Path::new("/hello")).unwrap();

        let project = plan(&fs, Path::new("/hello"), &BuildConfig::default()).unwrap();
        let labels: Vec<String> = project.plan.iter().map(|s| s.label()).collect();
        assert_eq!(labels[0], "header <iostream>");
        assert_eq!(labels[1], "compile /hello/main.cpp");
        assert_eq!(labels.len(), 3);
    }
}
