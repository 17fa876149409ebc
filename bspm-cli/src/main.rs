//! bspm CLI - Command line interface
//!
//! Builds C++20 module projects from a single directory. Project defaults
//! come from `bspm.json`; command line flags take precedence.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

mod config;
mod logging;
mod platform;

use crate::config::LogConfig;
use crate::logging::LogFormat;
use bspm_api::{BspmError, BuildConfig, BuildOptions, ProjectFile};
use bspm_orchestrator::ProcessRunner;
use bspm_vfs::NativeFileSystem;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "bspm",
    about = "Minimal build orchestrator for C++20 modules",
    version
)]
struct Cli {
    /// Print files, imports and commands; enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormatArg::Compact)]
    log_format: LogFormatArg,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    json_errors: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a project directory with a starter source and bspm.json
    Init {
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Scan, order and compile every translation unit, then link
    Build {
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Debug profile (-g -O0)
        #[arg(long)]
        debug: bool,
        /// Release profile (-O2 -DNDEBUG); wins over --debug
        #[arg(long)]
        release: bool,
        /// Worker count (default: bspm.json, then 1)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
        /// Print the commands without running them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the linked artifact
    Run {
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Remove object files, the artifact and the module cache
    Clean {
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Print version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match dispatch(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            platform::print_error(&e, json_errors);
            process::exit(1);
        }
    }
}

/// 执行子命令，返回进程退出码
fn dispatch(cli: Cli) -> Result<i32, BspmError> {
    let fs = NativeFileSystem::new();

    match cli.command {
        Commands::Version => {
            println!("bspm {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Init { ref dir } => {
            init_logging(&cli, None);
            let dir = resolve_dir(dir.as_deref())?;
            let report = bspm_api::init(&fs, &dir)?;
            for path in &report.created {
                println!("created {}", path.display());
            }
            for path in &report.kept {
                println!("kept {}", path.display());
            }
            Ok(0)
        }
        Commands::Build {
            ref dir,
            debug,
            release,
            jobs,
            dry_run,
        } => {
            let dir = resolve_dir(dir.as_deref())?;
            let project = ProjectFile::load(&fs, &dir)?;
            init_logging(&cli, project.log_level.as_deref());

            let options = BuildOptions {
                debug,
                release,
                verbose: cli.verbose,
                jobs: jobs.or(project.jobs).unwrap_or(1),
            };
            let config = BuildConfig {
                dry_run,
                ..BuildConfig::with_options(options).apply_project(&project)
            };
            debug!(target: "bspm::cli", ?config, "build configuration");

            let outcome = bspm_api::build(&fs, &dir, &config, Arc::new(ProcessRunner::new()))?;
            platform::print_warnings(&outcome.project.warnings);
            if cli.verbose {
                platform::print_units(&outcome);
            }

            if outcome.is_empty() {
                println!("nothing to build in {}", dir.display());
            } else if dry_run {
                platform::print_commands(&outcome);
            } else if let Some(report) = &outcome.execution {
                platform::print_output(&report.output, cli.verbose);
                println!(
                    "built {} ({} steps)",
                    config.output_path(&dir).display(),
                    report.steps.len()
                );
            }
            Ok(0)
        }
        Commands::Run { ref dir } => {
            let dir = resolve_dir(dir.as_deref())?;
            let project = ProjectFile::load(&fs, &dir)?;
            init_logging(&cli, project.log_level.as_deref());

            let config = BuildConfig::default().apply_project(&project);
            bspm_api::run(&fs, &dir, &config)
        }
        Commands::Clean { ref dir } => {
            let dir = resolve_dir(dir.as_deref())?;
            let project = ProjectFile::load(&fs, &dir)?;
            init_logging(&cli, project.log_level.as_deref());

            let config = BuildConfig::default().apply_project(&project);
            let report = bspm_api::clean(&fs, &dir, &config)?;
            for path in &report.removed {
                println!("removed {}", path.display());
            }
            Ok(0)
        }
    }
}

fn init_logging(cli: &Cli, file_level: Option<&str>) {
    let log_config = LogConfig::resolve(cli.verbose, file_level);
    if let Err(e) =
        logging::init_with_file(&log_config, cli.log_format.into(), cli.log_file.as_deref())
    {
        eprintln!("warning: logging disabled: {}", e);
    }
}

/// 解析项目目录；缺省为当前目录
///
/// 已存在的目录取规范路径，不存在的（如 `init` 的目标）拼接到当前目录下。
fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf, BspmError> {
    let dir = dir.unwrap_or_else(|| Path::new("."));
    if dir.is_dir() {
        return Ok(dir.canonicalize()?);
    }
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bspm_config::Profile;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli =
            Cli::try_parse_from(["bspm", "build", "proj", "--release", "-j", "4", "--dry-run", "-v"])
                .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Build {
                dir,
                debug,
                release,
                jobs,
                dry_run,
            } => {
                assert_eq!(dir, Some(PathBuf::from("proj")));
                assert!(!debug);
                assert!(release);
                assert_eq!(jobs, Some(4));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_profile_help_matches_flags() {
        let cmd = Cli::command();
        let build = cmd.find_subcommand("build").unwrap();
        let help_for = |id: &str| {
            build
                .get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_help())
                .map(|h| h.to_string())
                .unwrap()
        };

        for (id, profile) in [("debug", Profile::Debug), ("release", Profile::Release)] {
            let flags = profile.flags().join(" ");
            assert!(help_for(id).contains(&flags), "{} help lacks {}", id, flags);
        }
    }

    #[test]
    fn test_directory_is_optional() {
        let cli = Cli::try_parse_from(["bspm", "clean"]).unwrap();
        assert!(matches!(cli.command, Commands::Clean { dir: None }));
        assert_eq!(cli.log_format, LogFormatArg::Compact);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bspm", "run", "--log-format", "json", "--json-errors"])
            .unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert!(cli.json_errors);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["bspm", "deploy"]).is_err());
        assert!(Cli::try_parse_from(["bspm"]).is_err());
    }

    #[test]
    fn test_resolve_missing_dir_is_absolute() {
        let dir = resolve_dir(Some(Path::new("bspm-no-such-dir"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("bspm-no-such-dir"));
    }
}
