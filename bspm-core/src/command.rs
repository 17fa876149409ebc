//! 工具链命令渲染
//!
//! 把抽象的 [`BuildStep`] 映射为具体的程序与参数。工作目录作为参数显式
//! 传给子进程，进程自身的工作目录从不改变。

use std::fmt;
use std::path::{Path, PathBuf};

use bspm_config::{Profile, ToolchainConfig};

use crate::plan::BuildStep;
use crate::unit::UnitKind;

/// 一次具体的子进程调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// 子进程的工作目录
    pub cwd: PathBuf,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// 工具链：配置 + 构建配置档 + 项目目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub config: ToolchainConfig,
    pub profile: Profile,
    /// 项目目录（绝对路径）
    pub project_dir: PathBuf,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig, profile: Profile, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            profile,
            project_dir: project_dir.into(),
        }
    }

    /// 渲染一个步骤
    pub fn render(&self, step: &BuildStep) -> CommandSpec {
        let cfg = &self.config;
        let mut args: Vec<String> = Vec::new();

        match step {
            BuildStep::PrecompileHeader { header } => {
                self.push_compile_prefix(&mut args);
                args.extend(cfg.header_flags.iter().cloned());
                args.push(header.clone());
            }
            BuildStep::Compile {
                source,
                kind,
                object,
            } => {
                self.push_compile_prefix(&mut args);
                if *kind == UnitKind::Interface {
                    args.extend(cfg.interface_flags.iter().cloned());
                }
                args.push("-c".to_string());
                args.push(self.display_path(source));
                args.push("-o".to_string());
                args.push(self.display_path(object));
            }
            BuildStep::Link {
                objects,
                libraries,
                output,
            } => {
                args.extend(objects.iter().map(|o| self.display_path(o)));
                args.extend(cfg.ld_flags.iter().cloned());
                args.extend(libraries.iter().cloned());
                args.push("-o".to_string());
                args.push(self.display_path(output));
            }
        }

        CommandSpec {
            program: cfg.compiler.clone(),
            args,
            cwd: self.project_dir.clone(),
        }
    }

    fn push_compile_prefix(&self, args: &mut Vec<String>) {
        args.push(self.config.std.clone());
        args.extend(self.config.module_flags.iter().cloned());
        args.extend(self.profile.flags().iter().map(|f| f.to_string()));
    }

    /// 项目目录内的路径显示为相对路径（子进程的 cwd 就是项目目录）
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_dir)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
