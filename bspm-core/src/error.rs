//! 核心错误与警告类型

use std::fmt;
use std::path::PathBuf;

use bspm_vfs::VfsError;
use thiserror::Error;

/// 核心结果类型
pub type CoreResult<T> = Result<T, CoreError>;

/// 依赖解析与构建排序阶段的致命错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// 目标目录不存在
    #[error("directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// 两个文件声明了同名模块
    #[error(
        "module '{module}' is declared by both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateModuleDeclaration {
        module: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// 循环依赖（首尾为同一文件）
    #[error("cyclic dependency: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<PathBuf> },

    /// 文件系统错误
    #[error("{0}")]
    Vfs(#[from] VfsError),
}

fn format_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl CoreError {
    /// 错误所属阶段
    pub fn phase(&self) -> &'static str {
        match self {
            CoreError::DirectoryNotFound { .. } | CoreError::Vfs(_) => "catalog",
            CoreError::DuplicateModuleDeclaration { .. } => "graph",
            CoreError::CyclicDependency { .. } => "order",
        }
    }
}

/// 可恢复问题的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// 无法读取源文件，该单元按无声明处理
    FileUnreadable,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::FileUnreadable => "FileUnreadable",
        }
    }
}

/// 可恢复问题，随扫描结果一并返回
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.kind.as_str(),
            self.path.display(),
            self.message
        )
    }
}
