//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use bspm_core::CoreError;
pub use bspm_orchestrator::ExecError;
pub use bspm_vfs::VfsError;

/// bspm 错误类型
#[derive(Error, Debug)]
pub enum BspmError {
    /// 扫描、依赖图或排序错误
    #[error("{0}")]
    Core(#[from] CoreError),

    /// 步骤执行错误
    #[error("{0}")]
    Exec(#[from] ExecError),

    /// 文件系统错误
    #[error("{0}")]
    Vfs(#[from] VfsError),

    /// 进程 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 项目配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// 产物尚未构建
    #[error("artifact not found: {} (run `bspm build` first)", .path.display())]
    ArtifactNotFound { path: PathBuf },
}

impl BspmError {
    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            BspmError::Core(e) => e.phase(),
            BspmError::Exec(_) => "exec",
            BspmError::Vfs(_) => "fs",
            BspmError::Io(_) => "io",
            BspmError::Config(_) => "config",
            BspmError::ArtifactNotFound { .. } => "run",
        }
    }

    /// 错误种类名（可用于程序化处理）
    pub fn kind(&self) -> &'static str {
        match self {
            BspmError::Core(CoreError::DirectoryNotFound { .. }) => "DirectoryNotFound",
            BspmError::Core(CoreError::DuplicateModuleDeclaration { .. }) => {
                "DuplicateModuleDeclaration"
            }
            BspmError::Core(CoreError::CyclicDependency { .. }) => "CyclicDependency",
            BspmError::Core(CoreError::Vfs(_)) | BspmError::Vfs(_) => "FileSystem",
            BspmError::Exec(ExecError::StepFailed { .. }) => "StepExecutionFailure",
            BspmError::Exec(ExecError::Spawn { .. }) => "SpawnFailure",
            BspmError::Exec(ExecError::Cancelled) => "Cancelled",
            BspmError::Exec(ExecError::Pool(_)) => "WorkerPool",
            BspmError::Io(_) => "Io",
            BspmError::Config(_) => "Config",
            BspmError::ArtifactNotFound { .. } => "ArtifactNotFound",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层工具可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let mut report = ErrorReport {
            phase: self.phase(),
            error_kind: self.kind().to_string(),
            message: self.to_string(),
            files: Vec::new(),
            status: None,
            stderr: None,
        };

        match self {
            BspmError::Core(CoreError::DirectoryNotFound { path })
            | BspmError::ArtifactNotFound { path } => {
                report.files.push(path.display().to_string());
            }
            BspmError::Core(CoreError::DuplicateModuleDeclaration { first, second, .. }) => {
                report.files.push(first.display().to_string());
                report.files.push(second.display().to_string());
            }
            BspmError::Core(CoreError::CyclicDependency { cycle }) => {
                report.files = cycle.iter().map(|p| p.display().to_string()).collect();
            }
            BspmError::Exec(ExecError::StepFailed { status, stderr, .. }) => {
                report.status = *status;
                report.stderr = Some(stderr.clone());
            }
            _ => {}
        }
        report
    }
}

/// 结构化错误报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: catalog, graph, order, exec, ...
    pub phase: &'static str,
    /// 错误类型
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 相关文件（重复声明的两个文件、环上的文件等）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// 失败步骤的退出码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    /// 失败步骤的诊断输出
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"phase":"{}","error_kind":"{}"}}"#,
                self.phase, self.error_kind
            )
        })
    }
}
