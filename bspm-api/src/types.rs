//! API 类型定义
//!
//! 各命令的输出类型。

use std::path::PathBuf;

use bspm_core::{CommandSpec, ProjectPlan};
use bspm_orchestrator::ExecutionReport;

/// 构建输出
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// 扫描、排序与计划结果
    pub project: ProjectPlan,
    /// 每个步骤渲染后的命令，与计划顺序一致
    pub commands: Vec<CommandSpec>,
    /// 执行报告；演练模式或计划为空时为 None
    pub execution: Option<ExecutionReport>,
}

impl BuildOutcome {
    /// 没有任何可构建的内容
    pub fn is_empty(&self) -> bool {
        self.project.plan.is_empty()
    }
}

/// 清理输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// 实际删除的路径
    pub removed: Vec<PathBuf>,
}

/// 初始化输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// 新建的文件
    pub created: Vec<PathBuf>,
    /// 已存在而未覆盖的文件
    pub kept: Vec<PathBuf>,
}
