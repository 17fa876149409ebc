//! CLI 配置
//!
//! 包含 CLI 特有的配置：分阶段日志级别

use bspm_config::Phase;
use tracing::Level;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub catalog: Option<Level>,
    pub extract: Option<Level>,
    pub graph: Option<Level>,
    pub order: Option<Level>,
    pub plan: Option<Level>,
    pub exec: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::with_global(Level::WARN)
    }
}

impl LogConfig {
    /// 所有阶段使用同一级别
    pub fn with_global(global: Level) -> Self {
        Self {
            global,
            catalog: None,
            extract: None,
            graph: None,
            order: None,
            plan: None,
            exec: None,
        }
    }

    /// 根据 `--verbose` 和 `bspm.json` 中的 `log_level` 决定级别
    ///
    /// `--verbose` 优先；无法识别的级别名回退到默认值。
    pub fn resolve(verbose: bool, file_level: Option<&str>) -> Self {
        if verbose {
            return Self::with_global(Level::DEBUG);
        }
        match file_level.and_then(parse_log_level) {
            Some(level) => Self::with_global(level),
            None => Self::default(),
        }
    }

    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        let specific = match phase {
            Phase::Catalog => self.catalog,
            Phase::Extract => self.extract,
            Phase::Graph => self.graph,
            Phase::Order => self.order,
            Phase::Plan => self.plan,
            Phase::Exec => self.exec,
        };
        specific.unwrap_or(self.global)
    }
}

/// Parse log level string
pub fn parse_log_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "silent" => Some(Level::ERROR), // silent = only errors
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
