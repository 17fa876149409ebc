//! API 层配置
//!
//! `BuildConfig` 是一次构建调用的完整参数；`ProjectFile` 是项目目录下的
//! `bspm.json`，由调用方读取后合并进 `BuildConfig`。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bspm_config::{BuildOptions, ToolchainConfig};
use bspm_core::{LinkRules, PlanSettings, Toolchain};
use bspm_vfs::VirtualFileSystem;
use serde::{Deserialize, Serialize};

use crate::error::BspmError;

/// 项目配置文件名
pub const PROJECT_FILE: &str = "bspm.json";

/// 模块缓存目录（由工具链在项目目录下创建）
pub const MODULE_CACHE_DIR: &str = "gcm.cache";

/// Build invocation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub options: BuildOptions,
    pub toolchain: ToolchainConfig,
    pub link_rules: LinkRules,
    /// Render commands without running them
    pub dry_run: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            options: BuildOptions::default(),
            toolchain: ToolchainConfig::default(),
            link_rules: LinkRules::default(),
            dry_run: false,
        }
    }
}

impl BuildConfig {
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Apply the settings a project file overrides
    ///
    /// `jobs` is left alone; command line and file precedence is the caller's call.
    pub fn apply_project(mut self, project: &ProjectFile) -> Self {
        if let Some(toolchain) = &project.toolchain {
            self.toolchain = toolchain.clone();
        }
        if let Some(output) = &project.output {
            self.toolchain.output_name = output.clone();
        }
        for (header, libraries) in &project.link_rules {
            self.link_rules = self.link_rules.with_rule(header.clone(), libraries.clone());
        }
        self
    }

    /// Linked artifact path inside `dir`
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.toolchain.output_name)
    }

    pub fn plan_settings(&self, dir: &Path) -> PlanSettings {
        PlanSettings {
            object_extension: self.toolchain.object_extension.clone(),
            output: self.output_path(dir),
            link_rules: self.link_rules.clone(),
        }
    }

    pub fn toolchain_for(&self, dir: &Path) -> Toolchain {
        Toolchain::new(self.toolchain.clone(), self.options.profile(), dir)
    }
}

/// `bspm.json` contents; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
    /// Partial toolchain override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,
    /// Output artifact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Default worker count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Default log level (error, warn, info, debug, trace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Extra link rules: header name -> linker arguments
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub link_rules: BTreeMap<String, Vec<String>>,
}

impl ProjectFile {
    /// Parse project file text
    pub fn parse(text: &str) -> Result<Self, BspmError> {
        serde_json::from_str(text).map_err(|e| BspmError::Config(format!("{}: {}", PROJECT_FILE, e)))
    }

    /// Load `bspm.json` from `dir`; a missing file yields the defaults
    pub fn load(fs: &dyn VirtualFileSystem, dir: &Path) -> Result<Self, BspmError> {
        let path = dir.join(PROJECT_FILE);
        if !fs.is_file(&path) {
            return Ok(Self::default());
        }
        let bytes = fs.read_file(&path)?;
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    /// Contents written by `init`
    pub fn starter() -> Self {
        Self {
            jobs: Some(1),
            ..Self::default()
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, BspmError> {
        serde_json::to_string_pretty(self).map_err(|e| BspmError::Config(e.to_string()))
    }
}
