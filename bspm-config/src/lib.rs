//! bspm Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all bspm crates.

use serde::{Deserialize, Serialize};

/// Default output artifact name for the host platform
#[cfg(windows)]
pub const DEFAULT_OUTPUT_NAME: &str = "a.exe";
/// Default output artifact name for the host platform
#[cfg(not(windows))]
pub const DEFAULT_OUTPUT_NAME: &str = "a.out";

/// Toolchain invocation settings
///
/// Every field has a default, so a project file only needs to name the
/// settings it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Compiler driver binary
    pub compiler: String,
    /// Language standard flag
    pub std: String,
    /// Flags enabling module support, passed to every compile step
    pub module_flags: Vec<String>,
    /// Flags selecting the interface-unit (module-emitting) template
    pub interface_flags: Vec<String>,
    /// Flags selecting the system-header precompile template
    pub header_flags: Vec<String>,
    /// Flags passed to the link step
    pub ld_flags: Vec<String>,
    /// Object file extension (without the dot)
    pub object_extension: String,
    /// Linked artifact file name, relative to the project directory
    pub output_name: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            std: "-std=c++20".to_string(),
            module_flags: vec!["-fmodules-ts".to_string()],
            interface_flags: vec!["-x".to_string(), "c++".to_string()],
            header_flags: vec!["-x".to_string(), "c++-system-header".to_string()],
            ld_flags: vec!["-lstdc++".to_string()],
            object_extension: "o".to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

/// Build profile selected by `--debug` / `--release`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// No optimisation or debug flags added
    #[default]
    Default,
    /// Debug information, no optimisation
    Debug,
    /// Optimised, assertions disabled
    Release,
}

impl Profile {
    /// Pick the profile from the two command line switches.
    ///
    /// `release` wins when both are set.
    pub fn from_flags(debug: bool, release: bool) -> Self {
        match (debug, release) {
            (_, true) => Profile::Release,
            (true, false) => Profile::Debug,
            (false, false) => Profile::Default,
        }
    }

    /// Compiler flags contributed by this profile
    pub fn flags(&self) -> &'static [&'static str] {
        match self {
            Profile::Default => &[],
            Profile::Debug => &["-g", "-O0"],
            Profile::Release => &["-O2", "-DNDEBUG"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Default => "default",
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

/// Options record handed to a build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// `--debug`
    pub debug: bool,
    /// `--release`
    pub release: bool,
    /// `--verbose`
    pub verbose: bool,
    /// Worker count for step execution; 1 runs every step in sequence
    pub jobs: usize,
}

impl BuildOptions {
    /// Resolved build profile
    pub fn profile(&self) -> Profile {
        Profile::from_flags(self.debug, self.release)
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            debug: false,
            release: false,
            verbose: false,
            jobs: 1,
        }
    }
}

/// Build phase enum for phase-specific log configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Catalog,
    Extract,
    Graph,
    Order,
    Plan,
    Exec,
}

impl Phase {
    /// All phases, in pipeline order
    pub const ALL: [Phase; 6] = [
        Phase::Catalog,
        Phase::Extract,
        Phase::Graph,
        Phase::Order,
        Phase::Plan,
        Phase::Exec,
    ];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Catalog => "catalog",
            Phase::Extract => "extract",
            Phase::Graph => "graph",
            Phase::Order => "order",
            Phase::Plan => "plan",
            Phase::Exec => "exec",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("bspm::{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolchain_config() {
        let cfg = ToolchainConfig::default();
        assert_eq!(cfg.compiler, "gcc");
        assert_eq!(cfg.std, "-std=c++20");
        assert_eq!(cfg.module_flags, vec!["-fmodules-ts"]);
        assert_eq!(cfg.ld_flags, vec!["-lstdc++"]);
        assert_eq!(cfg.object_extension, "o");
        assert_eq!(cfg.output_name, DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn test_partial_toolchain_from_json() {
        let cfg: ToolchainConfig =
            serde_json::from_str(r#"{ "compiler": "g++-14", "ld_flags": [] }"#).unwrap();
        assert_eq!(cfg.compiler, "g++-14");
        assert!(cfg.ld_flags.is_empty());
        // 未指定的字段保持默认值
        assert_eq!(cfg.std, "-std=c++20");
    }

    #[test]
    fn test_unknown_toolchain_field_rejected() {
        let result: Result<ToolchainConfig, _> = serde_json::from_str(r#"{ "compilr": "clang" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_from_flags() {
        assert_eq!(Profile::from_flags(false, false), Profile::Default);
        assert_eq!(Profile::from_flags(true, false), Profile::Debug);
        assert_eq!(Profile::from_flags(false, true), Profile::Release);
        assert_eq!(Profile::from_flags(true, true), Profile::Release);
    }

    #[test]
    fn test_profile_flags() {
        assert!(Profile::Default.flags().is_empty());
        assert_eq!(Profile::Debug.flags(), &["-g", "-O0"]);
        assert_eq!(Profile::Release.flags(), &["-O2", "-DNDEBUG"]);
    }

    #[test]
    fn test_default_build_options() {
        let opts = BuildOptions::default();
        assert_eq!(opts.jobs, 1);
        assert_eq!(opts.profile(), Profile::Default);
    }

    #[test]
    fn test_phase_as_str() {
        assert_eq!(Phase::Catalog.as_str(), "catalog");
        assert_eq!(Phase::Exec.target(), "bspm::exec");
        assert_eq!(Phase::ALL.len(), 6);
    }
}
