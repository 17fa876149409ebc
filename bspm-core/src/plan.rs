//! 构建计划合成
//!
//! 纯数据变换：不读写文件，不启动进程。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::graph::DependencyGraph;
use crate::unit::{TranslationUnit, UnitKind};

/// 一个原子工具链步骤
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// 预编译系统头文件
    PrecompileHeader { header: String },
    /// 编译一个翻译单元
    Compile {
        source: PathBuf,
        kind: UnitKind,
        object: PathBuf,
    },
    /// 链接所有目标文件
    Link {
        objects: Vec<PathBuf>,
        libraries: Vec<String>,
        output: PathBuf,
    },
}

impl BuildStep {
    /// 步骤种类名
    pub fn kind_name(&self) -> &'static str {
        match self {
            BuildStep::PrecompileHeader { .. } => "header",
            BuildStep::Compile { .. } => "compile",
            BuildStep::Link { .. } => "link",
        }
    }

    /// 简短描述，用于日志与错误信息
    pub fn label(&self) -> String {
        let subject = match self {
            BuildStep::PrecompileHeader { header } => format!("<{}>", header),
            BuildStep::Compile { source, .. } => source.display().to_string(),
            BuildStep::Link { output, .. } => output.display().to_string(),
        };
        format!("{} {}", self.kind_name(), subject)
    }
}

/// 计划中的步骤及其依赖（前序步骤下标）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: BuildStep,
    pub deps: Vec<usize>,
}

/// 有序构建计划
///
/// 步骤序列本身就是依赖关系的一个合法线性化。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    pub steps: Vec<PlannedStep>,
    /// 全部系统头文件 import（排序、去重）
    pub headers: BTreeSet<String>,
}

impl BuildPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 按顺序迭代步骤
    pub fn iter(&self) -> impl Iterator<Item = &BuildStep> {
        self.steps.iter().map(|s| &s.step)
    }

    /// 所有编译步骤产出的目标文件
    pub fn objects(&self) -> Vec<&PathBuf> {
        self.iter()
            .filter_map(|s| match s {
                BuildStep::Compile { object, .. } => Some(object),
                _ => None,
            })
            .collect()
    }

    /// 按依赖深度分组
    ///
    /// 同一组内的步骤互不依赖，可以并行执行；组按深度递增排列，
    /// 组内保持计划顺序。
    pub fn waves(&self) -> Vec<Vec<usize>> {
        let mut depth = vec![0usize; self.steps.len()];
        for (idx, planned) in self.steps.iter().enumerate() {
            depth[idx] = planned
                .deps
                .iter()
                .map(|&d| depth[d] + 1)
                .max()
                .unwrap_or(0);
        }

        let mut waves: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, d) in depth.into_iter().enumerate() {
            waves.entry(d).or_default().push(idx);
        }
        waves.into_values().collect()
    }
}

/// 头文件触发的额外链接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    pub header: String,
    pub libraries: Vec<String>,
}

static DEFAULT_LINK_RULES: Lazy<LinkRules> = Lazy::new(|| {
    LinkRules::empty()
        .with_rule("cmath", ["-lm"])
        .with_rule("math.h", ["-lm"])
        .with_rule("complex", ["-lm"])
        .with_rule("thread", ["-pthread"])
});

/// 条件链接规则表
///
/// 当某个头文件出现在 import 集合中时，把对应参数追加到链接步骤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRules {
    rules: Vec<LinkRule>,
}

impl Default for LinkRules {
    fn default() -> Self {
        DEFAULT_LINK_RULES.clone()
    }
}

impl LinkRules {
    /// 空规则表
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 追加一条规则
    pub fn with_rule<I, S>(mut self, header: impl Into<String>, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(LinkRule {
            header: header.into(),
            libraries: libraries.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// 给定头文件集合所需的链接参数，按规则顺序去重
    pub fn libraries_for(&self, headers: &BTreeSet<String>) -> Vec<String> {
        let mut libs: Vec<String> = Vec::new();
        for rule in self.rules.iter().filter(|r| headers.contains(&r.header)) {
            for lib in &rule.libraries {
                if !libs.contains(lib) {
                    libs.push(lib.clone());
                }
            }
        }
        libs
    }
}

/// 计划参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSettings {
    /// 目标文件扩展名（不含点）
    pub object_extension: String,
    /// 链接产物路径
    pub output: PathBuf,
    pub link_rules: LinkRules,
}

/// 由排序结果合成构建计划
///
/// 1. 每个头文件一个预编译步骤，按名称排序；
/// 2. 每个单元一个编译步骤，按拓扑顺序；
/// 3. 存在目标文件时追加唯一的链接步骤。
pub fn synthesize(
    units: &[TranslationUnit],
    order: &[usize],
    graph: &DependencyGraph,
    settings: &PlanSettings,
) -> BuildPlan {
    let headers: BTreeSet<String> = units
        .iter()
        .flat_map(|u| u.header_imports().map(str::to_string))
        .collect();

    let mut steps = Vec::with_capacity(headers.len() + order.len() + 1);
    let mut header_steps: HashMap<String, usize> = HashMap::new();
    for header in &headers {
        header_steps.insert(header.clone(), steps.len());
        steps.push(PlannedStep {
            step: BuildStep::PrecompileHeader {
                header: header.clone(),
            },
            deps: Vec::new(),
        });
    }

    let mut compile_steps: HashMap<usize, usize> = HashMap::new();
    let mut objects: Vec<PathBuf> = Vec::with_capacity(order.len());
    for &idx in order {
        let unit = &units[idx];
        let object = unit.object_path(&settings.object_extension);
        if objects.contains(&object) {
            warn!(target: "bspm::plan", object = %object.display(), "object path produced by more than one unit");
        }

        let mut deps: Vec<usize> = unit
            .header_imports()
            .filter_map(|h| header_steps.get(h).copied())
            .collect();
        deps.extend(
            graph
                .dependencies(idx)
                .iter()
                .filter_map(|dep| compile_steps.get(dep).copied()),
        );

        compile_steps.insert(idx, steps.len());
        objects.push(object.clone());
        steps.push(PlannedStep {
            step: BuildStep::Compile {
                source: unit.path.clone(),
                kind: unit.kind,
                object,
            },
            deps,
        });
    }

    if objects.is_empty() {
        debug!(target: "bspm::plan", headers = headers.len(), "no objects, link step suppressed");
    } else {
        let libraries = settings.link_rules.libraries_for(&headers);
        let mut deps: Vec<usize> = compile_steps.values().copied().collect();
        deps.sort_unstable();
        steps.push(PlannedStep {
            step: BuildStep::Link {
                objects,
                libraries,
                output: settings.output.clone(),
            },
            deps,
        });
    }

    debug!(target: "bspm::plan", steps = steps.len(), headers = headers.len(), "plan synthesized");
    BuildPlan { steps, headers }
}
