//! 依赖图构建
//!
//! 节点是翻译单元在序列中的下标，边 `u -> v` 表示 u 导入了 v 声明的模块。

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::unit::TranslationUnit;

/// 模块名到声明单元下标的映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIndex {
    modules: HashMap<String, usize>,
}

impl ModuleIndex {
    /// 建立索引，同名模块被两个单元声明时报错
    pub fn build(units: &[TranslationUnit]) -> CoreResult<Self> {
        let mut modules: HashMap<String, usize> = HashMap::new();
        for (idx, unit) in units.iter().enumerate() {
            let Some(name) = &unit.declared_module else {
                continue;
            };
            if let Some(&first) = modules.get(name) {
                return Err(CoreError::DuplicateModuleDeclaration {
                    module: name.clone(),
                    first: units[first].path.clone(),
                    second: unit.path.clone(),
                });
            }
            modules.insert(name.clone(), idx);
        }
        Ok(Self { modules })
    }

    /// 查找声明某模块的单元
    pub fn get(&self, module: &str) -> Option<usize> {
        self.modules.get(module).copied()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// 未解析的模块 import，视为外部依赖
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedImport {
    /// 发起 import 的单元下标
    pub unit: usize,
    pub name: String,
}

/// 分区 import（`import :part;`）补全为所在模块的分区名
///
/// `m` 或 `m:other` 中的 `:part` 都指向 `m:part`；没有模块声明的单元原样保留。
fn qualified_import(unit: &TranslationUnit, name: &str) -> String {
    match (name.starts_with(':'), unit.declared_module.as_deref()) {
        (true, Some(module)) => {
            let primary = module.split(':').next().unwrap_or(module);
            format!("{}{}", primary, name)
        }
        _ => name.to_string(),
    }
}

/// 依赖图
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// 模块索引
    pub index: ModuleIndex,
    /// 每个单元的依赖，按 import 记录顺序
    pub edges: Vec<Vec<usize>>,
    /// 找不到声明者的模块 import
    pub unresolved: Vec<UnresolvedImport>,
}

impl DependencyGraph {
    /// 解析所有模块形式的 import
    ///
    /// 头文件形式的 import 从不产生边；自导入被丢弃。
    pub fn build(units: &[TranslationUnit]) -> CoreResult<Self> {
        let index = ModuleIndex::build(units)?;
        let mut edges = Vec::with_capacity(units.len());
        let mut unresolved = Vec::new();

        for (idx, unit) in units.iter().enumerate() {
            let mut deps: Vec<usize> = Vec::new();
            for written in unit.module_imports() {
                let name = qualified_import(unit, written);
                let name = name.as_str();
                match index.get(name) {
                    Some(dep) if dep == idx => {
                        trace!(target: "bspm::graph", path = %unit.path.display(), %name, "self import dropped");
                    }
                    Some(dep) => {
                        if !deps.contains(&dep) {
                            deps.push(dep);
                        }
                    }
                    None => {
                        debug!(target: "bspm::graph", path = %unit.path.display(), %name, "unresolved import treated as external");
                        unresolved.push(UnresolvedImport {
                            unit: idx,
                            name: name.to_string(),
                        });
                    }
                }
            }
            edges.push(deps);
        }

        debug!(
            target: "bspm::graph",
            nodes = units.len(),
            modules = index.len(),
            edges = edges.iter().map(Vec::len).sum::<usize>(),
            unresolved = unresolved.len(),
            "graph built"
        );
        Ok(Self {
            index,
            edges,
            unresolved,
        })
    }

    /// 节点数
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// 某单元的直接依赖
    pub fn dependencies(&self, unit: usize) -> &[usize] {
        self.edges.get(unit).map(Vec::as_slice).unwrap_or(&[])
    }
}
