//! 翻译单元数据模型

use std::path::{Path, PathBuf};

/// 接口文件扩展名
pub const INTERFACE_EXTENSION: &str = "cppm";
/// 实现文件扩展名
pub const IMPLEMENTATION_EXTENSION: &str = "cpp";

/// 单元种类，由扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// `.cppm`，导出模块接口
    Interface,
    /// `.cpp`，普通编译代码
    Implementation,
}

impl UnitKind {
    /// 根据扩展名判定种类，其他扩展名返回 None
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            INTERFACE_EXTENSION => Some(UnitKind::Interface),
            IMPLEMENTATION_EXTENSION => Some(UnitKind::Implementation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Interface => "interface",
            UnitKind::Implementation => "implementation",
        }
    }
}

/// import 语句的词法形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportForm {
    /// `import name;`
    Module,
    /// `import <name>;`
    Header,
}

/// 一条 import 记录
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    pub form: ImportForm,
    pub name: String,
}

impl Import {
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            form: ImportForm::Module,
            name: name.into(),
        }
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self {
            form: ImportForm::Header,
            name: name.into(),
        }
    }
}

/// 翻译单元（一个源文件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// 文件路径
    pub path: PathBuf,
    /// 单元种类
    pub kind: UnitKind,
    /// 声明的模块名（仅当文件包含 `export module` 声明）
    pub declared_module: Option<String>,
    /// import 列表（文件内去重，按首次出现顺序）
    pub imports: Vec<Import>,
    /// 目录遍历时的原始位置
    pub discovery_index: usize,
}

impl TranslationUnit {
    /// 创建尚未提取声明的单元
    pub fn new(path: impl Into<PathBuf>, kind: UnitKind, discovery_index: usize) -> Self {
        Self {
            path: path.into(),
            kind,
            declared_module: None,
            imports: Vec::new(),
            discovery_index,
        }
    }

    /// 模块形式的 import 名称
    pub fn module_imports(&self) -> impl Iterator<Item = &str> {
        self.imports_of(ImportForm::Module)
    }

    /// 系统头文件形式的 import 名称
    pub fn header_imports(&self) -> impl Iterator<Item = &str> {
        self.imports_of(ImportForm::Header)
    }

    fn imports_of(&self, form: ImportForm) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .filter(move |i| i.form == form)
            .map(|i| i.name.as_str())
    }

    /// 目标文件路径：替换扩展名
    pub fn object_path(&self, object_extension: &str) -> PathBuf {
        self.path.with_extension(object_extension)
    }

    /// 文件名，用于日志
    pub fn file_name(&self) -> &Path {
        self.path
            .file_name()
            .map(Path::new)
            .unwrap_or(self.path.as_path())
    }
}
