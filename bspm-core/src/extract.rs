//! 声明提取器
//!
//! 逐行分类源文本，得到模块声明与 import 列表。分类前先去掉注释和
//! 字符串字面量内容，避免注释或字符串里的关键字被误认。

use std::collections::HashSet;

use bspm_vfs::VirtualFileSystem;
use tracing::{debug, trace, warn};

use crate::error::{Warning, WarningKind};
use crate::unit::{Import, ImportForm, TranslationUnit};

/// 单行分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `export module name;`
    ModuleDecl(String),
    /// `import name;` 或 `import <name>;`（可带 `export` 前缀）
    Import(ImportForm, String),
    /// 其他
    Other,
}

/// 一个文件的提取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub declared_module: Option<String>,
    pub imports: Vec<Import>,
}

/// 分类一行已去除注释的文本
///
/// 关键字必须位于语句开头，语句必须以 `;` 结束。
pub fn classify_line(line: &str) -> LineKind {
    let mut rest = line.trim();
    let exported = match strip_keyword(rest, "export") {
        Some(after) => {
            rest = after.trim_start();
            true
        }
        None => false,
    };

    if let Some(after) = strip_keyword(rest, "module") {
        // `module name;` 是模块实现单元，`module;` 是全局模块片段
        if !exported {
            return LineKind::Other;
        }
        return match statement_body(after) {
            Some(name) if is_module_name(name) => LineKind::ModuleDecl(name.to_string()),
            _ => LineKind::Other,
        };
    }

    if let Some(after) = strip_keyword(rest, "import") {
        let Some(body) = statement_body(after) else {
            return LineKind::Other;
        };
        if let Some(inner) = body.strip_prefix('<') {
            return match inner.strip_suffix('>').map(str::trim) {
                Some(name) if !name.is_empty() => {
                    LineKind::Import(ImportForm::Header, name.to_string())
                }
                _ => LineKind::Other,
            };
        }
        if is_module_name(body) {
            return LineKind::Import(ImportForm::Module, body.to_string());
        }
    }

    LineKind::Other
}

/// 关键字后必须是非标识符字符
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let after = text.strip_prefix(keyword)?;
    match after.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        _ => Some(after),
    }
}

/// 关键字与 `;` 之间的文本
fn statement_body(after_keyword: &str) -> Option<&str> {
    after_keyword
        .find(';')
        .map(|end| after_keyword[..end].trim())
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == ':')
}

/// 跨行维护块注释与原始字符串状态的注释剥离器
#[derive(Debug, Default)]
struct CommentStripper {
    in_block: bool,
    /// 未结束的原始字符串的结束标记，如 `)delim"`
    raw_close: Option<String>,
}

impl CommentStripper {
    /// 去掉注释，字符串与字符字面量只保留引号
    fn strip(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;

        while !rest.is_empty() {
            if let Some(close) = &self.raw_close {
                let Some(end) = rest.find(close.as_str()) else {
                    break;
                };
                rest = &rest[end + close.len()..];
                self.raw_close = None;
                out.push('"');
                continue;
            }
            if self.in_block {
                let Some(end) = rest.find("*/") else {
                    break;
                };
                rest = &rest[end + 2..];
                self.in_block = false;
                out.push(' ');
                continue;
            }
            if rest.starts_with("//") {
                break;
            }
            if let Some(after) = rest.strip_prefix("/*") {
                self.in_block = true;
                rest = after;
                continue;
            }
            if let Some((delim, body)) = raw_string_open(rest, &out) {
                out.push('"');
                self.raw_close = Some(format!("){}\"", delim));
                rest = body;
                continue;
            }

            let Some(c) = rest.chars().next() else {
                break;
            };
            rest = &rest[c.len_utf8()..];
            match c {
                '\'' if out.chars().last().is_some_and(|p| p.is_ascii_alphanumeric()) => {
                    // 数字分隔符，如 1'000
                    out.push(c);
                }
                '"' | '\'' => {
                    out.push(c);
                    rest = skip_quoted(rest, c);
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
        out
    }
}

/// 识别 `R"delim(` 开头（可带 `u8`/`u`/`U`/`L` 前缀），返回分隔符与正文
fn raw_string_open<'a>(rest: &'a str, before: &str) -> Option<(&'a str, &'a str)> {
    let body = rest.strip_prefix("R\"")?;
    let ident_start = before
        .trim_end_matches(|c: char| c.is_alphanumeric() || c == '_')
        .len();
    if !matches!(&before[ident_start..], "" | "u8" | "u" | "U" | "L") {
        return None;
    }
    let open = body.find('(')?;
    let delim = &body[..open];
    if delim.len() > 16 || delim.contains(|c: char| c.is_whitespace() || c == ')' || c == '\\') {
        return None;
    }
    Some((delim, &body[open + 1..]))
}

/// 跳过普通字面量正文，返回结束引号之后的文本；未结束时返回空
fn skip_quoted(text: &str, quote: char) -> &str {
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return &text[i + c.len_utf8()..];
        }
    }
    ""
}

/// 从源文本提取声明
///
/// 取第一条模块声明；import 在文件内按 (形式, 名称) 去重，保留首次出现顺序。
pub fn extract_declarations(source: &str) -> Declarations {
    let mut stripper = CommentStripper::default();
    let mut decls = Declarations::default();
    let mut seen = HashSet::new();

    for (line_no, raw) in source.lines().enumerate() {
        let line = stripper.strip(raw);
        match classify_line(&line) {
            LineKind::ModuleDecl(name) => {
                if decls.declared_module.is_none() {
                    decls.declared_module = Some(name);
                } else {
                    trace!(target: "bspm::extract", line = line_no + 1, %name, "extra module declaration ignored");
                }
            }
            LineKind::Import(form, name) => {
                if seen.insert((form, name.clone())) {
                    decls.imports.push(Import { form, name });
                }
            }
            LineKind::Other => {}
        }
    }

    decls
}

/// 读取单元内容并填充声明
///
/// 读取失败时单元保持无声明状态并返回警告。
pub fn extract_unit(fs: &dyn VirtualFileSystem, unit: &mut TranslationUnit) -> Result<(), Warning> {
    let bytes = match fs.read_file(&unit.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            unit.declared_module = None;
            unit.imports.clear();
            return Err(Warning {
                kind: WarningKind::FileUnreadable,
                path: unit.path.clone(),
                message: e.to_string(),
            });
        }
    };

    let decls = extract_declarations(&String::from_utf8_lossy(&bytes));
    unit.declared_module = decls.declared_module;
    unit.imports = decls.imports;

    debug!(
        target: "bspm::extract",
        path = %unit.path.display(),
        module = unit.declared_module.as_deref().unwrap_or("-"),
        imports = unit.imports.len(),
        "extracted"
    );
    for import in &unit.imports {
        trace!(target: "bspm::extract", path = %unit.path.display(), form = ?import.form, name = %import.name, "import");
    }
    Ok(())
}

/// 提取所有单元的声明，收集警告
pub fn extract_all(fs: &dyn VirtualFileSystem, units: &mut [TranslationUnit]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for unit in units.iter_mut() {
        if let Err(warning) = extract_unit(fs, unit) {
            warn!(target: "bspm::extract", "{}", warning);
            warnings.push(warning);
        }
    }
    warnings
}
