//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和构建过程打印。

use bspm_api::{BspmError, BuildOutcome};
use bspm_core::Warning;
use bspm_orchestrator::OutputEntry;

/// 打印错误；失败步骤附带其诊断输出
pub fn print_error(e: &BspmError, json: bool) {
    let report = e.to_report();
    if json {
        eprintln!("{}", report.to_json());
        return;
    }

    eprintln!("error: {}", report);
    for file in &report.files {
        eprintln!("  --> {}", file);
    }
    if let Some(stderr) = report.stderr.as_deref() {
        print_diagnostics(stderr);
    }
}

/// 打印工具链诊断输出（带分隔线）
pub fn print_diagnostics(text: &str) {
    let text = text.trim_end();
    if text.is_empty() {
        return;
    }
    eprintln!("---|--");
    for line in text.lines() {
        eprintln!("   | {}", line);
    }
    eprintln!("---|--");
}

pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

/// 详细模式：按编译顺序打印每个文件及其导入
pub fn print_units(outcome: &BuildOutcome) {
    for unit in outcome.project.ordered_units() {
        println!("File: {}", unit.path.display());
        for import in &unit.imports {
            println!("Import: {}", import.name);
        }
    }
}

/// 打印渲染后的命令（演练模式）
pub fn print_commands(outcome: &BuildOutcome) {
    for command in &outcome.commands {
        println!("{}", command);
    }
}

/// 打印执行期间捕获的输出
///
/// 命令行只在详细模式下打印；工具链的输出总是打印。
pub fn print_output(entries: &[OutputEntry], verbose: bool) {
    for entry in entries {
        match entry {
            OutputEntry::Command(line) if verbose => println!("Command: {}", line),
            OutputEntry::Command(_) => {}
            OutputEntry::Stdout(text) => {
                let text = text.trim_end();
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            OutputEntry::Stderr(text) => print_diagnostics(text),
        }
    }
}
