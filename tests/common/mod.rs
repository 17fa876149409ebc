//! 测试辅助工具
//!
//! 临时项目目录和替代编译器的步骤执行器

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bspm_core::CommandSpec;
use bspm_orchestrator::{ExecError, StepOutput, StepRunner};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// 系统临时目录下的项目目录，析构时删除
pub struct TempProject {
    root: PathBuf,
}

impl TempProject {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "bspm-it-{}-{}-{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    /// 不创建目录，只分配路径（用于 `init`）
    pub fn unborn(name: &str) -> Self {
        let project = Self::new(name);
        std::fs::remove_dir_all(&project.root).unwrap();
        project
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }
}

impl Drop for TempProject {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// 假编译器：记录命令，并在 `-o` 指定的位置写出文件
#[derive(Default)]
pub struct FakeToolchain {
    commands: Mutex<Vec<String>>,
    /// 参数中包含此文件名的步骤以退出码 1 失败
    fail_on: Option<String>,
}

impl FakeToolchain {
    pub fn failing_on(file: &str) -> Self {
        Self {
            fail_on: Some(file.to_string()),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl StepRunner for FakeToolchain {
    fn run(&self, command: &CommandSpec) -> Result<StepOutput, ExecError> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(file) = &self.fail_on {
            if command.args.iter().any(|a| a == file) {
                return Ok(StepOutput::failure(
                    1,
                    format!("{}:3:1: error: expected ';' before '}}' token\n", file),
                ));
            }
        }

        if let Some(pos) = command.args.iter().position(|a| a == "-o") {
            let target = command.cwd.join(&command.args[pos + 1]);
            std::fs::write(&target, b"fake").unwrap();
        }
        Ok(StepOutput::success(""))
    }
}
