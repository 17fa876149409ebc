//! Step executor
//!
//! With one job the plan runs strictly in order. With more jobs the plan is
//! split into dependency waves and each wave runs on a rayon pool; the link
//! step always forms the final wave on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bspm_core::{BuildPlan, BuildStep, CommandSpec, Toolchain};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ExecError;
use crate::output::{new_output_buffer, OutputEntry, OutputHandle};
use crate::runner::{StepOutput, StepRunner};

/// One step that ran to a successful exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Index of the step in the plan
    pub index: usize,
    pub label: String,
    pub command: String,
}

/// Result of a successful plan execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Finished steps, in plan order
    pub steps: Vec<StepRecord>,
    /// Captured command lines and toolchain output
    pub output: Vec<OutputEntry>,
}

/// Executes build plans through a [`StepRunner`]
pub struct Executor {
    runner: Arc<dyn StepRunner>,
    jobs: usize,
    output: OutputHandle,
}

impl Executor {
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self {
            runner,
            jobs: 1,
            output: new_output_buffer(),
        }
    }

    /// Worker count; values below 2 run sequentially
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Render every step without running anything
    pub fn render(plan: &BuildPlan, toolchain: &Toolchain) -> Vec<CommandSpec> {
        plan.iter().map(|step| toolchain.render(step)).collect()
    }

    /// Run the plan; the first failing step aborts everything not yet started
    pub fn execute(
        &self,
        plan: &BuildPlan,
        toolchain: &Toolchain,
    ) -> Result<ExecutionReport, ExecError> {
        info!(target: "bspm::exec", steps = plan.len(), jobs = self.jobs, "executing plan");
        let steps = if self.jobs <= 1 {
            self.execute_sequential(plan, toolchain)?
        } else {
            self.execute_parallel(plan, toolchain)?
        };
        info!(target: "bspm::exec", steps = steps.len(), "plan finished");
        Ok(ExecutionReport {
            steps,
            output: self.output.drain(),
        })
    }

    fn execute_sequential(
        &self,
        plan: &BuildPlan,
        toolchain: &Toolchain,
    ) -> Result<Vec<StepRecord>, ExecError> {
        let mut records = Vec::with_capacity(plan.len());
        for (index, step) in plan.iter().enumerate() {
            records.push(self.run_step(index, step, toolchain)?);
        }
        Ok(records)
    }

    fn execute_parallel(
        &self,
        plan: &BuildPlan,
        toolchain: &Toolchain,
    ) -> Result<Vec<StepRecord>, ExecError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("bspm-worker-{}", i))
            .build()
            .map_err(|e| ExecError::Pool(e.to_string()))?;

        let cancelled = AtomicBool::new(false);
        let mut records = Vec::with_capacity(plan.len());

        for (wave_no, wave) in plan.waves().into_iter().enumerate() {
            debug!(target: "bspm::exec", wave = wave_no, steps = wave.len(), "starting wave");

            let results: Vec<Result<StepRecord, ExecError>> = pool.install(|| {
                wave.par_iter()
                    .map(|&index| {
                        if cancelled.load(Ordering::SeqCst) {
                            return Err(ExecError::Cancelled);
                        }
                        let result = self.run_step(index, &plan.steps[index].step, toolchain);
                        if result.is_err() {
                            cancelled.store(true, Ordering::SeqCst);
                        }
                        result
                    })
                    .collect()
            });

            let mut failure: Option<ExecError> = None;
            for result in results {
                match result {
                    Ok(record) => records.push(record),
                    Err(e) if e.is_cancellation() => {}
                    Err(e) => {
                        if failure.is_none() {
                            failure = Some(e);
                        }
                    }
                }
            }
            if let Some(e) = failure {
                warn!(target: "bspm::exec", wave = wave_no, "wave failed, remaining steps cancelled");
                return Err(e);
            }
        }

        Ok(records)
    }

    fn run_step(
        &self,
        index: usize,
        step: &BuildStep,
        toolchain: &Toolchain,
    ) -> Result<StepRecord, ExecError> {
        let command = toolchain.render(step);
        let line = command.to_string();
        let label = step.label();
        debug!(target: "bspm::exec", step = index, kind = step.kind_name(), "{}", line);

        let outcome = self.runner.run(&command);
        let mut entries = vec![OutputEntry::Command(line.clone())];
        if let Ok(output) = &outcome {
            entries.extend(captured(output));
        }
        self.output.push_all(entries);

        let output = outcome?;
        if !output.is_success() {
            warn!(target: "bspm::exec", step = index, status = ?output.status, "{} failed", label);
            return Err(ExecError::StepFailed {
                step: label,
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(StepRecord {
            index,
            label,
            command: line,
        })
    }
}

fn captured(output: &StepOutput) -> Vec<OutputEntry> {
    let mut entries = Vec::new();
    if !output.stdout.is_empty() {
        entries.push(OutputEntry::Stdout(output.stdout.clone()));
    }
    if !output.stderr.is_empty() {
        entries.push(OutputEntry::Stderr(output.stderr.clone()));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use bspm_core::{LinkRules, PlanSettings, Profile, ToolchainConfig, UnitKind};
    use bspm_core::{DependencyGraph, Import, TranslationUnit};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records every command; fails those whose line contains `fail_on`
    struct FakeRunner {
        fail_on: Option<String>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn new(fail_on: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                fail_on: fail_on.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl StepRunner for FakeRunner {
        fn run(&self, command: &CommandSpec) -> Result<StepOutput, ExecError> {
            let line = command.to_string();
            self.seen.lock().unwrap().push(line.clone());
            match &self.fail_on {
                Some(pat) if line.contains(pat.as_str()) => {
                    Ok(StepOutput::failure(1, format!("error in {}", pat)))
                }
                _ => Ok(StepOutput::success("")),
            }
        }
    }

    fn toolchain() -> Toolchain {
        Toolchain::new(ToolchainConfig::default(), Profile::Default, "/proj")
    }

    /// a.cppm, b.cppm (imports a), c.cppm, main.cpp (imports b and c, <cmath>)
    fn sample_plan() -> BuildPlan {
        let mk = |name: &str, module: Option<&str>, imports: Vec<Import>| {
            let kind = if name.ends_with(".cppm") {
                UnitKind::Interface
            } else {
                UnitKind::Implementation
            };
            let mut u = TranslationUnit::new(format!("/proj/{}", name), kind, 0);
            u.declared_module = module.map(str::to_string);
            u.imports = imports;
            u
        };
        let units = vec![
            mk("a.cppm", Some("a"), vec![]),
            mk("b.cppm", Some("b"), vec![Import::module("a")]),
            mk("c.cppm", Some("c"), vec![]),
            mk(
                "main.cpp",
                None,
                vec![Import::module("b"), Import::module("c"), Import::header("cmath")],
            ),
        ];
        let graph = DependencyGraph::build(&units).unwrap();
        let order = bspm_core::topological_order(&units, &graph).unwrap();
        bspm_core::synthesize(
            &units,
            &order,
            &graph,
            &PlanSettings {
                object_extension: "o".to_string(),
                output: PathBuf::from("/proj/a.out"),
                link_rules: LinkRules::default(),
            },
        )
    }

    #[test]
    fn test_sequential_runs_in_plan_order() {
        let runner = FakeRunner::new(None);
        let executor = Executor::new(runner.clone());
        let plan = sample_plan();

        let report = executor.execute(&plan, &toolchain()).unwrap();

        let expected: Vec<String> = Executor::render(&plan, &toolchain())
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(runner.seen(), expected);
        assert_eq!(report.steps.len(), plan.len());
        assert_eq!(
            report.output.first(),
            Some(&OutputEntry::Command(expected[0].clone()))
        );
    }

    #[test]
    fn test_sequential_failure_aborts_rest() {
        let runner = FakeRunner::new(Some("b.cppm"));
        let executor = Executor::new(runner.clone());

        let err = executor.execute(&sample_plan(), &toolchain()).unwrap_err();

        match err {
            ExecError::StepFailed { step, status, stderr, .. } => {
                assert_eq!(step, "compile /proj/b.cppm");
                assert_eq!(status, Some(1));
                assert_eq!(stderr, "error in b.cppm");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let seen = runner.seen();
        assert!(seen.last().unwrap().contains("b.cppm"));
        assert!(!seen.iter().any(|l| l.contains("main.cpp")));
        assert!(!seen.iter().any(|l| l.contains("-o a.out")));
    }

    #[test]
    fn test_parallel_respects_dependencies() {
        let runner = FakeRunner::new(None);
        let executor = Executor::new(runner.clone()).with_jobs(4);
        let plan = sample_plan();

        let report = executor.execute(&plan, &toolchain()).unwrap();
        assert_eq!(report.steps.len(), plan.len());

        let seen = runner.seen();
        let pos = |needle: &str| seen.iter().position(|l| l.contains(needle)).unwrap();
        assert!(pos("-c a.cppm") < pos("-c b.cppm"));
        assert!(pos("-c b.cppm") < pos("-c main.cpp"));
        assert!(pos("-c c.cppm") < pos("-c main.cpp"));
        assert!(pos("c++-system-header cmath") < pos("-c main.cpp"));
        assert_eq!(pos("-o a.out"), seen.len() - 1);
    }

    #[test]
    fn test_parallel_failure_stops_later_waves() {
        let runner = FakeRunner::new(Some("a.cppm"));
        let executor = Executor::new(runner.clone()).with_jobs(3);

        let err = executor.execute(&sample_plan(), &toolchain()).unwrap_err();
        assert!(matches!(err, ExecError::StepFailed { .. }));

        let seen = runner.seen();
        assert!(!seen.iter().any(|l| l.contains("-c b.cppm")));
        assert!(!seen.iter().any(|l| l.contains("main.cpp")));
        assert!(!seen.iter().any(|l| l.contains("-o a.out")));
    }

    #[test]
    fn test_empty_plan() {
        let runner = FakeRunner::new(None);
        let report = Executor::new(runner.clone())
            .with_jobs(2)
            .execute(&BuildPlan::default(), &toolchain())
            .unwrap();
        assert!(report.steps.is_empty());
        assert!(runner.seen().is_empty());
    }

    #[test]
    fn test_jobs_clamped() {
        let executor = Executor::new(FakeRunner::new(None)).with_jobs(0);
        assert_eq!(executor.jobs(), 1);
    }
}
