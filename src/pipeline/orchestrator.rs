use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::{
    config::DemoConfig,
    engine::{Engine, LogRecord},
    error::Result,
    hooks::{Feature, HookContext, HookRegistry},
    presentation::FeatureBoard,
    runner::RunInvoker,
};

/// One step of the showcase pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Load,
    Stage,
    Feature(Feature),
}

impl Step {
    /// The ordered plan for a selection of features
    pub fn plan(features: &[Feature]) -> Vec<Step> {
        let mut steps = vec![Step::Load, Step::Stage];
        steps.extend(Feature::canonical(features).into_iter().map(Step::Feature));
        steps
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Load => f.write_str("load"),
            Step::Stage => f.write_str("stage"),
            Step::Feature(feature) => write!(f, "{}", feature),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    /// Nothing to do (engine already loaded, no slot for the feature)
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: Step,
    pub status: StepStatus,
    pub elapsed: Duration,
}

/// Outcome of every step that ran
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    pub fn failures(&self) -> Vec<&StepReport> {
        self.steps
            .iter()
            .filter(|report| matches!(report.status, StepStatus::Failed(_)))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.steps.iter().map(|report| report.elapsed).sum()
    }

    fn record(&mut self, step: Step, status: StepStatus, started: Instant) {
        self.steps.push(StepReport {
            step,
            status,
            elapsed: started.elapsed(),
        });
    }
}

/// Sequences the showcase: load, stage, then every selected feature hook
///
/// Failing to load or stage aborts the run, since no feature can work
/// without them. A failing feature is logged and reported and its slot
/// stays in the loading state; the next feature still runs.
pub struct Orchestrator {
    invoker: RunInvoker,
    registry: HookRegistry,
    config: DemoConfig,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in hooks
    pub fn new(engine: Arc<dyn Engine>, config: DemoConfig) -> Self {
        let registry = HookRegistry::from_config(&config);
        Self::with_registry(engine, config, registry)
    }

    pub fn with_registry(engine: Arc<dyn Engine>, config: DemoConfig, registry: HookRegistry) -> Self {
        Self {
            invoker: RunInvoker::new(engine),
            registry,
            config,
        }
    }

    /// A board with one slot per configured feature
    pub fn board(&self) -> FeatureBoard {
        FeatureBoard::new(&self.config.features)
    }

    /// Run every step in order, publishing feature results into `board`
    pub async fn run(&self, board: &FeatureBoard) -> Result<PipelineReport> {
        let plan = Step::plan(&self.config.features);
        let mut report = PipelineReport::default();

        info!("🎬 Starting ffmpeg showcase ({} steps)", plan.len());

        let source = board.source().clone();
        self.invoker.set_tap(Arc::new(move |record: &LogRecord| {
            source.observe(record);
        }));

        for (index, step) in plan.iter().copied().enumerate() {
            info!("▶ Step {}/{}: {}", index + 1, plan.len(), step);
            let started = Instant::now();

            match step {
                Step::Load => match self.invoker.ensure_loaded().await {
                    Ok(true) => report.record(step, StepStatus::Done, started),
                    Ok(false) => {
                        debug!("Engine already loaded");
                        report.record(step, StepStatus::Skipped, started);
                    }
                    Err(e) => {
                        error!("Engine load failed: {}", e);
                        return Err(e);
                    }
                },
                Step::Stage => {
                    if let Err(e) = self.stage_input().await {
                        error!("Staging the sample input failed: {}", e);
                        return Err(e);
                    }
                    report.record(step, StepStatus::Done, started);
                }
                Step::Feature(feature) => {
                    let status = self.run_feature(feature, board).await;
                    report.record(step, status, started);
                }
            }
        }

        info!(
            "🎉 Showcase finished in {:.1}s: {} of {} features loaded",
            report.total_elapsed().as_secs_f64(),
            board.loaded_count(),
            board.slots().len()
        );
        Ok(report)
    }

    /// Write the sample input into engine storage under the staged name
    async fn stage_input(&self) -> Result<()> {
        let input: PathBuf = self.config.require_input()?.to_path_buf();
        let bytes = tokio::fs::read(&input).await?;
        self.invoker.engine().write_file(&self.config.staged_name, &bytes)?;
        info!("   Staged {:?} as {} ({} bytes)", input, self.config.staged_name, bytes.len());
        Ok(())
    }

    async fn run_feature(&self, feature: Feature, board: &FeatureBoard) -> StepStatus {
        let Some(hook) = self.registry.get(feature) else {
            warn!("No hook registered for {}", feature);
            return StepStatus::Failed(format!("no hook registered for {}", feature));
        };
        let Some(slot) = board.slot(feature) else {
            warn!("Board has no slot for {}, skipping", feature);
            return StepStatus::Skipped;
        };

        let ctx = HookContext {
            invoker: &self.invoker,
            slot,
            output_dir: &self.config.output_dir,
        };

        match hook.run(&ctx).await {
            Ok(()) => StepStatus::Done,
            Err(e) => {
                error!("{} failed: {}", feature, e.user_message());
                StepStatus::Failed(e.to_string())
            }
        }
    }
}
