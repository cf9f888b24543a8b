//! The pipeline runner.
//!
//! Drives the five stages strictly in sequence, keeps every completed
//! stage output for the remainder of the run, and performs the
//! best-effort insight writes after Research, Analyze, and Write.

use std::sync::Arc;

use chrono::Local;
use prospectus_common::{ProspectusError, RunContext};
use prospectus_graph::{GraphExecutor, TaskGraph};
use prospectus_llm::CapabilityInvoker;
use prospectus_memory::{Insight, InsightCategory, InsightStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::plan::parse_plan;
use crate::report::{assemble_report, report_filename, ResearchReport};
use crate::stages::{self, Stage};

/// Terminal failure of a run.
///
/// Names the stage and node that failed and carries the stage outputs
/// accumulated up to that point.
#[derive(Debug, Error)]
#[error("run failed in stage '{stage}' at node '{node}': {source}")]
pub struct RunError {
    pub stage: Stage,
    pub node: String,
    /// Completed stage outputs, in stage order.
    pub partial: Vec<(Stage, String)>,
    #[source]
    pub source: ProspectusError,
}

/// Plan → Research → Analyze → Write → Review.
pub struct ResearchPipeline {
    executor: GraphExecutor,
    store: Arc<dyn InsightStore>,
}

impl ResearchPipeline {
    pub fn new(invoker: Arc<dyn CapabilityInvoker>, store: Arc<dyn InsightStore>) -> Self {
        Self {
            executor: GraphExecutor::new(invoker),
            store,
        }
    }

    /// Execute one full run and assemble the delivered artifact.
    ///
    /// Persistence of the returned report is the caller's concern; the
    /// filename is derived from run parameters and the current date.
    pub async fn run(&self, ctx: &RunContext) -> Result<ResearchReport, RunError> {
        info!(
            industry = %ctx.industry,
            province = %ctx.province,
            target_year = %ctx.target_year,
            "Starting research run"
        );

        let mut completed: Vec<(Stage, String)> = Vec::new();

        let plan_raw = self
            .run_stage(Stage::Plan, stages::plan_graph(ctx), &completed)
            .await?;
        let plan = parse_plan(&plan_raw);
        info!(chapters = plan.chapter_count(), "Plan structured");
        completed.push((Stage::Plan, plan_raw));

        let digest = self
            .run_stage(Stage::Research, stages::research_graph(ctx), &completed)
            .await?;
        self.save_insight(ctx, Stage::Research, InsightCategory::Fact, &digest)
            .await;
        completed.push((Stage::Research, digest.clone()));

        let analysis = self
            .run_stage(Stage::Analyze, stages::analyze_graph(ctx, &digest), &completed)
            .await?;
        self.save_insight(ctx, Stage::Analyze, InsightCategory::Conclusion, &analysis)
            .await;
        completed.push((Stage::Analyze, analysis.clone()));

        let draft = self
            .run_stage(
                Stage::Write,
                stages::write_graph(ctx, &plan, &analysis),
                &completed,
            )
            .await?;
        self.save_insight(ctx, Stage::Write, InsightCategory::ReportSegment, &draft)
            .await;
        completed.push((Stage::Write, draft.clone()));

        let review = self
            .run_stage(Stage::Review, stages::review_graph(&draft), &completed)
            .await?;

        let (body, appendix_attached) = assemble_report(&draft, &review);
        let filename = report_filename(ctx, Local::now().date_naive());

        info!(
            filename = %filename,
            appendix_attached = appendix_attached,
            "Research run complete"
        );

        Ok(ResearchReport {
            filename,
            body,
            appendix_attached,
        })
    }

    async fn run_stage(
        &self,
        stage: Stage,
        graph: prospectus_common::Result<TaskGraph>,
        completed: &[(Stage, String)],
    ) -> Result<String, RunError> {
        let fail = |node: String, source: ProspectusError| RunError {
            stage,
            node,
            partial: completed.to_vec(),
            source,
        };

        let graph = graph.map_err(|e| fail("<graph>".to_string(), e))?;

        info!(stage = %stage, nodes = graph.len(), "Starting stage");

        let report = self
            .executor
            .run(&graph)
            .await
            .map_err(|e| fail("<graph>".to_string(), e))?;

        if let Some(failure) = report.failure {
            return Err(fail(
                failure.node_id,
                ProspectusError::Invocation(failure.error),
            ));
        }

        report.terminal_output.ok_or_else(|| {
            fail(
                "<terminal>".to_string(),
                ProspectusError::Graph(format!("Stage '{stage}' produced no terminal output")),
            )
        })
    }

    /// Best-effort insight write; failure is logged and the run
    /// continues.
    async fn save_insight(
        &self,
        ctx: &RunContext,
        stage: Stage,
        category: InsightCategory,
        content: &str,
    ) {
        let insight = Insight::new(content, category)
            .with_metadata("industry", ctx.industry.as_str())
            .with_metadata("province", ctx.province.as_str())
            .with_metadata("year", ctx.target_year.as_str())
            .with_metadata("stage", stage.name());

        if let Err(e) = self.store.append(insight).await {
            warn!(stage = %stage, error = %e, "Insight append failed; continuing run");
        }
    }
}
