//! The fixed five-stage topology, expressed as task graphs.

use prospectus_common::{Capability, Result, RunContext};
use prospectus_graph::{TaskGraph, TaskNode};
use serde::{Deserialize, Serialize};

use crate::plan::ResearchPlan;
use crate::prompts;

/// Named phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    Research,
    Analyze,
    Write,
    Review,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Research => "research",
            Stage::Analyze => "analyze",
            Stage::Write => "write",
            Stage::Review => "review",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const RESEARCHER_CAPABILITIES: [Capability; 5] = [
    Capability::FinancialDataLookup,
    Capability::WebSearch,
    Capability::DocumentRead,
    Capability::KnowledgeSearch,
    Capability::MemoryRecall,
];

const ANALYST_CAPABILITIES: [Capability; 2] =
    [Capability::KnowledgeSearch, Capability::MemoryRecall];

/// Plan: a single outline node.
pub fn plan_graph(ctx: &RunContext) -> Result<TaskGraph> {
    TaskGraph::new(Stage::Plan.name()).add_node(
        TaskNode::independent("plan-outline", prompts::planner_instruction(ctx))
            .with_expected_output("A chapter-level outline with '## ' headings"),
    )
}

/// Research: three independent data-gathering nodes joined by one
/// synthesis node.
pub fn research_graph(ctx: &RunContext) -> Result<TaskGraph> {
    TaskGraph::new(Stage::Research.name())
        .add_node(
            TaskNode::independent("research-finance", prompts::finance_research_instruction(ctx))
                .with_expected_output("Raw financial metrics for 3-5 industry leaders")
                .with_capabilities(RESEARCHER_CAPABILITIES.to_vec()),
        )?
        .add_node(
            TaskNode::independent("research-policy", prompts::policy_research_instruction(ctx))
                .with_expected_output("Policies with dates and quantitative targets")
                .with_capabilities(RESEARCHER_CAPABILITIES.to_vec()),
        )?
        .add_node(
            TaskNode::independent(
                "research-industry",
                prompts::industry_research_instruction(ctx),
            )
            .with_expected_output("Output value, growth, and barrier data")
            .with_capabilities(RESEARCHER_CAPABILITIES.to_vec()),
        )?
        .add_node(
            TaskNode::joining(
                "research-synthesis",
                prompts::research_synthesis_instruction(),
                vec![
                    "research-finance".into(),
                    "research-policy".into(),
                    "research-industry".into(),
                ],
            )
            .with_expected_output("One deduplicated data digest covering all three tracks")
            .with_capabilities(RESEARCHER_CAPABILITIES.to_vec()),
        )
}

/// Analyze: a single node over the research digest.
pub fn analyze_graph(ctx: &RunContext, research_digest: &str) -> Result<TaskGraph> {
    TaskGraph::new(Stage::Analyze.name()).add_node(
        TaskNode::independent(
            "analyze-conclusions",
            prompts::analyst_instruction(ctx, research_digest),
        )
        .with_expected_output("Core investment conclusions with comparative evidence")
        .with_capabilities(ANALYST_CAPABILITIES.to_vec()),
    )
}

/// Write: one independent node per planned chapter plus a joining
/// compile node. Chapter count is data-dependent, any count >= 1.
pub fn write_graph(ctx: &RunContext, plan: &ResearchPlan, analysis: &str) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new(Stage::Write.name());
    let mut chapter_ids = Vec::with_capacity(plan.chapters.len());

    for (n, chapter) in plan.chapters.iter().enumerate() {
        let id = format!("write-chapter-{}", n + 1);
        graph = graph.add_node(
            TaskNode::independent(
                &id,
                prompts::chapter_instruction(ctx, chapter, &plan.raw_text, analysis),
            )
            .with_expected_output(format!("Markdown content of chapter \"{}\"", chapter.title)),
        )?;
        chapter_ids.push(id);
    }

    graph.add_node(
        TaskNode::joining("write-compile", prompts::compile_instruction(), chapter_ids)
            .with_expected_output("The complete spliced report in markdown"),
    )
}

/// Review: a single audit node over the draft.
pub fn review_graph(draft: &str) -> Result<TaskGraph> {
    TaskGraph::new(Stage::Review.name()).add_node(
        TaskNode::independent("review-audit", prompts::reviewer_instruction(draft))
            .with_expected_output("A review verdict with an issue list when changes are needed"),
    )
}
