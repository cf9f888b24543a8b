//! Instruction templates for the five pipeline stages.
//!
//! Templates are expanded against the [`RunContext`] and, where a stage
//! declares it, the carried-forward outputs of earlier stages.

use prospectus_common::RunContext;

use crate::plan::Chapter;

fn scope_line(ctx: &RunContext) -> String {
    let depth = ctx.depth.as_deref().unwrap_or("standard");
    format!(
        "Industry: {}. Region: {}. Target year: {}. Focus: {}. Depth: {}.",
        ctx.industry, ctx.province, ctx.target_year, ctx.focus, depth
    )
}

pub fn planner_instruction(ctx: &RunContext) -> String {
    format!(
        "You are the lead research planner for a buy-side industry study.\n\
         {}\n\n\
         Draft a chapter-level outline for the research report. The outline must \
         serve investment decisions, not general education: cover the macro \
         environment, upstream/downstream structure, competitive landscape with \
         data comparisons, deep financials of key listed names, and risk factors.\n\
         Mark each chapter as a markdown '## ' heading followed by 2-4 bullet \
         points describing what the chapter must establish.",
        scope_line(ctx)
    )
}

pub fn finance_research_instruction(ctx: &RunContext) -> String {
    format!(
        "Gather raw financial data for the leading listed companies in this industry.\n\
         {}\n\n\
         For 3-5 leaders, collect revenue, net profit, market cap, and valuation \
         multiples for the most recent reported periods. Prefer verifiable numbers \
         over prose; skip minor players.",
        scope_line(ctx)
    )
}

pub fn policy_research_instruction(ctx: &RunContext) -> String {
    format!(
        "Gather the policy landscape for this industry.\n\
         {}\n\n\
         List the governing policies with name, issue date, and the core \
         quantitative targets each one sets. Only include policies that move \
         capacity, pricing, or demand.",
        scope_line(ctx)
    )
}

pub fn industry_research_instruction(ctx: &RunContext) -> String {
    format!(
        "Gather industry-structure data for this market.\n\
         {}\n\n\
         Collect output value, growth rates, technology barriers, and the \
         capacity distribution across the value chain. Report numbers with their \
         reporting period.",
        scope_line(ctx)
    )
}

pub fn research_synthesis_instruction() -> String {
    "As chief researcher, merge the finance, policy, and industry findings below \
     into one structured data digest. Deduplicate, keep every load-bearing \
     number, and organize by theme so an analyst can consume it directly."
        .to_string()
}

pub fn analyst_instruction(ctx: &RunContext, research_digest: &str) -> String {
    format!(
        "You are the investment analyst. From the research digest below, derive \
         the core investment conclusions for this study.\n\
         {}\n\n\
         Compare leaders against laggards, identify value-chain gaps across \
         performance, market, product, technology and organization, and state \
         where the current cycle is heading. Conclusions first, evidence after.\n\n\
         === Research digest ===\n{}",
        scope_line(ctx),
        research_digest
    )
}

pub fn chapter_instruction(
    ctx: &RunContext,
    chapter: &Chapter,
    outline: &str,
    analysis: &str,
) -> String {
    format!(
        "Write the chapter titled \"{}\" of the industry research report.\n\
         {}\n\n\
         Chapter brief:\n{}\n\n\
         Follow the global outline for placement and avoid duplicating sibling \
         chapters. Conclusions first, self-contained paragraphs, tables where \
         they carry data better than prose. Output clean markdown starting at \
         the '## ' level.\n\n\
         === Global outline ===\n{}\n\n\
         === Analyst conclusions ===\n{}",
        chapter.title,
        scope_line(ctx),
        chapter.spec,
        outline,
        analysis
    )
}

pub fn compile_instruction() -> String {
    "You are the managing editor. The chapters below were written by your team. \
     Splice them into one complete industry research report in logical order. \
     Preserve markdown heading levels and do not drop any content."
        .to_string()
}

pub fn reviewer_instruction(draft: &str) -> String {
    format!(
        "Review the draft report below for logical consistency and data \
         completeness. Do not rewrite content; only check.\n\
         If changes are needed, start your verdict with 'REVISION REQUIRED' and \
         include an 'ISSUE LIST' section enumerating each problem with a \
         suggested fix. If the draft passes, say so plainly.\n\n\
         === Draft report ===\n{}",
        draft
    )
}
