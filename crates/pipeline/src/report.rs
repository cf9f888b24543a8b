//! Final artifact assembly.

use chrono::NaiveDate;
use prospectus_common::RunContext;
use serde::{Deserialize, Serialize};

/// Marker the reviewer emits when the draft needs changes.
///
/// The appendix rule keys on these exact substrings; the reviewer
/// template instructs the model to emit them verbatim.
pub const REVIEW_MARKER_REVISION: &str = "REVISION REQUIRED";
/// Marker heading the reviewer uses for its enumerated problems.
pub const REVIEW_MARKER_ISSUES: &str = "ISSUE LIST";

const APPENDIX_RULE: &str = "==================================================";

/// The delivered artifact of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Deterministic name derived from run parameters and the run date.
    pub filename: String,
    pub body: String,
    pub appendix_attached: bool,
}

/// Assemble the delivered text: the draft, then — only when the review
/// contains either marker — a delimited appendix with the review output
/// verbatim.
pub fn assemble_report(draft: &str, review: &str) -> (String, bool) {
    let needs_appendix =
        review.contains(REVIEW_MARKER_REVISION) || review.contains(REVIEW_MARKER_ISSUES);

    if !needs_appendix {
        return (draft.to_string(), false);
    }

    let body = format!(
        "{draft}\n\n{APPENDIX_RULE}\n\
         # Appendix: Reviewer Feedback\n\
         > The reviewer's suggested improvements, attached for reference.\n\n\
         {review}"
    );
    (body, true)
}

/// `{year}_{province}_{industry}_industry_report_{YYYYMMDD}.md`, with
/// path-hostile characters in run parameters flattened.
pub fn report_filename(ctx: &RunContext, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}_industry_report_{}.md",
        sanitize(&ctx.target_year),
        sanitize(&ctx.province),
        sanitize(&ctx.industry),
        date.format("%Y%m%d")
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c == '/' || c == '\\' || c.is_whitespace() { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_review_attaches_no_appendix() {
        let (body, attached) = assemble_report("the draft", "Looks consistent. Approved.");
        assert_eq!(body, "the draft");
        assert!(!attached);
    }

    #[test]
    fn revision_marker_attaches_review_verbatim() {
        let review = "REVISION REQUIRED\n1. Chapter 2 lacks sources.";
        let (body, attached) = assemble_report("the draft", review);

        assert!(attached);
        assert!(body.starts_with("the draft\n\n=="));
        assert!(body.contains("# Appendix: Reviewer Feedback"));
        assert!(body.ends_with(review));
    }

    #[test]
    fn issue_list_marker_also_attaches() {
        let (_, attached) = assemble_report("d", "Verdict: pass with notes.\nISSUE LIST\n- none");
        assert!(attached);
    }

    #[test]
    fn filename_is_deterministic_and_sanitized() {
        let ctx = RunContext::new("solar glass", "2025", "growth", "East Region");
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        assert_eq!(
            report_filename(&ctx, date),
            "2025_East-Region_solar-glass_industry_report_20260806.md"
        );
    }
}
