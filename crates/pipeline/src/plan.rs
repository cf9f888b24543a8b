//! Plan structuring.
//!
//! Decomposes the Plan stage's raw outline into chapters that drive the
//! Write stage's fan-out. The decomposition is deliberately forgiving: a
//! plan that yields no recognizable chapters still produces one default
//! chapter over the whole text, so the run never fails here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MD_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").unwrap());
static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[.、)]\s+(.+?)\s*$").unwrap());

const DEFAULT_CHAPTER_TITLE: &str = "Full Report";

/// One chapter to be written by an independent Write-stage node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// The chapter's slice of the outline, heading included.
    pub spec: String,
}

/// The Plan stage's structured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub chapters: Vec<Chapter>,
    /// The untouched original, reused as shared context for every
    /// chapter-writing node.
    pub raw_text: String,
}

impl ResearchPlan {
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingKind {
    /// `##` and deeper
    SubHeading,
    /// `1.` / `1、` / `1)`
    Numbered,
    /// a lone `#`
    TopHeading,
}

fn classify_heading(line: &str) -> Option<(HeadingKind, String)> {
    if let Some(caps) = MD_HEADING.captures(line) {
        let kind = if caps[1].len() >= 2 {
            HeadingKind::SubHeading
        } else {
            HeadingKind::TopHeading
        };
        return Some((kind, caps[2].to_string()));
    }
    if let Some(caps) = NUMBERED_HEADING.captures(line) {
        return Some((HeadingKind::Numbered, caps[2].to_string()));
    }
    None
}

/// Decompose a raw plan into chapters.
///
/// Chapter boundaries are picked from one heading family, preferred in
/// order: markdown sub-headings, numbered lines, top-level headings.
/// This keeps a document title from swallowing the first chapter.
pub fn parse_plan(raw: &str) -> ResearchPlan {
    let lines: Vec<&str> = raw.lines().collect();

    let headings: Vec<(usize, HeadingKind, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| classify_heading(line).map(|(kind, title)| (i, kind, title)))
        .collect();

    let chosen = [
        HeadingKind::SubHeading,
        HeadingKind::Numbered,
        HeadingKind::TopHeading,
    ]
    .into_iter()
    .find(|kind| headings.iter().any(|(_, k, _)| k == kind));

    let mut chapters = Vec::new();
    if let Some(kind) = chosen {
        let starts: Vec<(usize, String)> = headings
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(i, _, title)| (*i, title.clone()))
            .collect();

        for (n, (start, title)) in starts.iter().enumerate() {
            let end = starts
                .get(n + 1)
                .map_or(lines.len(), |(next_start, _)| *next_start);
            let spec = lines[*start..end].join("\n").trim_end().to_string();
            chapters.push(Chapter {
                title: title.clone(),
                spec,
            });
        }
    }

    if chapters.is_empty() {
        chapters.push(Chapter {
            title: DEFAULT_CHAPTER_TITLE.to_string(),
            spec: raw.trim().to_string(),
        });
    }

    ResearchPlan {
        chapters,
        raw_text: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_subheadings_become_chapters() {
        let raw = "# Solar Glass 2025 Outline\n\
                   ## Macro Environment\n- demand drivers\n\
                   ## Competitive Landscape\n- top five makers\n\
                   ## Risks\n- oversupply";

        let plan = parse_plan(raw);

        assert_eq!(plan.chapter_count(), 3);
        assert_eq!(plan.chapters[0].title, "Macro Environment");
        assert_eq!(plan.chapters[2].title, "Risks");
        assert!(plan.chapters[1].spec.contains("top five makers"));
        // Document title is not a chapter.
        assert!(!plan.chapters.iter().any(|c| c.title.contains("Outline")));
        assert_eq!(plan.raw_text, raw);
    }

    #[test]
    fn numbered_lines_become_chapters() {
        let raw = "Report outline\n1. Industry sizing\nnotes here\n2. Key players\nmore notes";

        let plan = parse_plan(raw);

        assert_eq!(plan.chapter_count(), 2);
        assert_eq!(plan.chapters[0].title, "Industry sizing");
        assert!(plan.chapters[0].spec.contains("notes here"));
        assert_eq!(plan.chapters[1].title, "Key players");
    }

    #[test]
    fn chapter_spec_slices_do_not_overlap() {
        let raw = "## A\nalpha\n## B\nbeta";
        let plan = parse_plan(raw);

        assert!(plan.chapters[0].spec.contains("alpha"));
        assert!(!plan.chapters[0].spec.contains("beta"));
        assert!(plan.chapters[1].spec.contains("beta"));
    }

    #[test]
    fn unstructured_text_falls_back_to_single_default_chapter() {
        let raw = "Just a paragraph of prose with no structure at all.";
        let plan = parse_plan(raw);

        assert_eq!(plan.chapter_count(), 1);
        assert_eq!(plan.chapters[0].title, "Full Report");
        assert_eq!(plan.chapters[0].spec, raw);
    }

    #[test]
    fn empty_text_still_yields_one_chapter() {
        let plan = parse_plan("");
        assert_eq!(plan.chapter_count(), 1);
        assert_eq!(plan.chapters[0].title, "Full Report");
    }

    #[test]
    fn lone_top_headings_are_used_when_nothing_else_exists() {
        let raw = "# Overview\ntext\n# Outlook\nmore";
        let plan = parse_plan(raw);

        assert_eq!(plan.chapter_count(), 2);
        assert_eq!(plan.chapters[0].title, "Overview");
        assert_eq!(plan.chapters[1].title, "Outlook");
    }
}
