//! CV grading: local checks plus an LLM-produced scorecard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::grading::checks::{run_checks, CheckResult};
use crate::grading::prompts::{GRADE_PROMPT_TEMPLATE, GRADE_ROLE};
use crate::llm_client::prompts::{json_system, NO_FABRICATION};
use crate::llm_client::{CallOptions, LlmClient};

/// Sections the model is asked to grade, in display order.
pub const SECTIONS: &[&str] = &[
    "Impact",
    "Clarity",
    "Structure",
    "Skills",
    "ATS Compatibility",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionScore {
    pub name: String,
    pub score: u8,
    pub feedback: String,
}

/// Raw model output, before clamping and enrichment.
#[derive(Debug, Deserialize)]
struct ModelGrade {
    overall_score: f64,
    summary: String,
    #[serde(default)]
    sections: Vec<ModelSection>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelSection {
    name: String,
    score: f64,
    #[serde(default)]
    feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub report_id: Uuid,
    pub overall_score: u8,
    pub letter: char,
    pub summary: String,
    pub sections: Vec<SectionScore>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub checks: Vec<CheckResult>,
    pub graded_at: DateTime<Utc>,
}

/// Grades `cv_text`. The text should already have been through `prepare_cv_text`.
pub async fn grade_cv(llm: &LlmClient, cv_text: &str) -> Result<GradeReport, AppError> {
    let checks = run_checks(cv_text);
    let prompt = GRADE_PROMPT_TEMPLATE
        .replace("{check_summary}", &summarize_checks(&checks))
        .replace("{cv_text}", cv_text);
    let system = format!("{} {NO_FABRICATION}", json_system(GRADE_ROLE));

    let grade: ModelGrade = llm
        .call_json(&prompt, &system, CallOptions::default())
        .await
        .map_err(|e| AppError::llm("CV grading failed", e))?;

    let report = build_report(grade, checks)?;
    info!(
        report_id = %report.report_id,
        overall_score = report.overall_score,
        "CV graded"
    );
    Ok(report)
}

fn build_report(grade: ModelGrade, checks: Vec<CheckResult>) -> Result<GradeReport, AppError> {
    if grade.summary.trim().is_empty() {
        return Err(AppError::Llm("Grading returned an empty summary".to_string()));
    }

    let overall_score = clamp_score(grade.overall_score);
    Ok(GradeReport {
        report_id: Uuid::new_v4(),
        overall_score,
        letter: letter_grade(overall_score),
        summary: grade.summary.trim().to_string(),
        sections: order_sections(grade.sections),
        strengths: clean_list(grade.strengths),
        improvements: clean_list(grade.improvements),
        checks,
        graded_at: Utc::now(),
    })
}

/// Models occasionally return 7.5 on a 10 scale or 105; clamp into 0..=100.
fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

pub fn letter_grade(score: u8) -> char {
    match score {
        90..=100 => 'A',
        80..=89 => 'B',
        70..=79 => 'C',
        60..=69 => 'D',
        _ => 'F',
    }
}

/// Known sections first in canonical order, then anything extra the model added.
/// Duplicate names keep the first occurrence.
fn order_sections(sections: Vec<ModelSection>) -> Vec<SectionScore> {
    let mut scored: Vec<SectionScore> = Vec::with_capacity(sections.len());
    for section in sections {
        let name = section.name.trim();
        if name.is_empty() || scored.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        scored.push(SectionScore {
            name: name.to_string(),
            score: clamp_score(section.score),
            feedback: section.feedback.trim().to_string(),
        });
    }

    let rank = |name: &str| {
        SECTIONS
            .iter()
            .position(|s| s.eq_ignore_ascii_case(name))
            .unwrap_or(SECTIONS.len())
    };
    scored.sort_by_key(|s| rank(&s.name));
    scored
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn summarize_checks(checks: &[CheckResult]) -> String {
    checks
        .iter()
        .map(|c| {
            let mark = if c.passed { "PASS" } else { "FAIL" };
            format!("- [{mark}] {:?}: {}", c.kind, c.detail)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
