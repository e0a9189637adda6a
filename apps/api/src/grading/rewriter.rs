use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::grading::prompts::{REWRITE_PROMPT_TEMPLATE, REWRITE_ROLE};
use crate::llm_client::prompts::{json_system, NO_FABRICATION};
use crate::llm_client::{CallOptions, LlmClient};

pub const MAX_FOCUS_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    pub rewritten_cv: String,
    #[serde(default)]
    pub changes: Vec<String>,
}

/// Rewrites a CV, optionally steering toward a target role.
pub async fn rewrite_cv(
    llm: &LlmClient,
    cv_text: &str,
    focus: Option<&str>,
) -> Result<RewriteResult, AppError> {
    let prompt = build_prompt(cv_text, focus)?;
    let system = format!("{} {NO_FABRICATION}", json_system(REWRITE_ROLE));

    // Rewrites are longer than scorecards and benefit from a little more variety.
    let options = CallOptions {
        temperature: 0.4,
        ..CallOptions::default()
    };
    let result: RewriteResult = llm
        .call_json(&prompt, &system, options)
        .await
        .map_err(|e| AppError::llm("CV rewrite failed", e))?;

    let result = finalize(result)?;
    info!(
        chars = result.rewritten_cv.len(),
        changes = result.changes.len(),
        "CV rewritten"
    );
    Ok(result)
}

fn build_prompt(cv_text: &str, focus: Option<&str>) -> Result<String, AppError> {
    let focus = focus.map(str::trim).unwrap_or_default();
    if focus.chars().count() > MAX_FOCUS_CHARS {
        return Err(AppError::Validation(format!(
            "focus must be at most {MAX_FOCUS_CHARS} characters"
        )));
    }
    // No braces in user text; the CV is substituted last and never rescanned.
    let focus: String = focus.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    Ok(REWRITE_PROMPT_TEMPLATE
        .replace("{focus}", &focus)
        .replace("{cv_text}", cv_text))
}

fn finalize(mut result: RewriteResult) -> Result<RewriteResult, AppError> {
    result.rewritten_cv = result.rewritten_cv.trim().to_string();
    if result.rewritten_cv.is_empty() {
        return Err(AppError::Llm("Rewrite returned an empty CV".to_string()));
    }
    result.changes.retain(|c| !c.trim().is_empty());
    Ok(result)
}
