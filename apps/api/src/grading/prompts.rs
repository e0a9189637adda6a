// LLM prompts for grading and rewriting.
// Shared fragments come from llm_client::prompts.

/// Role half of the grading system prompt; the JSON-only suffix is appended at call time.
pub const GRADE_ROLE: &str = "You are a senior technical recruiter and career coach who has \
    screened thousands of CVs. You grade CVs strictly but fairly against what hiring \
    managers actually look for.";

/// Grading prompt. Replace `{cv_text}` and `{check_summary}` before sending.
pub const GRADE_PROMPT_TEMPLATE: &str = r#"Grade the following CV.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 72,
  "summary": "Two or three sentences on how this CV reads to a recruiter.",
  "sections": [
    {"name": "Impact", "score": 60, "feedback": "Most bullets describe duties, not outcomes."}
  ],
  "strengths": ["Clear progression from junior to senior roles"],
  "improvements": ["Quantify the outcome of the payments migration"]
}

Rules:
- Scores are integers from 0 to 100.
- Grade exactly these sections, in this order: "Impact", "Clarity", "Structure", "Skills", "ATS Compatibility".
- Give 2-4 strengths and 3-6 improvements. Each improvement must be concrete and actionable.
- Base every statement on the CV text. Do not assume experience that is not written down.

Automated pre-checks (already computed, take them into account):
{check_summary}

CV:
"""
{cv_text}
"""
"#;

pub const REWRITE_ROLE: &str = "You are an expert CV writer. You rewrite CVs so that every \
    bullet leads with a strong action verb and states a concrete outcome, while keeping the \
    candidate's real history intact.";

/// Rewrite prompt. Replace `{cv_text}` and `{focus}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"Rewrite the following CV.

Return a JSON object with this EXACT schema (no extra fields):
{
  "rewritten_cv": "Full rewritten CV as Markdown",
  "changes": ["Merged the two support roles into one entry"]
}

Rules:
- Keep the same sections, employers, titles and dates.
- Every experience bullet starts with an action verb and names an outcome.
- Keep it to at most two pages of content.
- List the 3-8 most important changes you made in "changes".
- Target role / focus from the candidate (may be empty): {focus}

CV:
"""
{cv_text}
"""
"#;
