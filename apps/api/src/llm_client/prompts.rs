// Cross-cutting prompt fragments shared by the grading and rewriting prompts.
// Service-specific prompts live in grading/prompts.rs.

/// System prompt suffix that enforces JSON-only output.
pub const JSON_ONLY: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that touches candidate content.
pub const NO_FABRICATION: &str = "\
    CRITICAL: Never invent employers, titles, dates, degrees, certifications or metrics \
    that are not present in the CV. If a bullet lacks a number, suggest where one could \
    go using a placeholder like [X%] instead of making one up.";

/// Builds a system prompt from a role description plus the JSON-only suffix.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY}")
}
