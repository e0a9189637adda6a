// CV grading and rewriting.
// Implements: text intake, local heuristic checks, LLM scorecard, paid LLM rewrite.
// All LLM calls go through llm_client.

pub mod checks;
pub mod extract;
pub mod grader;
pub mod handlers;
pub mod prompts;
pub mod rewriter;
