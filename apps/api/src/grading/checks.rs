//! Local heuristic checks run before the model sees the CV.
//!
//! These are cheap, deterministic and independent of the LLM, so they still
//! produce something useful if the model call fails or drifts.

use serde::{Deserialize, Serialize};

pub const MIN_WORDS: usize = 150;
pub const MAX_WORDS: usize = 1200;
/// Share of bullets that should carry a number, percentage or currency amount.
pub const QUANTIFIED_TARGET: f64 = 0.5;

const VAGUE_PHRASES: &[&str] = &[
    "responsible for",
    "worked on",
    "helped",
    "assisted",
    "involved in",
    "participated in",
    "duties included",
    "various",
];

const BULLET_MARKERS: &[char] = &['-', '*', '•', '▪', '●', '–'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ContactInfo,
    Length,
    QuantifiedImpact,
    VagueLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub passed: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CheckResult {
    fn pass(kind: CheckKind, detail: String) -> Self {
        Self {
            kind,
            passed: true,
            detail,
            suggestion: None,
        }
    }

    fn fail(kind: CheckKind, detail: String, suggestion: &str) -> Self {
        Self {
            kind,
            passed: false,
            detail,
            suggestion: Some(suggestion.to_string()),
        }
    }
}

/// Runs every check, in a fixed order.
pub fn run_checks(text: &str) -> Vec<CheckResult> {
    let bullets = extract_bullets(text);
    vec![
        check_contact_info(text),
        check_length(text),
        check_quantified_impact(&bullets),
        check_vague_language(&bullets),
    ]
}

/// Lines that start with a bullet marker, marker stripped.
pub fn extract_bullets(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = line.strip_prefix(BULLET_MARKERS)?;
            let rest = rest.trim_start();
            (!rest.is_empty()).then_some(rest)
        })
        .collect()
}

fn check_contact_info(text: &str) -> CheckResult {
    let has_email = text
        .split_whitespace()
        .any(|w| crate::email_client::looks_like_email(w.trim_matches(|c: char| "<>()[],;".contains(c))));
    if has_email {
        CheckResult::pass(CheckKind::ContactInfo, "Email address found".to_string())
    } else {
        CheckResult::fail(
            CheckKind::ContactInfo,
            "No email address found".to_string(),
            "Put a professional email address in the header so recruiters can reach you.",
        )
    }
}

fn check_length(text: &str) -> CheckResult {
    let words = text.split_whitespace().count();
    let detail = format!("{words} words");
    if words < MIN_WORDS {
        CheckResult::fail(
            CheckKind::Length,
            detail,
            "The CV looks thin. Add outcomes and scope to your recent roles.",
        )
    } else if words > MAX_WORDS {
        CheckResult::fail(
            CheckKind::Length,
            detail,
            "The CV is long. Cut older roles to one or two lines and aim for two pages.",
        )
    } else {
        CheckResult::pass(CheckKind::Length, detail)
    }
}

/// Same signals a recruiter skims for: digits, percentages, currency, `Nx`.
pub fn is_quantified(bullet: &str) -> bool {
    bullet.chars().any(|c| c.is_ascii_digit())
        || bullet.contains('%')
        || bullet.contains('$')
        || bullet.contains('€')
        || bullet.contains('£')
}

fn check_quantified_impact(bullets: &[&str]) -> CheckResult {
    if bullets.is_empty() {
        return CheckResult::fail(
            CheckKind::QuantifiedImpact,
            "No bullet points found".to_string(),
            "Describe each role with 3-5 bullet points that start with an action verb.",
        );
    }
    let quantified = bullets.iter().filter(|b| is_quantified(b)).count();
    let ratio = quantified as f64 / bullets.len() as f64;
    let detail = format!("{quantified} of {} bullets include a metric", bullets.len());
    if ratio >= QUANTIFIED_TARGET {
        CheckResult::pass(CheckKind::QuantifiedImpact, detail)
    } else {
        CheckResult::fail(
            CheckKind::QuantifiedImpact,
            detail,
            "Add numbers to more bullets: percentages, revenue, time saved, team size.",
        )
    }
}

fn check_vague_language(bullets: &[&str]) -> CheckResult {
    let mut hits: Vec<&str> = bullets
        .iter()
        .flat_map(|b| {
            let lower = b.to_lowercase();
            VAGUE_PHRASES
                .iter()
                .copied()
                .filter(move |phrase| lower.contains(phrase))
        })
        .collect();
    hits.sort_unstable();
    hits.dedup();

    if hits.is_empty() {
        CheckResult::pass(
            CheckKind::VagueLanguage,
            "No vague phrasing detected".to_string(),
        )
    } else {
        CheckResult::fail(
            CheckKind::VagueLanguage,
            format!("Vague phrasing: {}", hits.join(", ")),
            "Replace passive phrasing with what you did and what changed because of it.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(results: &[CheckResult], kind: CheckKind) -> &CheckResult {
        results.iter().find(|r| r.kind == kind).unwrap()
    }

    #[test]
    fn test_extract_bullets_handles_markers() {
        let text = "Experience\n- Shipped billing v2\n  • Cut p99 latency by 40%\n*\nPlain line";
        assert_eq!(
            extract_bullets(text),
            vec!["Shipped billing v2", "Cut p99 latency by 40%"]
        );
    }

    #[test]
    fn test_quantified_detection() {
        assert!(is_quantified("Grew revenue by $2M"));
        assert!(is_quantified("Reduced costs by 30%"));
        assert!(!is_quantified("Improved the onboarding flow"));
    }

    #[test]
    fn test_contact_info_found_inside_brackets() {
        let results = run_checks("Jane Doe <jane@example.com>\n- Led 4 engineers");
        assert!(find(&results, CheckKind::ContactInfo).passed);
    }

    #[test]
    fn test_short_cv_fails_length() {
        let results = run_checks("Jane Doe\n- Did things");
        let length = find(&results, CheckKind::Length);
        assert!(!length.passed);
        assert!(length.suggestion.is_some());
    }

    #[test]
    fn test_quantified_ratio() {
        let results = run_checks("- Cut build time 50%\n- Wrote docs\n- Hired 3 engineers");
        assert!(find(&results, CheckKind::QuantifiedImpact).passed);

        let results = run_checks("- Wrote docs\n- Ran standups\n- Hired 3 engineers");
        let check = find(&results, CheckKind::QuantifiedImpact);
        assert!(!check.passed);
        assert_eq!(check.detail, "1 of 3 bullets include a metric");
    }

    #[test]
    fn test_no_bullets_fails_quantified() {
        let results = run_checks("A paragraph-only CV with no bullets at all.");
        assert!(!find(&results, CheckKind::QuantifiedImpact).passed);
    }

    #[test]
    fn test_vague_language_dedups_hits() {
        let results = run_checks(
            "- Responsible for deployments\n- Helped the team\n- Responsible for on-call",
        );
        let check = find(&results, CheckKind::VagueLanguage);
        assert!(!check.passed);
        assert_eq!(check.detail, "Vague phrasing: helped, responsible for");
    }
}
