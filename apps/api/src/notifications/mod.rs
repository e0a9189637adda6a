//! Grade report delivery by email.
//!
//! Email is optional: when the email integration is not configured the report is
//! still returned to the caller, it just isn't mailed.

use tracing::{info, warn};

use crate::email_client::{EmailClient, EmailMessage};
use crate::grading::grader::GradeReport;
use crate::lazy::LazyClient;
use crate::ui::html::escape;

/// What happened to the optional report email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    NotRequested,
    NotConfigured,
    Failed,
}

/// Mails `report` to `recipient` if one was given and email is configured.
/// Never fails the caller: delivery problems are logged and reported in the outcome.
pub async fn deliver_report(
    email: &LazyClient<EmailClient>,
    recipient: Option<&str>,
    report: &GradeReport,
) -> DeliveryOutcome {
    let Some(recipient) = recipient.map(str::trim).filter(|r| !r.is_empty()) else {
        return DeliveryOutcome::NotRequested;
    };

    if !email.is_configured() {
        warn!(report_id = %report.report_id, "Email not configured; skipping report delivery");
        return DeliveryOutcome::NotConfigured;
    }

    let client = match email.get() {
        Ok(client) => client,
        Err(e) => {
            warn!("Email client unavailable: {e}");
            return DeliveryOutcome::NotConfigured;
        }
    };

    match client.send(&report_email(recipient, report)).await {
        Ok(id) => {
            info!(report_id = %report.report_id, email_id = %id, "Grade report emailed");
            DeliveryOutcome::Sent
        }
        Err(e) => {
            warn!(report_id = %report.report_id, "Failed to email grade report: {e}");
            DeliveryOutcome::Failed
        }
    }
}

pub fn report_email(recipient: &str, report: &GradeReport) -> EmailMessage {
    EmailMessage {
        to: recipient.to_string(),
        subject: format!(
            "Your CV scored {}/100 ({})",
            report.overall_score, report.letter
        ),
        html: render_report_html(report),
        text: Some(render_report_text(report)),
    }
}

fn render_report_html(report: &GradeReport) -> String {
    let mut html = format!(
        "<h1>Your CV grade: {} ({}/100)</h1><p>{}</p>",
        report.letter,
        report.overall_score,
        escape(&report.summary)
    );

    if !report.sections.is_empty() {
        html.push_str("<h2>Breakdown</h2><table>");
        for section in &report.sections {
            html.push_str(&format!(
                "<tr><td><strong>{}</strong></td><td>{}/100</td><td>{}</td></tr>",
                escape(&section.name),
                section.score,
                escape(&section.feedback)
            ));
        }
        html.push_str("</table>");
    }

    push_html_list(&mut html, "What works", &report.strengths);
    push_html_list(&mut html, "What to fix", &report.improvements);
    html
}

fn push_html_list(html: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    html.push_str(&format!("<h2>{heading}</h2><ul>"));
    for item in items {
        html.push_str(&format!("<li>{}</li>", escape(item)));
    }
    html.push_str("</ul>");
}

fn render_report_text(report: &GradeReport) -> String {
    let mut text = format!(
        "Your CV grade: {} ({}/100)\n\n{}\n",
        report.letter, report.overall_score, report.summary
    );
    for section in &report.sections {
        text.push_str(&format!("\n{}: {}/100 - {}", section.name, section.score, section.feedback));
    }
    if !report.improvements.is_empty() {
        text.push_str("\n\nWhat to fix:\n");
        for item in &report.improvements {
            text.push_str(&format!("- {item}\n"));
        }
    }
    text
}
