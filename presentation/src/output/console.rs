//! Console output formatter for quota-gate results

use crate::input::VendorQuestionReport;
use colored::Colorize;
use quota_gate_application::{LastPublishedSurvey, PublishOutput};
use quota_gate_domain::core::string::{signed, truncate};
use quota_gate_domain::{
    QualificationPhase, QualificationVerdict, QuotaDimension, QuotaIssue, QuotaModel,
    ScreeningQuestion,
};
use serde::Serialize;

/// Vendor question texts are cut to this many bytes in reports
const QUESTION_TEXT_WIDTH: usize = 60;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Pretty JSON for `--format json`
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    // ==================== Quota ====================

    pub fn format_issues(issues: &[QuotaIssue]) -> String {
        if issues.is_empty() {
            return format!("{} Quota is valid\n", "v".green().bold());
        }

        let mut output = format!(
            "{} {} issue(s) found:\n",
            "x".red().bold(),
            issues.len()
        );
        for issue in issues {
            let scope = issue
                .dimension
                .map(|d| d.display_name())
                .unwrap_or("Quota");
            output.push_str(&format!("  {} {}\n", format!("[{}]", scope).yellow(), issue));
        }
        output
    }

    pub fn format_quota(model: &QuotaModel) -> String {
        let mut output = Self::header("Quota");
        output.push('\n');

        let status = if model.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        output.push_str(&format!(
            "{} {} ({})\n",
            "Total target:".cyan().bold(),
            model.total_target,
            status
        ));

        let mut any = false;
        for dimension in model.active_dimensions() {
            any = true;
            output.push_str(&Self::format_dimension(dimension, model.total_target));
        }
        if !any {
            output.push_str(&format!("\n{}\n", "No active dimensions".dimmed()));
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_dimension(dimension: &QuotaDimension, total_target: u32) -> String {
        let mut output = Self::section_header(&format!(
            "{} ({})",
            dimension.kind.display_name(),
            dimension.quota_type().as_str()
        ));
        for item in &dimension.items {
            let value = item.bucket.value();
            let line = format!(
                "  {:<24} {:>6}  {:>6} completes",
                value,
                item.target.to_string(),
                item.target.resolved_count(total_target)
            );
            if item.is_active() {
                output.push_str(&line);
            } else {
                output.push_str(&line.dimmed().to_string());
            }
            output.push('\n');
        }
        output
    }

    pub fn format_screening(questions: &[ScreeningQuestion]) -> String {
        if questions.is_empty() {
            return format!("{}\n", "No screening questions (no active dimension)".dimmed());
        }

        let mut output = String::new();
        for (index, question) in questions.iter().enumerate() {
            output.push_str(&format!(
                "{} {} {}\n",
                format!("{}.", index + 1).cyan().bold(),
                question.question_text.bold(),
                format!("({})", question.id).dimmed()
            ));
            for option in &question.options {
                output.push_str(&format!(
                    "     - {} {}\n",
                    option.label,
                    format!("[{}]", option.value).dimmed()
                ));
            }
        }
        output
    }

    // ==================== Vendor ====================

    pub fn format_vendor_report(
        report: &[VendorQuestionReport],
        blocking: Option<&str>,
    ) -> String {
        let mut output = Self::section_header("Vendor questions");
        for row in report {
            output.push_str(&format!(
                "  {} {} {}\n",
                row.question_id.bold(),
                truncate(&row.text, QUESTION_TEXT_WIDTH),
                format!("({})", row.kind).dimmed()
            ));

            let Some(allocation) = &row.allocation else {
                output.push_str(&format!("      {}\n", "not targeted".dimmed()));
                continue;
            };
            let allocated = allocation
                .allocated
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            let line = match (allocation.target, allocation.delta()) {
                (Some(target), Some(0)) if !allocation.missing_quota => {
                    format!("{} / {} {}", allocated, target, "balanced".green())
                }
                (Some(target), Some(delta)) => {
                    format!("{} / {} {}", allocated, target, signed(delta).red())
                }
                (Some(target), None) => format!("{} / {}", allocated, target),
                (None, _) => format!("{} allocated, no desired completes", allocated),
            };
            output.push_str(&format!("      {}\n", line));
            if allocation.missing_quota {
                output.push_str(&format!(
                    "      {}\n",
                    "some selected items have no quota".yellow()
                ));
            }
        }

        output.push('\n');
        match blocking {
            Some(message) => {
                output.push_str(&format!("{} {}\n", "x".red().bold(), message));
            }
            None => output.push_str(&format!("{} Ready to publish\n", "v".green().bold())),
        }
        output
    }

    // ==================== Publishing ====================

    pub fn format_published(output: &PublishOutput) -> String {
        let mut text = format!(
            "{} Survey {} published\n",
            "v".green().bold(),
            output.record.survey_id.bold()
        );
        text.push_str(&format!(
            "  {} {}\n",
            "Link:".cyan(),
            output.record.share_url
        ));
        if output.local_link {
            text.push_str(&format!(
                "  {}\n",
                "(share link service unavailable, using local link)".yellow()
            ));
        }
        if let Some(vendor_id) = &output.record.vendor_id {
            let status = if output.vendor_notified {
                "notified".green()
            } else {
                "notification failed".yellow()
            };
            text.push_str(&format!("  {} {} ({})\n", "Vendor:".cyan(), vendor_id, status));
        }
        text
    }

    pub fn format_last_published(record: Option<&LastPublishedSurvey>) -> String {
        let Some(record) = record else {
            return format!("{}\n", "No published survey recorded".dimmed());
        };
        let mut text = format!("{} {}\n", "Survey:".cyan().bold(), record.survey_id);
        text.push_str(&format!("{} {}\n", "Link:".cyan().bold(), record.share_url));
        text.push_str(&format!(
            "{} {}\n",
            "Target:".cyan().bold(),
            record.total_target
        ));
        if let Some(vendor_id) = &record.vendor_id {
            text.push_str(&format!("{} {}\n", "Vendor:".cyan().bold(), vendor_id));
        }
        text.push_str(&format!(
            "{} {}\n",
            "Published:".cyan().bold(),
            record.published_at
        ));
        text
    }

    // ==================== Respondent ====================

    /// Final message for a phase the respondent run stopped in
    pub fn format_outcome(
        phase: QualificationPhase,
        verdict: Option<&QualificationVerdict>,
    ) -> String {
        let message = phase
            .respondent_message()
            .unwrap_or_else(|| phase.display_name());
        let styled = match phase {
            QualificationPhase::Submitted | QualificationPhase::CompletionMarked => {
                message.green().bold()
            }
            QualificationPhase::QuotaFull | QualificationPhase::NotQualified => {
                message.yellow().bold()
            }
            QualificationPhase::AlreadySubmitted | QualificationPhase::LoadError => {
                message.red().bold()
            }
            _ => message.normal(),
        };

        let mut output = format!("{}\n", styled);
        if let Some(QualificationVerdict::NotQualified { reason }) = verdict {
            output.push_str(&format!("{}\n", format!("({})", reason).dimmed()));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
