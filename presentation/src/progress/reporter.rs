//! Progress reporting while a respondent moves through the protocol

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quota_gate_application::QualificationProgress;
use quota_gate_domain::{QualificationPhase, QualificationVerdict};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner shown while the quota oracle decides
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            hidden: false,
        }
    }

    /// Reporter that tracks state without drawing
    pub fn hidden() -> Self {
        Self {
            spinner: Mutex::new(None),
            hidden: true,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn is_spinning(&self) -> bool {
        self.spinner.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl QualificationProgress for ProgressReporter {
    fn on_phase_change(&self, _from: QualificationPhase, to: QualificationPhase) {
        if to == QualificationPhase::Submitting
            && let Ok(mut spinner) = self.spinner.lock()
        {
            let pb = if self.hidden {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            pb.set_style(Self::spinner_style());
            pb.set_message("Submitting your answers...");
            pb.enable_steady_tick(Duration::from_millis(100));
            *spinner = Some(pb);
        } else if matches!(
            to,
            QualificationPhase::Submitted | QualificationPhase::TakingSurvey
        ) && let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_and_clear();
        }
    }

    fn on_check_start(&self) {
        if let Ok(mut spinner) = self.spinner.lock() {
            let pb = if self.hidden {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            pb.set_style(Self::spinner_style());
            pb.set_message("Checking eligibility...");
            pb.enable_steady_tick(Duration::from_millis(100));
            *spinner = Some(pb);
        }
    }

    fn on_check_complete(&self, verdict: &QualificationVerdict) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            let message = match verdict {
                QualificationVerdict::Qualified { .. } => format!("{} Eligible", "v".green()),
                QualificationVerdict::QuotaFull => format!("{} Quota full", "x".yellow()),
                QualificationVerdict::NotQualified { .. } => {
                    format!("{} Not eligible", "x".yellow())
                }
            };
            pb.finish_with_message(message);
        }
    }

    fn on_restart_scheduled(&self, delay_seconds: u64) {
        if !self.hidden {
            eprintln!(
                "{} Restarting for the next respondent in {}s (Ctrl-C to stop)",
                "->".cyan(),
                delay_seconds
            );
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl QualificationProgress for SimpleProgress {
    fn on_phase_change(&self, from: QualificationPhase, to: QualificationPhase) {
        eprintln!(
            "{} {} {} {}",
            "->".cyan(),
            from.display_name().dimmed(),
            "=>".dimmed(),
            to.display_name().bold()
        );
    }

    fn on_restart_scheduled(&self, delay_seconds: u64) {
        eprintln!("{} Restart in {}s", "->".cyan(), delay_seconds);
    }
}
