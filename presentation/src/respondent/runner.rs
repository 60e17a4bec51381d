//! Line-oriented respondent session
//!
//! Drives a [`QualificationProtocol`] from a terminal: one screening question
//! at a time, then the survey questions, then the outcome. When the survey
//! restarts automatically the session loops for the next respondent until
//! the stop token fires.
//!
//! Input lines are read on a dedicated thread and delivered over a channel,
//! so a pending prompt never blocks the stop token.

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use quota_gate_application::{
    ProtocolError, QualificationProtocol, QuotaOracle, SurveyApi, VendorNotifier,
};
use quota_gate_domain::{QualificationPhase, SurveyQuestion};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "q" | "quit" | "/quit")
}

fn is_back(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "b" | "back" | "/back")
}

type LineReceiver = mpsc::UnboundedReceiver<io::Result<String>>;

/// Forward lines until EOF, a read error or the runner going away
fn read_lines(
    mut reader: Box<dyn BufRead + Send>,
    tx: mpsc::UnboundedSender<io::Result<String>>,
) {
    loop {
        let mut line = String::new();
        let read = match reader.read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => Ok(line),
            Err(e) => Err(e),
        };
        let failed = read.is_err();
        if tx.send(read).is_err() || failed {
            return;
        }
    }
}

/// Interactive session for one share link
pub struct RespondentRunner<A, O, V>
where
    A: SurveyApi + 'static,
    O: QuotaOracle + 'static,
    V: VendorNotifier + 'static,
{
    protocol: QualificationProtocol<A, O, V>,
    /// Moved onto the reader thread at the first prompt
    input: Option<Box<dyn BufRead + Send>>,
    lines: Option<LineReceiver>,
    output: Box<dyn Write + Send>,
    stop: CancellationToken,
}

impl<A, O, V> RespondentRunner<A, O, V>
where
    A: SurveyApi + 'static,
    O: QuotaOracle + 'static,
    V: VendorNotifier + 'static,
{
    /// Session on stdin/stdout
    pub fn new(protocol: QualificationProtocol<A, O, V>) -> Self {
        Self {
            protocol,
            input: Some(Box::new(io::BufReader::new(io::stdin()))),
            lines: None,
            output: Box::new(io::stdout()),
            stop: CancellationToken::new(),
        }
    }

    pub fn with_io(
        mut self,
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
    ) -> Self {
        self.input = Some(input);
        self.output = output;
        self
    }

    /// Token that ends the session at the next prompt or restart wait
    /// (wired to Ctrl-C by the binary).
    ///
    /// Stopping during the survey abandons it, which fires the incomplete
    /// vendor redirect.
    pub fn with_stop(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn protocol(&self) -> &QualificationProtocol<A, O, V> {
        &self.protocol
    }

    /// Run until the respondent finishes, quits or the link is unusable.
    ///
    /// Returns the phase the session ended in.
    pub async fn run(&mut self) -> Result<QualificationPhase, RunnerError> {
        let mut phase = self.protocol.load().await?;
        if let Some(survey) = self.protocol.survey() {
            let title = survey.title.clone();
            writeln!(self.output, "\n{}\n", title.bold())?;
        }

        loop {
            phase = match phase {
                QualificationPhase::Screening => match self.screen().await? {
                    Some(next) => next,
                    None => return Ok(self.protocol.phase()),
                },
                QualificationPhase::TakingSurvey => match self.take_survey().await? {
                    Some(next) => next,
                    None => {
                        self.protocol.abandon();
                        writeln!(self.output, "{}", "Survey left unfinished.".dimmed())?;
                        return Ok(self.protocol.phase());
                    }
                },
                _ => {
                    let outcome =
                        ConsoleFormatter::format_outcome(phase, self.protocol.verdict());
                    write!(self.output, "\n{}", outcome)?;
                    match self.wait_for_restart().await? {
                        Some(next) => next,
                        None => return Ok(phase),
                    }
                }
            };
        }
    }

    // ==================== Screening ====================

    async fn screen(&mut self) -> Result<Option<QualificationPhase>, RunnerError> {
        loop {
            let Some(question) = self.protocol.current_question().cloned() else {
                return Err(ProtocolError::NoScreeningQuestion.into());
            };
            let total = self.protocol.screening_questions().len();

            writeln!(
                self.output,
                "{} {}",
                format!("[{}/{}]", self.protocol.question_index() + 1, total).cyan(),
                question.question_text.bold()
            )?;
            for (index, option) in question.options.iter().enumerate() {
                writeln!(self.output, "  {}. {}", index + 1, option.label)?;
            }
            writeln!(self.output, "{}", "(number to answer, b = back, q = quit)".dimmed())?;

            let Some(line) = self.prompt().await? else {
                return Ok(None);
            };
            if is_quit(&line) {
                return Ok(None);
            }
            if is_back(&line) {
                if let Err(e) = self.protocol.back() {
                    writeln!(self.output, "{}", e.to_string().yellow())?;
                }
                continue;
            }

            let Some(option) = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| question.options.get(i))
            else {
                writeln!(
                    self.output,
                    "{}",
                    format!("Please enter a number between 1 and {}", question.options.len())
                        .yellow()
                )?;
                continue;
            };

            self.protocol.answer(&option.id)?;
            let phase = self.protocol.next().await?;
            if phase != QualificationPhase::Screening {
                return Ok(Some(phase));
            }
        }
    }

    // ==================== Survey ====================

    async fn take_survey(&mut self) -> Result<Option<QualificationPhase>, RunnerError> {
        let mut ask = true;
        loop {
            if ask && !self.ask_survey_questions().await? {
                return Ok(None);
            }

            match self.protocol.submit().await {
                Ok(phase) => return Ok(Some(phase)),
                Err(ProtocolError::MissingAnswers(ids)) => {
                    writeln!(
                        self.output,
                        "{}",
                        format!("Please answer: {}", ids.join(", ")).yellow()
                    )?;
                    ask = true;
                }
                Err(e @ ProtocolError::Submission(_)) => {
                    writeln!(self.output, "{}", e.to_string().red())?;
                    writeln!(
                        self.output,
                        "{}",
                        "Press Enter to retry, q to leave".dimmed()
                    )?;
                    match self.prompt().await? {
                        Some(line) if !is_quit(&line) => ask = false,
                        _ => return Ok(None),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Ask every survey question once. Returns `false` if the respondent quit.
    async fn ask_survey_questions(&mut self) -> Result<bool, RunnerError> {
        let questions: Vec<SurveyQuestion> = self.protocol.survey_questions().to_vec();
        for question in &questions {
            loop {
                let marker = if question.required { " *" } else { "" };
                writeln!(self.output, "{}{}", question.text.bold(), marker.red())?;
                if let Some(current) = self.protocol.survey_answer(&question.id) {
                    writeln!(self.output, "{}", format!("(current: {})", current).dimmed())?;
                }
                for (index, choice) in question.choices.iter().enumerate() {
                    writeln!(self.output, "  {}. {}", index + 1, choice)?;
                }

                let Some(line) = self.prompt().await? else {
                    return Ok(false);
                };
                if is_quit(&line) {
                    return Ok(false);
                }
                if line.is_empty() {
                    if question.required && self.protocol.survey_answer(&question.id).is_none() {
                        writeln!(self.output, "{}", "This question is required".yellow())?;
                        continue;
                    }
                    break;
                }

                let value = Self::choice_value(question, &line);
                match self.protocol.answer_survey(&question.id, value) {
                    Ok(()) => break,
                    Err(e @ ProtocolError::InvalidChoice { .. }) => {
                        writeln!(self.output, "{}", e.to_string().yellow())?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(true)
    }

    /// A number selects a choice; anything else is taken verbatim
    fn choice_value(question: &SurveyQuestion, line: &str) -> String {
        line.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.choices.get(i))
            .cloned()
            .unwrap_or_else(|| line.to_string())
    }

    // ==================== Restart ====================

    async fn wait_for_restart(&mut self) -> Result<Option<QualificationPhase>, RunnerError> {
        if !self.protocol.restart_pending() {
            return Ok(None);
        }

        tokio::select! {
            restarted = self.protocol.await_restart() => {
                let phase = restarted?;
                if phase.is_some() {
                    writeln!(self.output, "\n{}", "Next respondent".cyan().bold())?;
                }
                Ok(phase)
            }
            _ = self.stop.cancelled() => {
                debug!("Stop requested while waiting for restart");
                self.protocol.cancel_restart();
                Ok(None)
            }
        }
    }

    /// Next trimmed input line, or `None` at EOF or once stop fires
    async fn prompt(&mut self) -> Result<Option<String>, RunnerError> {
        if self.stop.is_cancelled() {
            return Ok(None);
        }
        write!(self.output, "{} ", ">".green().bold())?;
        self.output.flush()?;

        if let Some(reader) = self.input.take() {
            let (tx, rx) = mpsc::unbounded_channel();
            std::thread::Builder::new()
                .name("respondent-input".to_string())
                .spawn(move || read_lines(reader, tx))?;
            self.lines = Some(rx);
        }
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        tokio::select! {
            biased;
            _ = self.stop.cancelled() => {
                debug!("Stop requested at prompt");
                writeln!(self.output)?;
                Ok(None)
            }
            line = lines.recv() => match line {
                Some(line) => Ok(Some(line?.trim().to_string())),
                None => Ok(None),
            },
        }
    }
}
