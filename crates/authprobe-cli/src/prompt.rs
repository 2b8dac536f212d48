use authprobe_core::error::{ProbeError, Result};
use dialoguer::{Confirm, Input, Select};

/// Prompt capability used by the Input Collector and Preflight Checker.
///
/// Keeping this a trait means the pipeline stages never touch the terminal
/// directly: tests drive them with a scripted implementation instead.
pub trait Prompter {
    /// Free-text input. With a default, empty input returns the default;
    /// without one, empty input is returned as-is for the caller to judge.
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String>;

    /// Choice between labeled options; returns the selected index.
    fn choice(&mut self, label: &str, options: &[&str], default: usize) -> Result<usize>;

    /// Yes/no confirmation.
    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// TermPrompter
// ---------------------------------------------------------------------------

/// Terminal-backed prompter.
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Input::<String>::new().with_prompt(label);
        prompt = match default {
            Some(value) => prompt.default(value.to_string()),
            None => prompt.allow_empty(true),
        };
        prompt.interact_text().map_err(into_probe)
    }

    fn choice(&mut self, label: &str, options: &[&str], default: usize) -> Result<usize> {
        Select::new()
            .with_prompt(label)
            .items(options)
            .default(default)
            .interact()
            .map_err(into_probe)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(label)
            .default(default)
            .interact()
            .map_err(into_probe)
    }
}

fn into_probe(e: dialoguer::Error) -> ProbeError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            ProbeError::Cancelled
        }
        dialoguer::Error::IO(io) => ProbeError::Io(io),
    }
}

// ---------------------------------------------------------------------------
// ScriptedPrompter (test support)
// ---------------------------------------------------------------------------

/// Deterministic prompter fed from a fixed answer list. An empty answer
/// means "accept the default".
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn next(&mut self, label: &str) -> String {
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer left for prompt '{label}'"))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(label);
        match (answer.is_empty(), default) {
            (true, Some(value)) => Ok(value.to_string()),
            _ => Ok(answer),
        }
    }

    fn choice(&mut self, label: &str, _options: &[&str], default: usize) -> Result<usize> {
        let answer = self.next(label);
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(answer.parse().expect("scripted choice must be an index"))
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        match self.next(label).as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            _ => Ok(false),
        }
    }
}
