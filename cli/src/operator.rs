//! Interactive operator prompts.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{bail, Context};

/// Answers accepted as "yes" (English and Portuguese).
const YES: &[&str] = &["y", "yes", "s", "sim"];

pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    YES.contains(&answer.as_str())
}

/// Asks questions on `output` and reads one-line answers from `input`.
pub struct Operator<R, W> {
    input: R,
    output: W,
}

impl Operator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Operator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and return the trimmed answer.
    pub fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read operator input")?;
        if read == 0 {
            bail!("input closed while waiting for: {}", question.trim());
        }
        Ok(line.trim().to_string())
    }

    /// Use `given` if present, otherwise ask.
    pub fn ask_unless(&mut self, given: Option<String>, question: &str) -> anyhow::Result<String> {
        match given {
            Some(value) => Ok(value),
            None => self.ask(question),
        }
    }

    /// Yes/no question. Anything other than a yes answer counts as no.
    pub fn confirm(&mut self, given: Option<bool>, question: &str) -> anyhow::Result<bool> {
        match given {
            Some(value) => Ok(value),
            None => Ok(is_yes(&self.ask(question)?)),
        }
    }
}
