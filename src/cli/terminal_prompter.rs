use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use crate::domain::picker::quick_pick::{PromptResponse, Prompter, QuickPickRequest};
use crate::error::Result;

/// Line based prompter for the demo binary.
///
/// Entries are numbered from 1. `b` goes back when offered, an empty line,
/// `q` or end of input cancel. Anything else is rejected and asked again.
pub struct TerminalPrompter<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        TerminalPrompter::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompter { input: Mutex::new(input), output: Mutex::new(output) }
    }

    pub fn into_parts(self) -> (R, W) {
        let input = self.input.into_inner().expect("Mutex poisoned");
        let output = self.output.into_inner().expect("Mutex poisoned");
        (input, output)
    }

    fn render(output: &mut W, request: &QuickPickRequest) -> io::Result<()> {
        writeln!(output)?;
        if let Some(step_label) = &request.step_label {
            writeln!(output, "{}", step_label.dimmed())?;
        }
        writeln!(output, "{}", request.placeholder.bold())?;

        for (index, entry) in request.entries.iter().enumerate() {
            let number = format!("[{}]", index + 1);
            match &entry.description {
                Some(description) => writeln!(output, "  {} {} {}", number.cyan(), entry.label, format!("({})", description).dimmed())?,
                None => writeln!(output, "  {} {}", number.cyan(), entry.label)?,
            }
        }

        if request.can_go_back {
            write!(output, "Enter a number, 'b' to go back or 'q' to cancel: ")?;
        } else {
            write!(output, "Enter a number or 'q' to cancel: ")?;
        }
        output.flush()
    }
}

#[async_trait]
impl<R: BufRead + Send, W: Write + Send> Prompter for TerminalPrompter<R, W> {
    async fn show_quick_pick(&self, request: QuickPickRequest) -> Result<PromptResponse> {
        let mut input = self.input.lock().expect("Mutex poisoned");
        let mut output = self.output.lock().expect("Mutex poisoned");

        loop {
            Self::render(&mut output, &request)?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(PromptResponse::Cancelled);
            }

            let answer = line.trim();
            match answer {
                "" | "q" => return Ok(PromptResponse::Cancelled),
                "b" if request.can_go_back => return Ok(PromptResponse::Back),
                _ => {}
            }

            match answer.parse::<usize>() {
                Ok(choice) if choice >= 1 && choice <= request.entries.len() => return Ok(PromptResponse::Picked(choice - 1)),
                _ => writeln!(output, "{}", format!("'{}' is not a valid choice.", answer).yellow())?,
            }
        }
    }
}
