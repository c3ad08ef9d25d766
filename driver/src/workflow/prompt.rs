use std::cell::RefCell;
use std::io::{BufRead, Write};
use sweepcore::{ParameterResolver, SweepError, SweepLayout, SweepResult};

/// Asks on a terminal for the sweep layout when no LO trace is available.
pub struct PromptResolver<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn ask(&self, question: &str) -> Option<String> {
        let mut output = self.output.borrow_mut();
        if write!(output, "{}", question)
            .and_then(|_| output.flush())
            .is_err()
        {
            return None;
        }

        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn sweep_count(&self) -> SweepResult<usize> {
        let mut question = "Input number of full sweeps in the data: ";
        loop {
            let answer = self
                .ask(question)
                .ok_or(SweepError::MissingParameter("sweep count"))?;
            match answer.split_whitespace().next().map(str::parse::<usize>) {
                Some(Ok(count)) if count > 0 => return Ok(count),
                _ => question = "Must be a positive integer! Retype: ",
            }
        }
    }
}

impl<R: BufRead, W: Write> ParameterResolver for PromptResolver<R, W> {
    fn resolve(&self) -> SweepResult<SweepLayout> {
        let sweep_count = self.sweep_count()?;
        let answer = self
            .ask("Does the first sweep go up? Y|n ")
            .ok_or(SweepError::MissingParameter("sweep direction"))?;
        let sweep_up = matches!(answer.as_str(), "y" | "Y" | "yes" | "Yes" | "YES");
        SweepLayout::new(sweep_count, sweep_up)
    }
}
