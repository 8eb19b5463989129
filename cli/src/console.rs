//! Line-oriented terminal I/O. Doubles as the confirmation/alert surface the
//! controller asks through.

use std::io::{self, BufRead, Write};

use student_core::Prompt;
use tracing::warn;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.output.write_all(b"\n")?;
        }
        self.output.flush()
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for Console<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        match self.read_line(&format!("{message} [y/N] ")) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(err) = self.print(&format!("! {message}")) {
            warn!(error = %err, "could not show alert");
        }
    }
}
