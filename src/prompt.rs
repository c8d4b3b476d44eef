//! Line-oriented console interaction for the destructive operations.

use std::io::{self, BufRead, Write};

/// A reader/writer pair used for confirmations and pasted lists.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, message: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", message.as_ref())
    }

    /// Asks a `(y/n)` question. Only `y`/`Y` counts as yes; EOF is a no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} (y/n) ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;

        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    /// Reads newline-delimited entries until EOF. Blank lines are skipped.
    pub fn read_list(&mut self, prompt: &str) -> io::Result<Vec<String>> {
        writeln!(self.output, "{prompt} (Press Ctrl+D when done.)")?;
        self.output.flush()?;

        let mut entries = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let entry = line.trim_end_matches(&['\r', '\n'][..]);
            if !entry.trim().is_empty() {
                entries.push(entry.to_string());
            }
        }

        Ok(entries)
    }
}
