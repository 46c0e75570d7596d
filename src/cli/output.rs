//! Coloured operator output.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{IsTerminal, Write};

/// Writes progress, success and warning lines to the terminal.
///
/// Colour is only used when the stream is a terminal, so CI logs and
/// captured output stay plain.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    stdout_choice: ColorChoice,
    stderr_choice: ColorChoice,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            stdout_choice: choice_for(std::io::stdout().is_terminal()),
            stderr_choice: choice_for(std::io::stderr().is_terminal()),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Plain line on stdout.
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.stdout_choice);
        writeln!(stdout, "{}", message)
    }

    /// Detail shown only with `--verbose`.
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.is_verbose() {
            return Ok(());
        }
        self.colored_stdout(message, ColorSpec::new().set_dimmed(true))
    }

    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored_stdout(message, ColorSpec::new().set_fg(Some(Color::Cyan)))
    }

    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored_stdout(
            message,
            ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true),
        )
    }

    /// Warning on stderr.
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stderr = StandardStream::stderr(self.stderr_choice);
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(stderr, "warning:")?;
        stderr.reset()?;
        writeln!(stderr, " {}", message)
    }

    /// Error on stderr. Never suppressed.
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        let mut stderr = StandardStream::stderr(self.stderr_choice);
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stderr, "Error:")?;
        stderr.reset()?;
        writeln!(stderr, " {}", message)
    }

    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored_stdout(
            &format!("==> {}", title),
            ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true),
        )
    }

    /// Indented detail line.
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.stdout_choice);
        for line in message.lines() {
            writeln!(stdout, "    {}", line)?;
        }
        Ok(())
    }

    fn colored_stdout(&self, message: &str, spec: &ColorSpec) -> std::io::Result<()> {
        let mut stdout = StandardStream::stdout(self.stdout_choice);
        stdout.set_color(spec)?;
        write!(stdout, "{}", message)?;
        stdout.reset()?;
        writeln!(stdout)
    }
}

fn choice_for(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
