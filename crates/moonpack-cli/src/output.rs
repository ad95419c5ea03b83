//! Colored terminal output shared by the commands.
//!
//! Uses `termcolor` for cross-platform styling and respects the `NO_COLOR`
//! environment variable and the global `--color` flag.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve the color choice from the `--color` flag and environment.
///
/// Priority: `NO_COLOR` env, then the flag, then TTY auto-detection.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer over stdout/stderr.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    /// Create a styled writer with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn colored_line(&mut self, text: &str, color: Color, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = writeln!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Green bold line for completed work.
    pub fn success_line(&mut self, text: &str) {
        self.colored_line(text, Color::Green, true);
    }

    /// Yellow line for lint warnings.
    pub fn warning_line(&mut self, text: &str) {
        self.colored_line(text, Color::Yellow, false);
    }

    /// Cyan line for progress notes.
    pub fn info_line(&mut self, text: &str) {
        self.colored_line(text, Color::Cyan, false);
    }

    /// Plain line.
    pub fn plain_line(&mut self, text: &str) {
        let _ = writeln!(self.stdout, "{}", text);
    }

    /// Red bold line on stderr.
    pub fn error_line(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }
}
