//! Progress reporting

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Sink for human-readable progress
pub trait Reporter: Send + Sync {
    /// Begin a long-running step (shows a spinner)
    fn start(&self, message: &str);

    /// Update the message of the running step
    fn update(&self, message: &str);

    /// Finish the running step successfully
    fn finish(&self, message: &str);

    /// Finish the running step with a failure
    fn fail(&self, message: &str);

    /// Informational line
    fn info(&self, message: &str);

    /// Non-fatal warning
    fn warn(&self, message: &str);
}

/// Reporter rendering an indicatif spinner on stderr.
///
/// Every message line goes to the same writer (stderr by default), whether or not a spinner
/// is running; a running spinner is suspended while the line is written.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
    out: Mutex<Box<dyn Write + Send>>,
    draw_spinners: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self {
            spinner: Mutex::new(None),
            out: Mutex::new(Box::new(std::io::stderr())),
            draw_spinners: true,
        }
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter writing lines to `out` with hidden spinners
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            spinner: Mutex::new(None),
            out: Mutex::new(Box::new(out)),
            draw_spinners: false,
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut s| s.take())
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }

    fn emit(&self, line: &str) {
        match self.spinner.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(bar) => bar.suspend(|| self.write_line(line)),
            None => self.write_line(line),
        }
    }
}

impl Reporter for TerminalReporter {
    fn start(&self, message: &str) {
        let bar = if self.draw_spinners {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
            {
                bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(message.to_string());

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn update(&self, message: &str) {
        if let Ok(slot) = self.spinner.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_message(message.to_string());
            }
        }
    }

    fn finish(&self, message: &str) {
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
        self.write_line(&format!("✓ {}", message));
    }

    fn fail(&self, message: &str) {
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
        self.write_line(&format!("✗ {}", message));
    }

    fn info(&self, message: &str) {
        self.emit(message);
    }

    fn warn(&self, message: &str) {
        self.emit(&format!("⚠ {}", message));
    }
}
