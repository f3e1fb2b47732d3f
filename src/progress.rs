use std::error::Error;
use std::io::Write;
use std::time::{Duration, Instant};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub mod verbs {
    pub const LOADED: &str = "Loaded";
    pub const USING: &str = "Using";
    pub const LOGGING: &str = "Logging";
    pub const DONE: &str = "Done";
    pub const FAILED: &str = "Failed";
}

/// Status lines and a done/total counter, printed to stderr
#[derive(Debug)]
pub struct Progress {
    out: StandardStream,
    pub done_count: usize,
    pub total_count: usize,
    last_update: Instant,
    quiet: bool,
}

impl Progress {
    pub fn new(quiet: bool) -> Self {
        Self {
            out: StandardStream::stderr(ColorChoice::Auto),
            done_count: 0,
            total_count: 0,
            last_update: Instant::now(),
            quiet,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done_count >= self.total_count
    }

    pub fn add_total(&mut self, count: usize) {
        self.total_count += count;
    }

    pub fn add_done(&mut self, count: usize) -> Result<(), Box<dyn Error>> {
        self.done_count += count;
        if self.quiet {
            return Ok(());
        }
        if self.last_update.elapsed() > Duration::from_millis(100) {
            self.update_progress()?;
        }
        Ok(())
    }

    fn update_progress(&mut self) -> Result<(), Box<dyn Error>> {
        self.out
            .set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Yellow)))?;
        write!(self.out, "{:>12}", verbs::LOGGING)?;
        self.out.reset()?;
        write!(self.out, " {}/{}\r", self.done_count, self.total_count)?;
        self.last_update = Instant::now();
        Ok(())
    }

    pub fn print_status(
        &mut self,
        status: &str,
        message: &str,
        color: Color,
    ) -> Result<(), Box<dyn Error>> {
        if self.quiet {
            return Ok(());
        }
        self.out.reset()?;
        self.out
            .set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)))?;
        write!(self.out, "{:>12}", status)?;
        self.out.reset()?;
        // clear whatever the counter left on the line
        writeln!(self.out, " {}{esc}[0K", message, esc = 27 as char)?;
        Ok(())
    }
}
