//! Progress feedback for both stages of a batch.

use indicatif::{MultiProgress, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Items,
    Bytes,
}

pub trait ProgressBar: Send {
    fn advance(&mut self, n: u64);
}

/// Hands out one bar per tracked unit of work.
pub trait ProgressReporter: Send + Sync {
    fn add_bar(&self, total: u64, label: &str, unit: Unit) -> Box<dyn ProgressBar>;
}

/// Stacked terminal bars, one line per bar.
#[derive(Default)]
pub struct TerminalProgress {
    multi: MultiProgress,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stderr writer that clears the bars around each write, for log
    /// output produced while bars are drawn.
    pub fn writer(&self) -> ProgressWriter {
        ProgressWriter(self.multi.clone())
    }
}

#[derive(Clone)]
pub struct ProgressWriter(MultiProgress);

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.suspend(|| io::stderr().flush())
    }
}

const ITEMS_TEMPLATE: &str = "{msg} [{bar:30.cyan/blue}] {pos} / {len} {elapsed}";
const BYTES_TEMPLATE: &str =
    "{msg:30!} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} ETA {eta}";

fn style(unit: Unit) -> ProgressStyle {
    let template = match unit {
        Unit::Items => ITEMS_TEMPLATE,
        Unit::Bytes => BYTES_TEMPLATE,
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

struct TerminalBar(indicatif::ProgressBar);

impl ProgressBar for TerminalBar {
    fn advance(&mut self, n: u64) {
        self.0.inc(n);
    }
}

impl Drop for TerminalBar {
    fn drop(&mut self) {
        match self.0.length() {
            Some(len) if self.0.position() >= len => self.0.finish(),
            _ => self.0.abandon(),
        }
    }
}

impl ProgressReporter for TerminalProgress {
    fn add_bar(&self, total: u64, label: &str, unit: Unit) -> Box<dyn ProgressBar> {
        let bar = self.multi.add(indicatif::ProgressBar::new(total));
        bar.set_style(style(unit));
        bar.set_message(label.to_string());
        Box::new(TerminalBar(bar))
    }
}

/// Draws nothing.
pub struct NoProgress;

struct Silent;

impl ProgressBar for Silent {
    fn advance(&mut self, _n: u64) {}
}

impl ProgressReporter for NoProgress {
    fn add_bar(&self, _total: u64, _label: &str, _unit: Unit) -> Box<dyn ProgressBar> {
        Box::new(Silent)
    }
}

/// A bar that several tasks advance together.
pub type SharedBar = Arc<Mutex<Box<dyn ProgressBar>>>;

pub fn shared(bar: Box<dyn ProgressBar>) -> SharedBar {
    Arc::new(Mutex::new(bar))
}

pub fn advance_shared(bar: &SharedBar, n: u64) {
    if let Ok(mut bar) = bar.lock() {
        bar.advance(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_parse() {
        // a bad template would silently fall back to the default bar
        for template in [ITEMS_TEMPLATE, BYTES_TEMPLATE] {
            assert!(ProgressStyle::with_template(template).is_ok());
        }
    }

    #[test]
    fn test_shared_bar_advances() {
        struct Count(Arc<Mutex<u64>>);
        impl ProgressBar for Count {
            fn advance(&mut self, n: u64) {
                *self.0.lock().unwrap() += n;
            }
        }

        let seen = Arc::new(Mutex::new(0));
        let bar = shared(Box::new(Count(Arc::clone(&seen))));
        advance_shared(&bar, 2);
        advance_shared(&bar, 3);
        assert_eq!(*seen.lock().unwrap(), 5);
    }

    #[test]
    fn test_writer_passes_output_through() {
        let progress = TerminalProgress::new();
        let _bar = progress.add_bar(3, "file.bin", Unit::Bytes);
        let mut writer = progress.writer();
        assert_eq!(writer.write(b"log line\n").unwrap(), 9);
        writer.flush().unwrap();
    }

    #[test]
    fn test_terminal_bar_without_tty() {
        let progress = TerminalProgress::new();
        let mut bar = progress.add_bar(10, "file.bin", Unit::Bytes);
        bar.advance(10);
        drop(bar);
    }
}
