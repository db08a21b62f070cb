use std::{
  fmt,
  io::{self, Write},
};

/// Human readable diagnostics, written to a configurable target only while
/// verbose mode is on. Nothing here influences allocation decisions.
pub struct Diagnostics {
  verbose: bool,
  target: Option<Box<dyn Write + Send>>,
  stderr: StderrTarget,
}

impl Diagnostics {
  pub const fn new() -> Self {
    Self {
      verbose: false,
      target: None,
      stderr: StderrTarget,
    }
  }

  pub fn set_verbose(
    &mut self,
    verbose: bool,
  ) {
    self.verbose = verbose;
    self.emit(format_args!("Verbose enabled"));
  }

  /// Redirects diagnostics (and heap maps) to `target`. `None` restores
  /// stderr.
  pub fn set_target(
    &mut self,
    target: Option<Box<dyn Write + Send>>,
  ) {
    self.target = target;
  }

  /// Writes one line when verbose.
  pub fn emit(
    &mut self,
    message: fmt::Arguments<'_>,
  ) {
    if !self.verbose {
      return;
    }

    if let Err(err) = writeln!(self.writer(), "{message}") {
      log::warn!("failed to write diagnostics: {err}");
    }
  }

  /// The configured target, regardless of verbosity.
  pub fn writer(&mut self) -> &mut dyn Write {
    match self.target {
      Some(ref mut target) => target.as_mut(),
      None => &mut self.stderr,
    }
  }
}

impl Default for Diagnostics {
  fn default() -> Self {
    Self::new()
  }
}

struct StderrTarget;

impl Write for StderrTarget {
  fn write(
    &mut self,
    buf: &[u8],
  ) -> io::Result<usize> {
    io::stderr().write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    io::stderr().flush()
  }
}
