//! The caller-owned runtime context: output sinks, environment, locale and
//! the per-command scope hook.
//!
//! The core never touches process globals directly; everything it reads or
//! writes goes through a [`RunContext`]. Tests run against
//! [`MemoryStream`]s, real programs use [`RunContext::for_process`].

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

/// An output sink with an optional color-depth report.
///
/// Depth follows terminal conventions: 1 for monochrome, 4 for 16 colors,
/// 8 for 256, 24 for truecolor. ANSI styling requires a depth of at least 4.
pub trait Stream {
    fn write_str(&mut self, text: &str);

    fn color_depth(&self) -> Option<u16> {
        None
    }
}

/// Locked standard output.
pub struct StdoutStream;

impl Stream for StdoutStream {
    fn write_str(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
    }

    fn color_depth(&self) -> Option<u16> {
        probe_depth(supports_color::Stream::Stdout)
    }
}

/// Locked standard error.
pub struct StderrStream;

impl Stream for StderrStream {
    fn write_str(&mut self, text: &str) {
        let mut out = std::io::stderr().lock();
        let _ = out.write_all(text.as_bytes());
    }

    fn color_depth(&self) -> Option<u16> {
        probe_depth(supports_color::Stream::Stderr)
    }
}

fn probe_depth(stream: supports_color::Stream) -> Option<u16> {
    let level = supports_color::on(stream)?;
    if level.has_16m {
        Some(24)
    } else if level.has_256 {
        Some(8)
    } else if level.has_basic {
        Some(4)
    } else {
        Some(1)
    }
}

/// In-memory sink sharing its buffer across clones, for tests.
#[derive(Clone, Default)]
pub struct MemoryStream {
    buf: Rc<RefCell<String>>,
    depth: Option<u16>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the stream is a terminal with the given color depth.
    pub fn with_color_depth(mut self, depth: u16) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }
}

impl Stream for MemoryStream {
    fn write_str(&mut self, text: &str) {
        self.buf.borrow_mut().push_str(text);
    }

    fn color_depth(&self) -> Option<u16> {
        self.depth
    }
}

/// Information handed to the per-command scope builder.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Display path of the command about to run, application name first.
    pub prefix: Vec<String>,
}

/// Builds a command-specific scope before the command action runs.
pub type ScopeBuilder = Rc<dyn Fn(&CommandInfo) -> Result<Box<dyn Any>, String>>;

/// Everything a `run` invocation owns: sinks, env, locale and scope.
pub struct RunContext {
    pub stdout: Box<dyn Stream>,
    pub stderr: Box<dyn Stream>,
    pub env: BTreeMap<String, String>,
    pub locale: Option<String>,
    /// Optional per-command scope hook; its product lands in `scope`
    /// before the command action is invoked.
    pub for_command: Option<ScopeBuilder>,
    pub scope: Option<Box<dyn Any>>,
}

impl RunContext {
    /// Context bound to the real process: std streams and process env.
    pub fn for_process() -> Self {
        Self {
            stdout: Box::new(StdoutStream),
            stderr: Box::new(StderrStream),
            env: std::env::vars().collect(),
            locale: None,
            for_command: None,
            scope: None,
        }
    }

    /// Context writing to memory streams; returns the stdout and stderr
    /// handles for inspection.
    pub fn in_memory() -> (Self, MemoryStream, MemoryStream) {
        let stdout = MemoryStream::new();
        let stderr = MemoryStream::new();
        let ctx = Self {
            stdout: Box::new(stdout.clone()),
            stderr: Box::new(stderr.clone()),
            env: BTreeMap::new(),
            locale: None,
            for_command: None,
            scope: None,
        };
        (ctx, stdout, stderr)
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// Env toggle convention: set and not literally `"0"`.
    pub(crate) fn env_enabled(&self, name: &str) -> bool {
        matches!(self.env_var(name), Some(v) if v != "0")
    }
}
