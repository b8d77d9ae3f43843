//! The execution engine.
//!
//! The engine walks the source left to right exactly once, except where a
//! loop bracket sends it back or forward. Matching brackets are found by
//! re-scanning the source at the moment a jump is needed; nothing is
//! precomputed.
//!
//! Behaviors:
//! - Tape of unsigned 8-bit cells (512 by default), initialized to 0.
//! - `<` at cell 0 and `>` at the last cell are fatal errors.
//! - `+`/`-` wrap modulo 256.
//! - `.` writes the raw cell byte to the output sink (no newline).
//! - Every other character, `,` included, is a no-op.
//! - An unmatched `]` found by a backward scan is always an error; an
//!   unmatched `[` found by a forward scan follows [`UnmatchedOpenPolicy`].

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use tracing::{debug, trace, warn};

/// Number of cells on the tape unless configured otherwise.
pub const DEFAULT_TAPE_SIZE: usize = 512;

/// Errors that end an execution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `<` was executed while the pointer was on cell 0.
    #[error("pointer moved left of cell 0 at instruction {ip}")]
    PointerUnderflow { ip: usize },

    /// `>` was executed while the pointer was on the last cell.
    #[error(
        "pointer moved past the last cell at instruction {ip} (ptr={ptr}, capacity={capacity})"
    )]
    PointerOverflow { ip: usize, ptr: usize, capacity: usize },

    /// A loop scan ran off the source without finding its partner.
    #[error("unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBracket { ip: usize, kind: BracketKind },

    /// Writing to the output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Instruction index the error points at.
    pub fn ip(&self) -> usize {
        match self {
            EngineError::PointerUnderflow { ip }
            | EngineError::PointerOverflow { ip, .. }
            | EngineError::UnmatchedBracket { ip, .. }
            | EngineError::Io { ip, .. } => *ip,
        }
    }
}

/// Which side of a loop was left without a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// What to do when a forward scan from `[` reaches the end of the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedOpenPolicy {
    /// Fail with [`EngineError::UnmatchedBracket`].
    #[default]
    Error,
    /// Stop quietly at end of source, as the classic implementation did.
    Halt,
}

impl FromStr for UnmatchedOpenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(UnmatchedOpenPolicy::Error),
            "halt" => Ok(UnmatchedOpenPolicy::Halt),
            other => Err(format!(
                "unknown unmatched-open policy '{other}' (expected 'error' or 'halt')"
            )),
        }
    }
}

impl fmt::Display for UnmatchedOpenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedOpenPolicy::Error => write!(f, "error"),
            UnmatchedOpenPolicy::Halt => write!(f, "halt"),
        }
    }
}

/// Where a forward scan stopped.
enum ForwardScan {
    /// Index of the matching `]`.
    Found(usize),
    /// Reached end of source.
    Exhausted,
}

/// An interpreter bound to one source string.
///
/// Holds the source, the tape and the cell pointer. Each execution resets
/// the tape and pointer first; nothing carries over between runs.
pub struct Engine {
    code: Vec<char>,
    memory: Vec<u8>,
    pointer: usize,
    unmatched_open: UnmatchedOpenPolicy,
}

impl Engine {
    /// Create an engine for `code` with a zeroed tape of [`DEFAULT_TAPE_SIZE`] cells.
    pub fn new(code: &str) -> Self {
        Self::with_tape_size(code, DEFAULT_TAPE_SIZE)
    }

    /// Create an engine for `code` with a zeroed tape of `tape_size` cells.
    ///
    /// A zero size is bumped to one cell so the pointer always addresses memory.
    pub fn with_tape_size(code: &str, tape_size: usize) -> Self {
        Self {
            code: code.chars().collect(),
            memory: vec![0; tape_size.max(1)],
            pointer: 0,
            unmatched_open: UnmatchedOpenPolicy::default(),
        }
    }

    /// Choose how an unmatched `[` is handled.
    pub fn unmatched_open(mut self, policy: UnmatchedOpenPolicy) -> Self {
        self.unmatched_open = policy;
        self
    }

    /// Current tape contents.
    pub fn tape(&self) -> &[u8] {
        &self.memory
    }

    /// Current cell pointer.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Run the program, writing output bytes to stdout.
    ///
    /// Bytes go straight to the process-wide stdout handle, which is never
    /// held locked between writes; a signal handler flushing stdout sees
    /// everything written so far.
    pub fn run(&mut self) -> Result<(), EngineError> {
        let mut out = io::stdout();
        self.execute(&mut out)
    }

    /// Run the program, writing output bytes to `out`.
    ///
    /// Every call starts from a zeroed tape with the pointer on cell 0. The
    /// state left behind stays readable through [`Engine::tape`] and
    /// [`Engine::pointer`] until the next call.
    pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<(), EngineError> {
        self.memory.fill(0);
        self.pointer = 0;

        debug!(
            source_len = self.code.len(),
            tape_size = self.memory.len(),
            policy = %self.unmatched_open,
            "starting execution"
        );

        let result = self.interpret(out);
        let flushed = out.flush().map_err(|source| EngineError::Io {
            ip: self.code.len(),
            source,
        });
        // An interpreter error takes precedence over a failed flush.
        let result = result.and(flushed);

        match &result {
            Ok(()) => debug!(pointer = self.pointer, "execution finished"),
            Err(err) => debug!(error = %err, "execution aborted"),
        }
        result
    }

    fn interpret<W: Write>(&mut self, out: &mut W) -> Result<(), EngineError> {
        let mut ip = 0;

        while ip < self.code.len() {
            match self.code[ip] {
                '>' => {
                    if self.pointer + 1 >= self.memory.len() {
                        return Err(EngineError::PointerOverflow {
                            ip,
                            ptr: self.pointer,
                            capacity: self.memory.len(),
                        });
                    }
                    self.pointer += 1;
                }
                '<' => {
                    if self.pointer == 0 {
                        return Err(EngineError::PointerUnderflow { ip });
                    }
                    self.pointer -= 1;
                }
                '+' => {
                    self.memory[self.pointer] = self.memory[self.pointer].wrapping_add(1);
                }
                '-' => {
                    self.memory[self.pointer] = self.memory[self.pointer].wrapping_sub(1);
                }
                '.' => {
                    out.write_all(&[self.memory[self.pointer]])
                        .map_err(|source| EngineError::Io { ip, source })?;
                }
                '[' => {
                    if self.memory[self.pointer] == 0 {
                        match self.scan_forward(ip) {
                            ForwardScan::Found(close) => ip = close,
                            ForwardScan::Exhausted => match self.unmatched_open {
                                UnmatchedOpenPolicy::Error => {
                                    return Err(EngineError::UnmatchedBracket {
                                        ip,
                                        kind: BracketKind::Open,
                                    });
                                }
                                UnmatchedOpenPolicy::Halt => {
                                    warn!(ip, "unmatched '[' skipped to end of source; halting");
                                    return Ok(());
                                }
                            },
                        }
                    }
                }
                ']' => {
                    if self.memory[self.pointer] != 0 {
                        ip = self.scan_backward(ip).ok_or(EngineError::UnmatchedBracket {
                            ip,
                            kind: BracketKind::Close,
                        })?;
                    }
                }
                _ => {}
            }
            ip += 1;
        }

        Ok(())
    }

    /// Find the `]` matching the `[` at `open`.
    fn scan_forward(&self, open: usize) -> ForwardScan {
        let mut opened = 0usize;
        for pos in open + 1..self.code.len() {
            match self.code[pos] {
                ']' if opened == 0 => {
                    trace!(from = open, to = pos, "forward scan matched");
                    return ForwardScan::Found(pos);
                }
                '[' => opened += 1,
                ']' => opened -= 1,
                _ => {}
            }
        }
        trace!(from = open, "forward scan reached end of source");
        ForwardScan::Exhausted
    }

    /// Find the `[` matching the `]` at `close`. `None` if the scan reaches
    /// the start of the source first.
    fn scan_backward(&self, close: usize) -> Option<usize> {
        let mut closed = 0usize;
        for pos in (0..close).rev() {
            match self.code[pos] {
                '[' if closed == 0 => {
                    trace!(from = close, to = pos, "backward scan matched");
                    return Some(pos);
                }
                ']' => closed += 1,
                '[' => closed -= 1,
                _ => {}
            }
        }
        trace!(from = close, "backward scan reached start of source");
        None
    }
}
