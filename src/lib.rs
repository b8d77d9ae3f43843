//! A tiny Brainfuck interpreter library.
//!
//! This crate provides a minimal interpreter that operates on a fixed
//! memory tape (default 512 cells) with a single data pointer. Loops are
//! resolved by re-scanning the source for the matching bracket each time a
//! jump is taken, rather than through a precomputed jump table.
//!
//! Quick start:
//!
//! ```
//! use brfucky::Engine;
//!
//! let mut out: Vec<u8> = Vec::new();
//! Engine::new("++++++++[>++++++++<-]>.").execute(&mut out).unwrap();
//! assert_eq!(out, vec![64]);
//! ```
//!
//! Errors are returned, never turned into a process exit here:
//!
//! ```
//! use brfucky::{Engine, EngineError};
//!
//! let err = Engine::new("<").execute(&mut std::io::sink()).unwrap_err();
//! assert!(matches!(err, EngineError::PointerUnderflow { ip: 0 }));
//! ```

pub mod cli_util;
pub mod config;
pub mod engine;
pub mod logging;

pub use config::Config;
pub use engine::{BracketKind, DEFAULT_TAPE_SIZE, Engine, EngineError, UnmatchedOpenPolicy};

/// Execute `code` against stdout using the default tape and policy.
///
/// ```
/// brfucky::execute("+++[-]").unwrap();
/// assert!(brfucky::execute("<").is_err());
/// ```
pub fn execute(code: &str) -> Result<(), EngineError> {
    Engine::new(code).run()
}
