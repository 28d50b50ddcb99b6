//! Text encoding of primitives for the device shell.
//!
//! A primitive renders as `tap <x> <y>` or
//! `swipe <x1> <y1> <x2> <y2> <duration_ms>`. The line written to the shell
//! prefixes the `input` program: `input tap 10 20`.

use std::fmt;
use std::str::FromStr;

use crate::constants::{BATCH_SEPARATOR, INPUT_PROGRAM};
use crate::types::Primitive;

/// Errors produced when parsing a command line back into a [`Primitive`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} arguments, got {actual}")]
    Arity {
        verb: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap { x, y } => write!(f, "tap {x} {y}"),
            Self::Swipe {
                x1,
                y1,
                x2,
                y2,
                duration_ms,
            } => write!(f, "swipe {x1} {y1} {x2} {y2} {duration_ms}"),
        }
    }
}

impl FromStr for Primitive {
    type Err = ParseCommandError;

    /// Parses `tap …` / `swipe …`, with or without the leading `input`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace().peekable();
        if words.peek() == Some(&INPUT_PROGRAM) {
            words.next();
        }
        let verb = words.next().ok_or(ParseCommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        match verb {
            "tap" => {
                expect_arity("tap", 2, &args)?;
                Ok(Self::Tap {
                    x: parse_num(args[0])?,
                    y: parse_num(args[1])?,
                })
            }
            "swipe" => {
                expect_arity("swipe", 5, &args)?;
                Ok(Self::Swipe {
                    x1: parse_num(args[0])?,
                    y1: parse_num(args[1])?,
                    x2: parse_num(args[2])?,
                    y2: parse_num(args[3])?,
                    duration_ms: parse_num(args[4])?,
                })
            }
            other => Err(ParseCommandError::UnknownVerb(other.to_string())),
        }
    }
}

fn expect_arity(verb: &'static str, expected: usize, args: &[&str]) -> Result<(), ParseCommandError> {
    if args.len() != expected {
        return Err(ParseCommandError::Arity {
            verb,
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn parse_num<T: FromStr>(s: &str) -> Result<T, ParseCommandError> {
    s.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(s.to_string()))
}

/// Shell line injecting `primitive` on the device (no trailing newline).
pub fn shell_line(primitive: &Primitive) -> String {
    format!("{INPUT_PROGRAM} {primitive}")
}

/// Joins primitives into one shell statement for a chunked invocation.
pub fn join_batch(primitives: &[Primitive]) -> String {
    primitives
        .iter()
        .map(shell_line)
        .collect::<Vec<_>>()
        .join(BATCH_SEPARATOR)
}
