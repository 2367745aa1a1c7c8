//! Command text -> typed `Command`.
//!
//! Формат: `<VERB> <arg1> [<arg2>]`, поля разделены ровно одним пробелом.
//! Экранирования нет, поэтому значение с пробелом непредставимо.
//! Повторные пробелы дают пустые токены и принимаются как есть.

use std::fmt;
use std::str::FromStr;

use crate::error::{KvError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

impl Command {
    pub const SET: &'static str = "SET";
    pub const GET: &'static str = "GET";
    pub const DELETE: &'static str = "DELETE";

    /// Split on single spaces and dispatch on the (case-sensitive) verb.
    /// Arity is checked before any field is touched.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(' ').collect();
        match parts[0] {
            Self::SET => {
                expect_arity(Self::SET, &parts, 3)?;
                Ok(Command::Set {
                    key: parts[1].to_string(),
                    value: parts[2].to_string(),
                })
            }
            Self::GET => {
                expect_arity(Self::GET, &parts, 2)?;
                Ok(Command::Get {
                    key: parts[1].to_string(),
                })
            }
            Self::DELETE => {
                expect_arity(Self::DELETE, &parts, 2)?;
                Ok(Command::Delete {
                    key: parts[1].to_string(),
                })
            }
            other => Err(KvError::UnknownCommand {
                verb: other.to_string(),
                command: text.to_string(),
            }),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::Set { .. } => Self::SET,
            Command::Get { .. } => Self::GET,
            Command::Delete { .. } => Self::DELETE,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. } | Command::Get { key } | Command::Delete { key } => key,
        }
    }

    /// SET/DELETE change the mapping, GET does not.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Get { .. })
    }
}

fn expect_arity(verb: &'static str, parts: &[&str], expected: usize) -> Result<()> {
    if parts.len() != expected {
        return Err(KvError::MalformedCommand {
            verb,
            expected,
            got: parts.len(),
        });
    }
    Ok(())
}

impl FromStr for Command {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { key, value } => write!(f, "{} {} {}", Self::SET, key, value),
            Command::Get { key } => write!(f, "{} {}", Self::GET, key),
            Command::Delete { key } => write!(f, "{} {}", Self::DELETE, key),
        }
    }
}
