//! Command lines submitted to the queue
//!
//! A raw line is split with POSIX shell quoting rules, then the first word is
//! checked against the allow-list of configured executables.

use crate::error::ParseError;
use std::fmt;

/// A validated job: an allow-listed executable and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    executable: String,
    args: Vec<String>,
}

impl Command {
    /// Parse `raw` and check its executable against `allowed`.
    ///
    /// The match is exact: `/bin/echo` does not satisfy an allow-list
    /// entry of `echo`.
    pub fn parse<S: AsRef<str>>(raw: &str, allowed: &[S]) -> Result<Self, ParseError> {
        let raw = raw.trim();
        let mut words =
            shlex::split(raw).ok_or_else(|| ParseError::Malformed(raw.to_string()))?;

        if words.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let executable = words.remove(0);
        if !allowed.iter().any(|a| a.as_ref() == executable) {
            return Err(ParseError::UnauthorizedExecutable(executable));
        }

        Ok(Self {
            executable,
            args: words,
        })
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Dedup key: the executable and arguments joined by single spaces
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
