//! Source locations attached to every AST node and every type.
//!
//! The parser produces these; the analyzer only carries them through to
//! diagnostics. `Location::default()` is used pervasively by tests that
//! construct AST nodes by hand.

use std::fmt::Display;

use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(file: impl ToString, line: usize, column: usize, offset: usize) -> Location {
        Location {
            file: file.to_string(),
            line,
            column,
            offset,
        }
    }

    /// Render a diagnostic message prefixed with this location, the way the
    /// CLI presents errors and warnings.
    pub fn annotate(&self, message: impl Display) -> String {
        format!("{}: {message}", self.to_string().bold())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn test_display_with_file() {
        let location = Location::new("main.kea", 3, 14, 27);
        assert_eq!(location.to_string(), "main.kea:3:14");
    }

    #[test]
    fn test_display_without_file() {
        let location = Location::new("", 3, 14, 27);
        assert_eq!(location.to_string(), "3:14");
    }
}
