//! Source location tracking
//!
//! Every token and diagnostic carries the name of the stream it came from plus
//! a 1-based line and column. Stream names are only used for reporting.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A line/column position inside one character stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column number in characters (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The first character of a stream
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Position after consuming `ch`
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A position qualified by its stream name.
///
/// Displays as `stream:line:column`, the prefix used by every diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub stream: Arc<str>,
    pub position: Position,
}

impl SourceLocation {
    pub fn new(stream: Arc<str>, position: Position) -> Self {
        Self { stream, position }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }

    /// Location for values that did not come from any stream
    pub fn unknown() -> Self {
        Self {
            stream: Arc::from("<unknown>"),
            position: Position::start(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.stream, self.position.line, self.position.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start();
        let pos = pos.advance('a').advance('b');
        assert_eq!(pos, Position::new(1, 3));

        let pos = pos.advance('\n');
        assert_eq!(pos, Position::new(2, 1));
    }

    #[test]
    fn test_location_display() {
        let loc = SourceLocation::new(Arc::from("maps/e1m1.dh"), Position::new(12, 7));
        assert_eq!(loc.to_string(), "maps/e1m1.dh:12:7");
        assert_eq!(loc.stream_name(), "maps/e1m1.dh");
        assert_eq!(loc.line(), 12);
        assert_eq!(loc.column(), 7);
    }
}
