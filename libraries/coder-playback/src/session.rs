//! Session tokens
//!
//! Every track selection opens a new session. Commands and embed callbacks
//! carry the token of the session they belong to, and anything tagged with
//! an older token is dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation number of a track selection
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SessionToken(u64);

impl SessionToken {
    /// Token used before any track was selected
    pub const NONE: Self = Self(0);

    /// Raw generation number
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of session tokens
#[derive(Debug, Default)]
pub struct SessionCounter {
    current: u64,
}

impl SessionCounter {
    /// Start at [`SessionToken::NONE`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede the current session and return the new token
    pub fn advance(&mut self) -> SessionToken {
        self.current += 1;
        SessionToken(self.current)
    }

    /// Token of the live session
    pub fn current(&self) -> SessionToken {
        SessionToken(self.current)
    }

    /// Whether `token` belongs to the live session
    pub fn is_current(&self, token: SessionToken) -> bool {
        token.0 == self.current && token != SessionToken::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_monotonic() {
        let mut counter = SessionCounter::new();
        let first = counter.advance();
        let second = counter.advance();

        assert!(second > first);
        assert!(counter.is_current(second));
        assert!(!counter.is_current(first));
    }

    #[test]
    fn none_token_is_never_current() {
        let counter = SessionCounter::new();
        assert_eq!(counter.current(), SessionToken::NONE);
        assert!(!counter.is_current(SessionToken::NONE));
    }
}
