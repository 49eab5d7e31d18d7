//! Errors this crate can actually return.
//!
//! The engine's failure surface is intentionally small: almost everything
//! (`reply`, `greet`, the reply half of `converse`) degrades gracefully
//! instead of erroring, per the evaluator/babble design. The one fatal
//! condition is running out of 16-bit symbol IDs.

use std::fmt;

/// Failure modes exposed by [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The symbol table has already assigned all `2^16` IDs (or the word
    /// being interned exceeds the 255-byte symbol length limit).
    SymbolSpaceExhausted {
        /// The word whose interning triggered the failure.
        word: Vec<u8>,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SymbolSpaceExhausted { word } => write!(
                f,
                "symbol space exhausted while interning {:?}",
                String::from_utf8_lossy(word)
            ),
        }
    }
}

impl std::error::Error for EngineError {}
