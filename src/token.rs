//! Configuration tokens emitted verbatim into generated rules.
//!
//! A [`Token`] is either a resolved literal, such as `g++` or `-O2 -MMD`, or an
//! explicit reference to a variable defined by the Makefile template, such as
//! `${cpp_compiler}`. Keeping the two apart means a literal can never carry
//! placeholder syntax that nobody resolves: [`Token::literal`] rejects it.
//!
//! In YAML a token is either a scalar string or a `{ var: NAME }` mapping:
//!
//! ```yaml
//! compiler: g++
//! compile_flags: { var: client_compile_flags }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Errors raised while constructing a [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A literal still contains Make substitution syntax.
    #[error("literal `{value}` contains unresolved placeholder syntax; use `{{ var: NAME }}`")]
    UnresolvedPlaceholder {
        /// The offending literal.
        value: String,
    },
    /// A variable reference has an unusable name.
    #[error("`{name}` is not a valid makefile variable name")]
    InvalidVariable {
        /// The rejected name.
        name: String,
    },
}

/// A resolved configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Token {
    /// Text emitted exactly as written.
    Literal(String),
    /// A variable resolved by `make` when the generated file is run.
    Variable {
        /// Variable name without the `${}` decoration.
        var: String,
    },
}

impl Token {
    /// Build a literal token, rejecting `${...}` and `$(...)` placeholders.
    ///
    /// `$$` is Make's escaped dollar, so `$$(pkg-config --libs x)` is a
    /// resolved literal.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnresolvedPlaceholder`] when `value` contains
    /// substitution syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use genmake::token::Token;
    /// assert!(Token::literal("g++").is_ok());
    /// assert!(Token::literal("${CXX}").is_err());
    /// ```
    pub fn literal(value: impl Into<String>) -> Result<Self, TokenError> {
        let text = value.into();
        if has_placeholder(&text) {
            return Err(TokenError::UnresolvedPlaceholder { value: text });
        }
        Ok(Self::Literal(text))
    }

    /// Build a reference to a makefile variable.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidVariable`] when `name` is empty or contains
    /// whitespace, `$`, braces, parentheses, `:`, `=` or `#`.
    pub fn variable(name: impl Into<String>) -> Result<Self, TokenError> {
        let var = name.into();
        let invalid = var.is_empty()
            || var
                .chars()
                .any(|c| c.is_whitespace() || "${}():=#".contains(c));
        if invalid {
            return Err(TokenError::InvalidVariable { name: var });
        }
        Ok(Self::Variable { var })
    }

}

/// Whether `text` opens a `${` or `$(` reference that is not escaped as `$$`.
fn has_placeholder(text: &str) -> bool {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '$' && matches!(chars.next(), Some('{' | '(')) {
            return true;
        }
    }
    false
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Variable { var } => write!(f, "${{{var}}}"),
        }
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawToken {
            Literal(String),
            Variable {
                var: String,
            },
        }

        match RawToken::deserialize(deserializer)? {
            RawToken::Literal(text) => Self::literal(text),
            RawToken::Variable { var } => Self::variable(var),
        }
        .map_err(serde::de::Error::custom)
    }
}
