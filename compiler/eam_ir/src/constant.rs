//! Compile-time constant values.

use std::fmt;

/// A value the host compiler knows at compile time.
///
/// Floats are stored as `u64` bits so the type stays `Eq + Hash`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Constant {
    Str(String),
    Int(i64),
    Float(u64),
    Bool(bool),
    Char(char),
    Null,
}

impl Constant {
    /// Create a string constant.
    pub fn str(value: impl Into<String>) -> Self {
        Constant::Str(value.into())
    }

    /// Create a float constant from its value.
    pub fn float(value: f64) -> Self {
        Constant::Float(value.to_bits())
    }

    /// Get the string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer payload, if this is an integer constant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The textual form a pattern is matched against.
    ///
    /// Mirrors how the host formats a value into a string: booleans are
    /// `True`/`False` and `null` is the empty string.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Str(s) => f.write_str(s),
            Constant::Int(n) => write!(f, "{n}"),
            Constant::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Constant::Bool(true) => f.write_str("True"),
            Constant::Bool(false) => f.write_str("False"),
            Constant::Char(c) => write!(f, "{c}"),
            Constant::Null => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_each_kind() {
        assert_eq!(Constant::str("12345").to_text(), "12345");
        assert_eq!(Constant::Int(-7).to_text(), "-7");
        assert_eq!(Constant::float(1.5).to_text(), "1.5");
        assert_eq!(Constant::Bool(true).to_text(), "True");
        assert_eq!(Constant::Bool(false).to_text(), "False");
        assert_eq!(Constant::Char('x').to_text(), "x");
        assert_eq!(Constant::Null.to_text(), "");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Constant::str("a").as_str(), Some("a"));
        assert_eq!(Constant::Int(3).as_str(), None);
        assert_eq!(Constant::Int(3).as_int(), Some(3));
        assert_eq!(Constant::Null.as_int(), None);
    }
}
