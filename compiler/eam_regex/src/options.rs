//! Pattern option flags.

use bitflags::bitflags;

bitflags! {
    /// Option flags accepted next to pattern text in constraint declarations.
    ///
    /// The bit values follow the host's numbering so the integer argument of
    /// a `Match(pattern, options)` attribute converts directly. Unknown bits
    /// are retained rather than rejected.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct PatternOptions: u32 {
        const IGNORE_CASE = 1;
        const MULTILINE = 2;
        /// Only named groups capture.
        const EXPLICIT_CAPTURE = 4;
        const COMPILED = 8;
        /// `.` matches `\n`.
        const SINGLELINE = 16;
        const IGNORE_PATTERN_WHITESPACE = 32;
        const RIGHT_TO_LEFT = 64;
        const ECMA_SCRIPT = 256;
        const CULTURE_INVARIANT = 512;
        const NON_BACKTRACKING = 1024;
    }
}

impl PatternOptions {
    /// Convert the raw integer a host attribute carries.
    ///
    /// Negative values keep their two's-complement bits.
    pub fn from_raw(raw: i64) -> Self {
        // Truncation is the intent: the host enum is 32 bits wide.
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "host option enums are 32-bit"
        )]
        let bits = raw as u32;
        PatternOptions::from_bits_retain(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_known_bits() {
        let opts = PatternOptions::from_raw(1 | 16);
        assert!(opts.contains(PatternOptions::IGNORE_CASE));
        assert!(opts.contains(PatternOptions::SINGLELINE));
        assert!(!opts.contains(PatternOptions::MULTILINE));
    }

    #[test]
    fn test_from_raw_retains_unknown_bits() {
        let opts = PatternOptions::from_raw(1 << 20);
        assert_eq!(opts.bits(), 1 << 20);
        assert_ne!(opts, PatternOptions::empty());
    }
}
