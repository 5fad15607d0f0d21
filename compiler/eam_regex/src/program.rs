//! Backtracking program representation.
//!
//! A compiled pattern is a flat `Vec<Inst>` executed by the matcher in
//! `exec`. Control flow is explicit (`Split`, `Jmp`) so the matcher can
//! drive it with a heap-allocated backtrack stack instead of recursion.

/// A zero-width assertion.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Assertion {
    /// Start of input.
    Start,
    /// End of input.
    End,
    /// Start of a line (`\n` terminated).
    LineStart,
    /// End of a line (`\n` terminated).
    LineEnd,
    /// Start of a line (`\r`, `\n`, or `\r\n` terminated).
    LineStartCrlf,
    /// End of a line (`\r`, `\n`, or `\r\n` terminated).
    LineEndCrlf,
    WordBoundaryAscii,
    NotWordBoundaryAscii,
    WordBoundary,
    NotWordBoundary,
}

impl Assertion {
    /// Check the assertion at `pos` in `input`.
    pub(crate) fn holds(self, input: &[char], pos: usize) -> bool {
        let prev = pos.checked_sub(1).and_then(|i| input.get(i)).copied();
        let next = input.get(pos).copied();
        match self {
            Assertion::Start => prev.is_none(),
            Assertion::End => next.is_none(),
            Assertion::LineStart => matches!(prev, None | Some('\n')),
            Assertion::LineEnd => matches!(next, None | Some('\n')),
            Assertion::LineStartCrlf => match prev {
                None | Some('\n') => true,
                Some('\r') => next != Some('\n'),
                Some(_) => false,
            },
            Assertion::LineEndCrlf => match next {
                None | Some('\r') => true,
                Some('\n') => prev != Some('\r'),
                Some(_) => false,
            },
            Assertion::WordBoundaryAscii => {
                is_word_ascii(prev) != is_word_ascii(next)
            }
            Assertion::NotWordBoundaryAscii => {
                is_word_ascii(prev) == is_word_ascii(next)
            }
            Assertion::WordBoundary => is_word(prev) != is_word(next),
            Assertion::NotWordBoundary => is_word(prev) == is_word(next),
        }
    }
}

fn is_word_ascii(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_word(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// One program instruction.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum Inst {
    /// Consume exactly this character.
    Char(char),
    /// Consume one character inside any of these sorted, disjoint ranges.
    Class(Box<[(char, char)]>),
    /// Zero-width assertion.
    Assert(Assertion),
    /// Try `primary` first; on failure resume at `secondary`.
    Split { primary: usize, secondary: usize },
    Jmp(usize),
    /// Record the current position in a loop slot.
    SetMark(usize),
    /// Fail the thread if the position has not moved since the slot's mark.
    CheckProgress(usize),
    /// Record where a group's current attempt starts.
    OpenGroup(usize),
    /// Commit the group's capture, from its open position to here.
    CloseGroup(usize),
    /// Consume the text the group last captured.
    Backref(usize),
    /// Run the body at the next instruction as a nested attempt, then
    /// continue at `next` without consuming input.
    Look {
        behind: bool,
        negate: bool,
        /// Upper bound on the body's length, for look-behind.
        max_len: Option<usize>,
        next: usize,
    },
    /// Run the body at the next instruction once, then continue at `next`
    /// from where it ended. The body is never re-entered on backtrack.
    Atomic { next: usize },
    /// End of the program or of a nested body. Whether it succeeds depends
    /// on where the current attempt must end.
    Match,
}

/// Whether `c` falls inside one of `ranges` (sorted and disjoint).
pub(crate) fn class_contains(ranges: &[(char, char)], c: char) -> bool {
    ranges
        .binary_search_by(|&(start, end)| {
            if end < c {
                std::cmp::Ordering::Less
            } else if start > c {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// A compiled program plus the bookkeeping the matcher needs.
#[derive(Clone, Debug)]
pub(crate) struct Program {
    pub(crate) insts: Vec<Inst>,
    /// Number of loop slots used by `SetMark` / `CheckProgress`.
    pub(crate) mark_slots: usize,
    /// Capture slots: three per group (open, start, end), or none when
    /// nothing refers back to a group.
    pub(crate) capture_slots: usize,
    /// Backreferences compare case-insensitively.
    pub(crate) ignore_case: bool,
}
