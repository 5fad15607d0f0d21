//! Lowering from `regex-syntax` HIR to a backtracking [`Program`].

use regex_syntax::hir::{self, Class, Hir, HirKind};
use regex_syntax::ParserBuilder;
use rustc_hash::FxHashMap;

use crate::dialect::{placeholder, translate, Construct, GroupRef};
use crate::error::PatternError;
use crate::options::PatternOptions;
use crate::program::{Assertion, Inst, Program};

/// Upper bound on program size. Counted repetitions are unrolled, so
/// `a{100000}` trips this rather than allocating without limit.
pub(crate) const MAX_PROGRAM_INSTS: usize = 1 << 16;

/// Red zone and growth size for deeply nested patterns.
pub(crate) const RED_ZONE: usize = 100 * 1024;
pub(crate) const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Result of lowering one pattern.
#[derive(Debug)]
pub(crate) struct Lowered {
    pub(crate) program: Program,
    /// Capturing groups, not counting the implicit whole-match group.
    pub(crate) explicit_groups: usize,
}

/// Translate, parse, and lower `text` under `options`.
pub(crate) fn compile(text: &str, options: PatternOptions) -> Result<Lowered, PatternError> {
    let translated = translate(text, options)?;
    let hir = ParserBuilder::new()
        .case_insensitive(options.contains(PatternOptions::IGNORE_CASE))
        .multi_line(options.contains(PatternOptions::MULTILINE))
        .dot_matches_new_line(options.contains(PatternOptions::SINGLELINE))
        .ignore_whitespace(options.contains(PatternOptions::IGNORE_PATTERN_WHITESPACE))
        .build()
        .parse(&translated.text)?;
    lower(&hir, &translated.constructs, options)
}

/// Lower `hir` to a program.
///
/// With `EXPLICIT_CAPTURE`, unnamed groups do not count as captures.
pub(crate) fn lower(
    hir: &Hir,
    constructs: &[Construct],
    options: PatternOptions,
) -> Result<Lowered, PatternError> {
    let groups = hir::visit(
        hir,
        GroupNumbering {
            constructs,
            explicit_capture: options.contains(PatternOptions::EXPLICIT_CAPTURE),
            unnamed: Vec::new(),
            named: Vec::new(),
        },
    )?;
    let track_captures = constructs
        .iter()
        .any(|c| matches!(c, Construct::Backref(_)));
    let mut compiler = Compiler {
        insts: Vec::new(),
        mark_slots: 0,
        constructs,
        groups,
        track_captures,
    };
    compiler.node(hir)?;
    compiler.emit(Inst::Match)?;

    let explicit_groups = compiler.groups.count;
    Ok(Lowered {
        program: Program {
            insts: compiler.insts,
            mark_slots: compiler.mark_slots,
            capture_slots: if track_captures {
                3 * (explicit_groups + 1)
            } else {
                0
            },
            ignore_case: options.contains(PatternOptions::IGNORE_CASE),
        },
        explicit_groups,
    })
}

/// Group numbers, assigned the host's way: unnamed groups first, left to
/// right, then named groups.
struct Groups {
    by_index: FxHashMap<u32, usize>,
    by_name: FxHashMap<Box<str>, usize>,
    count: usize,
}

impl Groups {
    fn resolve(&self, group: &GroupRef) -> Option<usize> {
        match group {
            GroupRef::Number(number) => (1..=self.count).contains(number).then_some(*number),
            GroupRef::Name(name) => self.by_name.get(name).copied(),
        }
    }
}

struct GroupNumbering<'c> {
    constructs: &'c [Construct],
    explicit_capture: bool,
    unnamed: Vec<u32>,
    named: Vec<(u32, Box<str>)>,
}

impl hir::Visitor for GroupNumbering<'_> {
    type Output = Groups;
    type Err = PatternError;

    fn finish(self) -> Result<Groups, PatternError> {
        let mut groups = Groups {
            by_index: FxHashMap::default(),
            by_name: FxHashMap::default(),
            count: 0,
        };
        let unnamed = self.unnamed.into_iter().map(|index| (index, None));
        let named = self
            .named
            .into_iter()
            .map(|(index, name)| (index, Some(name)));
        for (index, name) in unnamed.chain(named) {
            groups.count += 1;
            groups.by_index.insert(index, groups.count);
            if let Some(name) = name {
                groups.by_name.insert(name, groups.count);
            }
        }
        Ok(groups)
    }

    fn visit_pre(&mut self, hir: &Hir) -> Result<(), PatternError> {
        let HirKind::Capture(cap) = hir.kind() else {
            return Ok(());
        };
        match cap.name.as_deref() {
            Some(name) if placeholder(self.constructs, name).is_some() => {}
            Some(name) => self.named.push((cap.index, name.into())),
            None if self.explicit_capture => {}
            None => self.unnamed.push(cap.index),
        }
        Ok(())
    }
}

struct Compiler<'c> {
    insts: Vec<Inst>,
    mark_slots: usize,
    constructs: &'c [Construct],
    groups: Groups,
    /// Emit group bookkeeping only when a backreference needs it.
    track_captures: bool,
}

impl Compiler<'_> {
    fn emit(&mut self, inst: Inst) -> Result<usize, PatternError> {
        if self.insts.len() >= MAX_PROGRAM_INSTS {
            return Err(PatternError::TooLarge {
                limit: MAX_PROGRAM_INSTS,
            });
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn pc(&self) -> usize {
        self.insts.len()
    }

    /// Overwrite a placeholder emitted earlier.
    fn patch(&mut self, at: usize, inst: Inst) {
        if let Some(slot) = self.insts.get_mut(at) {
            *slot = inst;
        }
    }

    fn node(&mut self, hir: &Hir) -> Result<(), PatternError> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || self.node_inner(hir))
    }

    fn node_inner(&mut self, hir: &Hir) -> Result<(), PatternError> {
        match hir.kind() {
            HirKind::Empty => Ok(()),
            HirKind::Literal(hir::Literal(bytes)) => {
                let text = std::str::from_utf8(bytes).map_err(|_| PatternError::Unsupported {
                    construct: "non-UTF-8 literal",
                })?;
                for c in text.chars() {
                    self.emit(Inst::Char(c))?;
                }
                Ok(())
            }
            HirKind::Class(class) => {
                let ranges: Box<[(char, char)]> = match class {
                    Class::Unicode(cls) => cls.ranges().iter().map(|r| (r.start(), r.end())).collect(),
                    Class::Bytes(cls) => cls
                        .ranges()
                        .iter()
                        .map(|r| (char::from(r.start()), char::from(r.end())))
                        .collect(),
                };
                self.emit(Inst::Class(ranges))?;
                Ok(())
            }
            HirKind::Look(look) => {
                self.emit(Inst::Assert(assertion(*look)?))?;
                Ok(())
            }
            HirKind::Repetition(rep) => self.repetition(rep),
            HirKind::Capture(cap) => {
                let constructs = self.constructs;
                if let Some(construct) = cap
                    .name
                    .as_deref()
                    .and_then(|name| placeholder(constructs, name))
                {
                    return self.construct(construct, &cap.sub);
                }
                let number = self
                    .groups
                    .by_index
                    .get(&cap.index)
                    .copied()
                    .filter(|_| self.track_captures);
                if let Some(number) = number {
                    self.emit(Inst::OpenGroup(number))?;
                }
                self.node(&cap.sub)?;
                if let Some(number) = number {
                    self.emit(Inst::CloseGroup(number))?;
                }
                Ok(())
            }
            HirKind::Concat(subs) => {
                for sub in subs {
                    self.node(sub)?;
                }
                Ok(())
            }
            HirKind::Alternation(alts) => self.alternation(alts),
        }
    }

    fn construct(&mut self, construct: &Construct, sub: &Hir) -> Result<(), PatternError> {
        match construct {
            Construct::Backref(group) => {
                let Some(number) = self.groups.resolve(group) else {
                    return Err(PatternError::UndefinedGroup {
                        group: group.to_string(),
                    });
                };
                self.emit(Inst::Backref(number))?;
                Ok(())
            }
            &Construct::Look { behind, negate } => {
                // A backreference placeholder reads as empty to the parser.
                let max_len = if behind && !self.track_captures {
                    sub.properties().maximum_len()
                } else {
                    None
                };
                self.nested(sub, |next| Inst::Look {
                    behind,
                    negate,
                    max_len,
                    next,
                })
            }
            Construct::Atomic => self.nested(sub, |next| Inst::Atomic { next }),
        }
    }

    /// Placeholders hide zero-width look-around bodies from the parser's
    /// length analysis, so any pattern using them is treated as nullable.
    fn may_match_empty(&self, hir: &Hir) -> bool {
        hir.properties().minimum_len() == Some(0) || !self.constructs.is_empty()
    }

    /// ```text
    ///       Look/Atomic { next }
    ///       body
    ///       Match
    /// next:
    /// ```
    fn nested(&mut self, sub: &Hir, head: impl FnOnce(usize) -> Inst) -> Result<(), PatternError> {
        let at = self.emit(Inst::Jmp(0))?;
        self.node(sub)?;
        self.emit(Inst::Match)?;
        let next = self.pc();
        self.patch(at, head(next));
        Ok(())
    }

    /// ```text
    ///     Split(a1, L2)
    ///     a1
    ///     Jmp end
    /// L2: Split(a2, L3)
    ///     ...
    ///     an
    /// end:
    /// ```
    fn alternation(&mut self, alts: &[Hir]) -> Result<(), PatternError> {
        let Some((last, init)) = alts.split_last() else {
            return Ok(());
        };
        let mut exits = Vec::with_capacity(init.len());
        for alt in init {
            let split = self.emit(Inst::Jmp(0))?;
            self.node(alt)?;
            exits.push(self.emit(Inst::Jmp(0))?);
            let next = self.pc();
            self.patch(
                split,
                Inst::Split {
                    primary: split + 1,
                    secondary: next,
                },
            );
        }
        self.node(last)?;
        let end = self.pc();
        for exit in exits {
            self.patch(exit, Inst::Jmp(end));
        }
        Ok(())
    }

    fn repetition(&mut self, rep: &hir::Repetition) -> Result<(), PatternError> {
        for _ in 0..rep.min {
            self.node(&rep.sub)?;
        }

        match rep.max {
            // Nested optionals: skipping one copy skips every later copy.
            Some(max) => {
                let mut skips = Vec::new();
                for _ in rep.min..max {
                    skips.push(self.emit(Inst::Jmp(0))?);
                    self.node(&rep.sub)?;
                }
                let end = self.pc();
                for split in skips {
                    self.patch(split, split_inst(rep.greedy, split + 1, end));
                }
                Ok(())
            }
            None => {
                let head = self.emit(Inst::Jmp(0))?;
                // A body that can match empty needs a progress check or
                // the loop would spin without consuming input.
                let guard = if self.may_match_empty(&rep.sub) {
                    let slot = self.mark_slots;
                    self.mark_slots += 1;
                    self.emit(Inst::SetMark(slot))?;
                    Some(slot)
                } else {
                    None
                };
                self.node(&rep.sub)?;
                if let Some(slot) = guard {
                    self.emit(Inst::CheckProgress(slot))?;
                }
                self.emit(Inst::Jmp(head))?;
                let end = self.pc();
                self.patch(head, split_inst(rep.greedy, head + 1, end));
                Ok(())
            }
        }
    }
}

/// Greedy repetitions prefer the body; lazy ones prefer the exit.
fn split_inst(greedy: bool, body: usize, exit: usize) -> Inst {
    if greedy {
        Inst::Split {
            primary: body,
            secondary: exit,
        }
    } else {
        Inst::Split {
            primary: exit,
            secondary: body,
        }
    }
}

fn assertion(look: hir::Look) -> Result<Assertion, PatternError> {
    use hir::Look;
    Ok(match look {
        Look::Start => Assertion::Start,
        Look::End => Assertion::End,
        Look::StartLF => Assertion::LineStart,
        Look::EndLF => Assertion::LineEnd,
        Look::StartCRLF => Assertion::LineStartCrlf,
        Look::EndCRLF => Assertion::LineEndCrlf,
        Look::WordAscii => Assertion::WordBoundaryAscii,
        Look::WordAsciiNegate => Assertion::NotWordBoundaryAscii,
        Look::WordUnicode => Assertion::WordBoundary,
        Look::WordUnicodeNegate => Assertion::NotWordBoundary,
        _ => {
            return Err(PatternError::Unsupported {
                construct: "half word-boundary assertion",
            })
        }
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
