//! Budgeted backtracking execution.
//!
//! The matcher explores the program depth-first with an explicit stack, so
//! pathological patterns cost time rather than native stack. Elapsed time
//! is checked every [`CHECK_INTERVAL`] steps against a deadline; exceeding
//! it, or growing the backtrack stacks past [`MAX_BACKTRACK_FRAMES`],
//! aborts with [`MatchError::Timeout`].
//!
//! Look-around and atomic bodies run as nested attempts with their own
//! stack. Steps and frames are counted across every nesting level.

use std::time::{Duration, Instant};

use crate::compile::{RED_ZONE, STACK_PER_RECURSION};
use crate::error::MatchError;
use crate::program::{class_contains, Inst, Program};

/// Steps between deadline checks.
const CHECK_INTERVAL: u64 = 256;

/// Backtrack frames live at once; past this the attempt is abandoned.
const MAX_BACKTRACK_FRAMES: usize = 1 << 18;

enum Frame {
    /// Resume a thread at `pc` with the input at `pos`.
    Resume { pc: usize, pos: usize },
    /// Undo a `SetMark` while unwinding.
    RestoreMark { slot: usize, old: Option<usize> },
    /// Undo one capture slot write while unwinding.
    RestoreCapture { slot: usize, old: Option<usize> },
    /// Undo every capture a nested attempt kept.
    RestoreCaptures(Box<[Option<usize>]>),
}

/// Where an attempt has to end to succeed.
#[derive(Copy, Clone)]
enum Goal {
    Anywhere,
    At(usize),
}

/// Run `program` anchored at both ends of `input`.
pub(crate) fn full_match(
    program: &Program,
    input: &str,
    budget: Duration,
) -> Result<bool, MatchError> {
    let mut matcher = Matcher {
        program,
        input: input.chars().collect(),
        marks: vec![None; program.mark_slots],
        captures: vec![None; program.capture_slots],
        frames: 0,
        steps: 0,
        started: Instant::now(),
        budget,
    };
    let end = matcher.input.len();
    Ok(matcher.attempt(0, 0, Goal::At(end))?.is_some())
}

struct Matcher<'p> {
    program: &'p Program,
    input: Vec<char>,
    marks: Vec<Option<usize>>,
    captures: Vec<Option<usize>>,
    /// Frames live across every nested attempt.
    frames: usize,
    steps: u64,
    started: Instant,
    budget: Duration,
}

impl Matcher<'_> {
    /// Run from `pc` at `pos`; the end position of the first success.
    fn attempt(&mut self, pc: usize, pos: usize, goal: Goal) -> Result<Option<usize>, MatchError> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            let base = self.frames;
            let mut stack = Vec::new();
            let result = self
                .push(&mut stack, Frame::Resume { pc, pos })
                .and_then(|()| self.explore(&mut stack, goal));
            self.frames = base;
            result
        })
    }

    fn explore(&mut self, stack: &mut Vec<Frame>, goal: Goal) -> Result<Option<usize>, MatchError> {
        let program = self.program;
        while let Some(frame) = stack.pop() {
            self.frames = self.frames.saturating_sub(1);
            let (mut pc, mut pos) = match frame {
                Frame::Resume { pc, pos } => (pc, pos),
                Frame::RestoreMark { slot, old } => {
                    if let Some(mark) = self.marks.get_mut(slot) {
                        *mark = old;
                    }
                    continue;
                }
                Frame::RestoreCapture { slot, old } => {
                    if let Some(capture) = self.captures.get_mut(slot) {
                        *capture = old;
                    }
                    continue;
                }
                Frame::RestoreCaptures(saved) => {
                    self.captures = saved.into_vec();
                    continue;
                }
            };

            loop {
                self.tick()?;
                let Some(inst) = program.insts.get(pc) else {
                    break;
                };
                match inst {
                    Inst::Char(expected) => {
                        if self.input.get(pos) != Some(expected) {
                            break;
                        }
                        pc += 1;
                        pos += 1;
                    }
                    Inst::Class(ranges) => match self.input.get(pos) {
                        Some(&c) if class_contains(ranges, c) => {
                            pc += 1;
                            pos += 1;
                        }
                        _ => break,
                    },
                    Inst::Assert(assertion) => {
                        if !assertion.holds(&self.input, pos) {
                            break;
                        }
                        pc += 1;
                    }
                    Inst::Split { primary, secondary } => {
                        self.push(
                            stack,
                            Frame::Resume {
                                pc: *secondary,
                                pos,
                            },
                        )?;
                        pc = *primary;
                    }
                    Inst::Jmp(target) => pc = *target,
                    Inst::SetMark(slot) => {
                        let Some(old) = self.marks.get(*slot).copied() else {
                            break;
                        };
                        self.push(stack, Frame::RestoreMark { slot: *slot, old })?;
                        self.marks[*slot] = Some(pos);
                        pc += 1;
                    }
                    Inst::CheckProgress(slot) => {
                        if self.marks.get(*slot).copied().flatten() == Some(pos) {
                            break;
                        }
                        pc += 1;
                    }
                    Inst::OpenGroup(group) => {
                        self.set_capture(stack, 3 * group, Some(pos))?;
                        pc += 1;
                    }
                    Inst::CloseGroup(group) => {
                        let open = self.captures.get(3 * group).copied().flatten();
                        self.set_capture(stack, 3 * group + 1, open)?;
                        self.set_capture(stack, 3 * group + 2, Some(pos))?;
                        pc += 1;
                    }
                    Inst::Backref(group) => {
                        let Some(len) = self.backref(*group, pos) else {
                            break;
                        };
                        pc += 1;
                        pos += len;
                    }
                    Inst::Look {
                        behind,
                        negate,
                        max_len,
                        next,
                    } => {
                        let saved: Box<[Option<usize>]> = self.captures.as_slice().into();
                        let found = if *behind {
                            self.look_behind(pc + 1, pos, *max_len)?
                        } else {
                            self.attempt(pc + 1, pos, Goal::Anywhere)?.is_some()
                        };
                        if found == *negate {
                            self.captures = saved.into_vec();
                            break;
                        }
                        self.keep_captures(stack, saved)?;
                        pc = *next;
                    }
                    Inst::Atomic { next } => {
                        let saved: Box<[Option<usize>]> = self.captures.as_slice().into();
                        let Some(end) = self.attempt(pc + 1, pos, Goal::Anywhere)? else {
                            break;
                        };
                        self.keep_captures(stack, saved)?;
                        pc = *next;
                        pos = end;
                    }
                    Inst::Match => match goal {
                        Goal::At(end) if pos != end => break,
                        Goal::At(_) | Goal::Anywhere => return Ok(Some(pos)),
                    },
                }
            }
        }

        Ok(None)
    }

    fn tick(&mut self) -> Result<(), MatchError> {
        self.steps += 1;
        if self.steps % CHECK_INTERVAL == 0 && self.started.elapsed() >= self.budget {
            tracing::debug!(steps = self.steps, budget = ?self.budget, "match budget exhausted");
            return Err(MatchError::Timeout {
                budget: self.budget,
            });
        }
        Ok(())
    }

    fn push(&mut self, stack: &mut Vec<Frame>, frame: Frame) -> Result<(), MatchError> {
        if self.frames >= MAX_BACKTRACK_FRAMES {
            tracing::debug!(steps = self.steps, "backtrack stack exhausted");
            return Err(MatchError::Timeout {
                budget: self.budget,
            });
        }
        self.frames += 1;
        stack.push(frame);
        Ok(())
    }

    fn set_capture(
        &mut self,
        stack: &mut Vec<Frame>,
        slot: usize,
        value: Option<usize>,
    ) -> Result<(), MatchError> {
        let Some(old) = self.captures.get(slot).copied() else {
            return Ok(());
        };
        self.push(stack, Frame::RestoreCapture { slot, old })?;
        self.captures[slot] = value;
        Ok(())
    }

    /// A nested attempt succeeded and its captures stand; undo them if the
    /// outer attempt backtracks past this point.
    fn keep_captures(
        &mut self,
        stack: &mut Vec<Frame>,
        saved: Box<[Option<usize>]>,
    ) -> Result<(), MatchError> {
        if *saved == *self.captures {
            return Ok(());
        }
        self.push(stack, Frame::RestoreCaptures(saved))
    }

    /// Whether the body at `body` matches some input ending exactly at `pos`.
    fn look_behind(
        &mut self,
        body: usize,
        pos: usize,
        max_len: Option<usize>,
    ) -> Result<bool, MatchError> {
        // `max_len` counts UTF-8 bytes, which bounds the char count.
        let earliest = max_len.map_or(0, |len| pos.saturating_sub(len));
        for start in (earliest..=pos).rev() {
            if self.attempt(body, start, Goal::At(pos))?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Length consumed when the group's last capture repeats at `pos`.
    fn backref(&self, group: usize, pos: usize) -> Option<usize> {
        let start = self.captures.get(3 * group + 1).copied().flatten()?;
        let end = self.captures.get(3 * group + 2).copied().flatten()?;
        let captured = self.input.get(start..end)?;
        let candidate = self.input.get(pos..pos + captured.len())?;
        let ignore_case = self.program.ignore_case;
        captured
            .iter()
            .zip(candidate)
            .all(|(&a, &b)| same_char(a, b, ignore_case))
            .then_some(captured.len())
    }
}

fn same_char(a: char, b: char, ignore_case: bool) -> bool {
    a == b || (ignore_case && a.to_lowercase().eq(b.to_lowercase()))
}
