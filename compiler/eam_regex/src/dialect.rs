//! Translation from the host pattern dialect to `regex-syntax` input.
//!
//! Most host constructs either parse as-is or have a direct spelling:
//!
//! - `\Z` becomes `(?:\n?\z)`
//! - `(?'name'...)` becomes `(?<name>...)`
//! - `(?#...)` comments are dropped
//! - class subtraction `[a-z-[aeiou]]` becomes the set difference
//!   `[[a-z]--[aeiou]]`
//! - `[`, `&` and `~` inside a class are literals, so they are escaped
//!
//! Look-around, atomic groups and backreferences have no spelling at all.
//! Each becomes a named placeholder group whose name indexes
//! [`Translated::constructs`]; lowering swaps the group for the real
//! instructions.

use std::fmt;

use crate::error::PatternError;
use crate::options::PatternOptions;

/// Placeholder group names are this prefix followed by a construct index.
const PLACEHOLDER_PREFIX: &str = "__eam";

/// A backreference target.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum GroupRef {
    Number(usize),
    Name(Box<str>),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Number(number) => write!(f, "{number}"),
            GroupRef::Name(name) => f.write_str(name),
        }
    }
}

/// A construct carried through the parser as a placeholder group.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum Construct {
    /// `(?=..)`, `(?!..)`, `(?<=..)` or `(?<!..)`.
    Look { behind: bool, negate: bool },
    /// `(?>..)`.
    Atomic,
    /// `\1` or `\k<name>`. The placeholder group is empty.
    Backref(GroupRef),
}

/// The construct a placeholder group named `name` stands for.
pub(crate) fn placeholder<'c>(constructs: &'c [Construct], name: &str) -> Option<&'c Construct> {
    let index = name.strip_prefix(PLACEHOLDER_PREFIX)?.parse::<usize>().ok()?;
    constructs.get(index)
}

#[derive(Debug)]
pub(crate) struct Translated {
    pub(crate) text: String,
    pub(crate) constructs: Vec<Construct>,
}

/// Translate `text` for `regex-syntax`.
///
/// Malformed input is mostly passed through so the parser reports it.
pub(crate) fn translate(text: &str, options: PatternOptions) -> Result<Translated, PatternError> {
    let mut translator = Translator {
        src: text.chars().collect(),
        pos: 0,
        out: String::with_capacity(text.len()),
        constructs: Vec::new(),
        extended: options.contains(PatternOptions::IGNORE_PATTERN_WHITESPACE),
    };
    while let Some(c) = translator.bump() {
        match c {
            '\\' => translator.escape(),
            '[' => {
                let class = translator.class()?;
                translator.out.push_str(&class);
            }
            '(' => translator.group()?,
            '#' if translator.extended => translator.line_comment(),
            _ => translator.out.push(c),
        }
    }
    Ok(Translated {
        text: translator.out,
        constructs: translator.constructs,
    })
}

struct Translator {
    src: Vec<char>,
    pos: usize,
    out: String,
    constructs: Vec<Construct>,
    extended: bool,
}

impl Translator {
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.pos += 1;
        }
        found
    }

    /// Text from `pos + offset` up to `close`, consuming both when found.
    fn delimited(&mut self, offset: usize, close: char) -> Option<String> {
        let start = self.pos + offset;
        let len = self.src.get(start..)?.iter().position(|&c| c == close)?;
        let text = self.src[start..start + len].iter().collect();
        self.pos = start + len + 1;
        Some(text)
    }

    fn open_placeholder(&mut self, construct: Construct) {
        let index = self.constructs.len();
        self.constructs.push(construct);
        self.out.push_str("(?<");
        self.out.push_str(PLACEHOLDER_PREFIX);
        self.out.push_str(&index.to_string());
        self.out.push('>');
    }

    fn backref(&mut self, group: GroupRef) {
        self.open_placeholder(Construct::Backref(group));
        self.out.push(')');
    }

    /// After a `\` outside a class.
    fn escape(&mut self) {
        match self.peek() {
            Some('Z') => {
                self.pos += 1;
                self.out.push_str(r"(?:\n?\z)");
            }
            Some('1'..='9') => {
                let digits: String = self.src[self.pos..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                self.pos += digits.len();
                match digits.parse() {
                    Ok(number) => self.backref(GroupRef::Number(number)),
                    Err(_) => {
                        self.out.push('\\');
                        self.out.push_str(&digits);
                    }
                }
            }
            Some('k') if matches!(self.peek_at(1), Some('<' | '\'')) => {
                let close = if self.peek_at(1) == Some('<') { '>' } else { '\'' };
                match self.delimited(2, close) {
                    Some(name) => {
                        let group = match name.parse() {
                            Ok(number) => GroupRef::Number(number),
                            Err(_) => GroupRef::Name(name.into()),
                        };
                        self.backref(group);
                    }
                    None => self.out.push('\\'),
                }
            }
            Some(c) => {
                self.pos += 1;
                self.out.push('\\');
                self.out.push(c);
            }
            None => self.out.push('\\'),
        }
    }

    /// After a `(`.
    fn group(&mut self) -> Result<(), PatternError> {
        if self.peek() != Some('?') {
            self.out.push('(');
            return Ok(());
        }
        let special = match (self.peek_at(1), self.peek_at(2)) {
            (Some('='), _) => Some((2, Construct::Look { behind: false, negate: false })),
            (Some('!'), _) => Some((2, Construct::Look { behind: false, negate: true })),
            (Some('>'), _) => Some((2, Construct::Atomic)),
            (Some('<'), Some('=')) => Some((3, Construct::Look { behind: true, negate: false })),
            (Some('<'), Some('!')) => Some((3, Construct::Look { behind: true, negate: true })),
            _ => None,
        };
        if let Some((len, construct)) = special {
            self.pos += len;
            self.open_placeholder(construct);
            return Ok(());
        }

        match self.peek_at(1) {
            Some('#') => {
                if self.delimited(2, ')').is_none() {
                    return Err(PatternError::Malformed {
                        reason: "unterminated comment",
                    });
                }
            }
            Some('(') => {
                return Err(PatternError::Unsupported {
                    construct: "conditional group",
                })
            }
            Some(open @ ('<' | '\'')) => {
                let close = if open == '<' { '>' } else { '\'' };
                match self.delimited(2, close) {
                    Some(name) if name.contains('-') => {
                        return Err(PatternError::Unsupported {
                            construct: "balancing group",
                        })
                    }
                    Some(name) => {
                        self.out.push_str("(?<");
                        self.out.push_str(&name);
                        self.out.push('>');
                    }
                    None => self.out.push('('),
                }
            }
            _ => self.out.push('('),
        }
        Ok(())
    }

    /// After a `#` in whitespace-insensitive mode; copied verbatim.
    fn line_comment(&mut self) {
        self.out.push('#');
        while let Some(c) = self.bump() {
            self.out.push(c);
            if c == '\n' {
                break;
            }
        }
    }

    /// After a `[`. Returns the translated class, brackets included.
    fn class(&mut self) -> Result<String, PatternError> {
        let negated = self.eat('^');
        let mut body = String::new();
        let mut first = true;
        let mut after_dash = false;

        loop {
            let Some(c) = self.bump() else {
                return Err(PatternError::Malformed {
                    reason: "unterminated character class",
                });
            };
            match c {
                ']' if !first => break,
                ']' => body.push_str(r"\]"),
                '\\' => match self.bump() {
                    // Backspace inside a class.
                    Some('b') => body.push_str(r"\x08"),
                    Some(escaped) => {
                        body.push('\\');
                        body.push(escaped);
                    }
                    None => body.push('\\'),
                },
                '-' if !first && self.peek() == Some('[') => {
                    self.pos += 1;
                    let subtracted = self.class()?;
                    if !self.eat(']') {
                        return Err(PatternError::Malformed {
                            reason: "a subtraction must be the last element of a class",
                        });
                    }
                    let caret = if negated { "^" } else { "" };
                    return Ok(format!("[[{caret}{body}]--{subtracted}]"));
                }
                '-' if after_dash => body.push_str(r"\-"),
                '[' | '&' | '~' => {
                    body.push('\\');
                    body.push(c);
                }
                _ => body.push(c),
            }
            after_dash = c == '-' && !after_dash;
            first = false;
        }

        let caret = if negated { "^" } else { "" };
        Ok(format!("[{caret}{body}]"))
    }
}
