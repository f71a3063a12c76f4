use std::ops::Range;

use log::{debug, trace, warn};

use crate::error::{Jam, Located};
use crate::grammar::{Grammar, Limits};
use crate::idea::{Bind, Idea, List};
use crate::lex::{Lexeme, Lexer, Token};

/// Binding-power parser with unbounded look-ahead.
///
/// There is no token buffer and no fixed grammar: every step scans one
/// lexeme at the cursor, and speculative steps that do not pan out rewind the
/// cursor and the token log to where they started.
///
/// The parser itself only holds its [`Grammar`]; each call to [`Parser::parse`]
/// works on its own state, so a parser can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    grammar: Grammar,
}

/// Everything a parse produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    pub tree: Idea,
    /// Covers the input exactly, in order; see [`Parse::spans`].
    pub tokens: Vec<Token>,
    pub jams: Vec<Located>,
}

impl Parse {
    pub fn spans(&self) -> impl Iterator<Item = (Range<usize>, &Lexeme)> + '_ {
        let starts = std::iter::once(0).chain(self.tokens.iter().map(|token| token.end));
        starts
            .zip(&self.tokens)
            .map(|(start, token)| (start..token.end, &token.lexeme))
    }
}

impl Parser {
    pub fn new(grammar: Grammar) -> Self {
        Parser { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parses `input`; the top level collapses like any group, so `()` is
    /// [`Idea::Empty`] and `(42)` is `42`.
    pub fn parse(&self, input: &str) -> Parse {
        let (root, tokens, jams) = self.run(input);
        Parse {
            tree: root.collapse(),
            tokens,
            jams,
        }
    }

    /// Parses `input` as one line: the tree is always the [`Idea::List`] of
    /// its top-level entries, even when there are none or only one.
    pub fn parse_line(&self, input: &str) -> Parse {
        let (root, tokens, jams) = self.run(input);
        Parse {
            tree: Idea::List(root),
            tokens,
            jams,
        }
    }

    fn run(&self, input: &str) -> (List, Vec<Token>, Vec<Located>) {
        let mut session = Session::new(input, &self.grammar);
        let root = session.root();
        debug!(
            "parsed {} bytes into {} top-level ideas, {} tokens, {} steps",
            input.len(),
            root.len(),
            session.tokens.len(),
            session.steps
        );
        let mut jams = session.jams;
        jams.extend(session.halted);
        (root, session.tokens, jams)
    }
}

/// What a step can hand back to a list collecting its items.
enum Scanned {
    Idea(Idea),
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    byte: usize,
    tokens: usize,
    jams: usize,
}

struct Session<'de, 'g> {
    lexer: Lexer<'de, 'g>,
    limits: Limits,
    byte: usize,
    tokens: Vec<Token>,
    jams: Vec<Located>,
    halted: Option<Located>,
    depth: usize,
    steps: usize,
}

impl<'de, 'g> Session<'de, 'g> {
    fn new(input: &'de str, grammar: &'g Grammar) -> Self {
        Session {
            lexer: Lexer::new(input, grammar),
            limits: grammar.limits(),
            byte: 0,
            tokens: Vec::new(),
            jams: Vec::new(),
            halted: None,
            depth: 0,
            steps: 0,
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            byte: self.byte,
            tokens: self.tokens.len(),
            jams: self.jams.len(),
        }
    }

    fn rewind(&mut self, checkpoint: Checkpoint) {
        trace!("rewind {} -> {}", self.byte, checkpoint.byte);
        self.byte = checkpoint.byte;
        self.tokens.truncate(checkpoint.tokens);
        self.jams.truncate(checkpoint.jams);
    }

    fn log(&mut self, lexeme: Lexeme) {
        self.tokens.push(Token {
            end: self.byte,
            lexeme,
        });
    }

    /// The implicit list of everything on the line. Stops at the end of input
    /// or at a `)` that closes nothing.
    fn root(&mut self) -> List {
        let mut root = List::new();
        loop {
            let checkpoint = self.checkpoint();
            match self.next(Bind::Append) {
                None => break,
                Some(Scanned::Idea(item)) => self.append(&mut root, item, checkpoint.byte),
                Some(Scanned::Close) => {
                    self.rewind(checkpoint);
                    let at = self.skip_space(self.byte);
                    self.jams.push(Located {
                        jam: Jam::UnmatchedClose,
                        span: at..at + 1,
                    });
                    break;
                }
            }
        }
        self.finish();
        root
    }

    /// Logs whatever the loops left behind so the token log reaches the end
    /// of input.
    fn finish(&mut self) {
        let len = self.lexer.whole().len();
        let text = self.skip_space(self.byte);
        if text > self.byte {
            self.byte = text;
            self.log(Lexeme::Space);
        }
        if self.byte < len {
            self.byte = len;
            self.log(Lexeme::Unparsed);
        }
    }

    fn skip_space(&self, from: usize) -> usize {
        let rest = &self.lexer.whole()[from..];
        from + rest.len() - rest.trim_start().len()
    }

    /// Counts a step and a level of depth, or halts the session for good.
    fn enter(&mut self) -> bool {
        if self.halted.is_some() {
            return false;
        }
        self.steps += 1;
        let jam = if self.depth >= self.limits.max_depth {
            Jam::DepthLimit {
                limit: self.limits.max_depth,
            }
        } else if self.steps > self.limits.max_steps {
            Jam::StepLimit {
                limit: self.limits.max_steps,
            }
        } else {
            self.depth += 1;
            return true;
        };
        warn!("parse halted at byte {}: {jam}", self.byte);
        self.halted = Some(Located {
            jam,
            span: self.byte..self.byte,
        });
        false
    }

    /// Scans the next non-space lexeme, logging everything but `)`.
    fn scan(&mut self) -> Option<Lexeme> {
        loop {
            let (end, lexeme) = self.lexer.lexeme_at(self.byte)?;
            self.byte = end;
            match lexeme {
                Lexeme::Space => self.log(Lexeme::Space),
                Lexeme::Close => return Some(Lexeme::Close),
                lexeme => {
                    self.log(lexeme.clone());
                    return Some(lexeme);
                }
            }
        }
    }

    /// Reads one idea with no left neighbour, then lets it grow.
    fn next(&mut self, power: Bind) -> Option<Scanned> {
        if !self.enter() {
            return None;
        }
        let found = self.next_within(power);
        self.depth -= 1;
        found
    }

    fn next_within(&mut self, power: Bind) -> Option<Scanned> {
        let checkpoint = self.checkpoint();
        let idea = match self.scan() {
            Some(Lexeme::Idea(idea)) => idea,
            Some(Lexeme::Open) => Idea::List(List::new()),
            Some(Lexeme::Close) => return Some(Scanned::Close),
            Some(Lexeme::Space | Lexeme::Unparsed) | None => {
                self.rewind(checkpoint);
                return None;
            }
        };
        Some(Scanned::Idea(self.grow(idea, power)))
    }

    /// Look-ahead: does the next lexeme want `left` as its left operand?
    /// On refusal everything is rewound and `left` is handed back.
    fn absorb(&mut self, left: Idea, power: Bind) -> Result<Idea, Idea> {
        if !self.enter() {
            return Err(left);
        }
        let absorbed = self.absorb_within(left, power);
        self.depth -= 1;
        absorbed
    }

    fn absorb_within(&mut self, left: Idea, power: Bind) -> Result<Idea, Idea> {
        let checkpoint = self.checkpoint();
        let mut op = match self.scan() {
            Some(Lexeme::Idea(idea)) if idea.is_operator() && idea.left_power() >= power => idea,
            _ => {
                self.rewind(checkpoint);
                return Err(left);
            }
        };
        if let Err(left) = op.bind_left(left) {
            self.rewind(checkpoint);
            return Err(left);
        }
        if matches!(op, Idea::Label(_)) {
            self.merge_name(checkpoint.tokens, &op);
        }
        Ok(self.grow(op, power))
    }

    /// A label's name is part of the label: its token (and the space after
    /// it) folds into the label's token.
    fn merge_name(&mut self, before: usize, label: &Idea) {
        let Some(name) = before.checked_sub(1) else {
            return;
        };
        let is_word = matches!(
            self.tokens.get(name),
            Some(Token {
                lexeme: Lexeme::Idea(Idea::Word(_)),
                ..
            })
        );
        if !is_word {
            return;
        }
        let last = self.tokens.len() - 1;
        self.tokens.drain(name..last);
        if let Some(token) = self.tokens.last_mut() {
            token.lexeme = Lexeme::Idea(label.clone());
        }
    }

    /// Fills the right slot, gathers group items, then offers the result to
    /// whatever follows.
    fn grow(&mut self, mut idea: Idea, power: Bind) -> Idea {
        if idea.has_open_right() {
            let checkpoint = self.checkpoint();
            match self.next(idea.right_power()) {
                Some(Scanned::Idea(right)) => {
                    if idea.bind_right(right).is_err() {
                        self.rewind(checkpoint);
                    }
                }
                Some(Scanned::Close) | None => self.rewind(checkpoint),
            }
        }
        if let Idea::List(list) = idea {
            idea = self.gather(list);
        }
        match self.absorb(idea, power) {
            Ok(idea) | Err(idea) => idea,
        }
    }

    /// Collects group items up to the matching `)` or the end of input.
    fn gather(&mut self, mut list: List) -> Idea {
        loop {
            let checkpoint = self.checkpoint();
            match self.next(Bind::Append) {
                None => break,
                Some(Scanned::Close) => {
                    self.log(Lexeme::Close);
                    break;
                }
                Some(Scanned::Idea(item)) => self.append(&mut list, item, checkpoint.byte),
            }
        }
        list.collapse()
    }

    fn append(&mut self, list: &mut List, item: Idea, from: usize) {
        if let Some(jam) = list.append(item) {
            let start = self.skip_space(from);
            debug!("{jam} at {start}..{}", self.byte);
            self.jams.push(Located {
                jam,
                span: start..self.byte,
            });
        }
    }
}
