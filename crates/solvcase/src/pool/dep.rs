//! Dependency expressions.
//!
//! [`DepExpr`] is the owned tree form of a dependency. Text is parsed into a
//! tree with [`DepExpr::parse`] and rendered back through `Display`; the pool
//! interns trees into [`DepId`](super::DepId)s.

use std::fmt;

/// Relation operators in their fixed table order.
///
/// The table order matters: prefix lookup for `genid op` walks it front to
/// back, so `<=` must come before `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelOp {
    Eq,
    Compare,
    Le,
    Ge,
    Gt,
    Ne,
    And,
    Or,
    With,
    Without,
    Namespace,
    Arch,
    Multiarch,
    FileConflict,
    Cond,
    Compat,
    Kind,
    Else,
    Error,
    Unless,
    Conda,
    Lt,
}

const REL_GT: u8 = 1;
const REL_EQ: u8 = 2;
const REL_LT: u8 = 4;

const OPS: &[(RelOp, &str)] = &[
    (RelOp::Eq, "="),
    (RelOp::Compare, "<=>"),
    (RelOp::Le, "<="),
    (RelOp::Ge, ">="),
    (RelOp::Gt, ">"),
    (RelOp::Ne, "<>"),
    (RelOp::And, "&"),
    (RelOp::Or, "|"),
    (RelOp::With, "+"),
    (RelOp::Without, "-"),
    (RelOp::Namespace, "<NAMESPACE>"),
    (RelOp::Arch, "."),
    (RelOp::Multiarch, "<MULTIARCH>"),
    (RelOp::FileConflict, "<FILECONFLICT>"),
    (RelOp::Cond, "<IF>"),
    (RelOp::Compat, "compat >="),
    (RelOp::Kind, "<KIND>"),
    (RelOp::Else, "<ELSE>"),
    (RelOp::Error, "<ERROR>"),
    (RelOp::Unless, "<UNLESS>"),
    (RelOp::Conda, "<CONDA>"),
    (RelOp::Lt, "<"),
];

impl RelOp {
    pub fn all() -> impl Iterator<Item = RelOp> {
        OPS.iter().map(|(op, _)| *op)
    }

    pub fn name(self) -> &'static str {
        OPS.iter()
            .find(|(op, _)| *op == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Exact lookup of an operator token
    pub fn from_name(name: &str) -> Option<Self> {
        OPS.iter().find(|(_, n)| *n == name).map(|(op, _)| *op)
    }

    /// First operator (in table order) whose name is a prefix of `text`
    pub fn from_prefix(text: &str) -> Option<Self> {
        OPS.iter()
            .find(|(_, n)| text.starts_with(n))
            .map(|(op, _)| *op)
    }

    /// Version comparison bits (GT=1, EQ=2, LT=4) for relational operators
    pub fn version_mask(self) -> Option<u8> {
        match self {
            RelOp::Gt => Some(REL_GT),
            RelOp::Eq => Some(REL_EQ),
            RelOp::Ge => Some(REL_GT | REL_EQ),
            RelOp::Lt => Some(REL_LT),
            RelOp::Ne => Some(REL_GT | REL_LT),
            RelOp::Le => Some(REL_LT | REL_EQ),
            RelOp::Compare => Some(REL_GT | REL_LT | REL_EQ),
            _ => None,
        }
    }

    /// Boolean combinators that may need parentheses when nested
    pub fn is_complex(self) -> bool {
        matches!(
            self,
            RelOp::And
                | RelOp::Or
                | RelOp::With
                | RelOp::Without
                | RelOp::Cond
                | RelOp::Unless
                | RelOp::Else
        )
    }
}

/// Owned dependency expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepExpr {
    Null,
    Lit(String),
    Rel(Box<DepExpr>, RelOp, Box<DepExpr>),
}

impl DepExpr {
    pub fn lit(s: impl Into<String>) -> Self {
        DepExpr::Lit(s.into())
    }

    pub fn rel(name: DepExpr, op: RelOp, evr: DepExpr) -> Self {
        DepExpr::Rel(Box::new(name), op, Box::new(evr))
    }

    /// Parse dependency text such as `A >= 1.0`, `(A | B) & C` or `perl(Foo)`.
    ///
    /// Complex operators fold to the left; parentheses group. Returns `None`
    /// for empty or unbalanced input.
    pub fn parse(text: &str) -> Option<DepExpr> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return None;
        }
        Some(expr)
    }

    fn is_complex(&self) -> bool {
        matches!(self, DepExpr::Rel(_, op, _) if op.is_complex())
    }
}

impl fmt::Display for DepExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepExpr::Null => f.write_str("<NULL>"),
            DepExpr::Lit(s) => f.write_str(s),
            DepExpr::Rel(name, op, evr) => match op {
                RelOp::Namespace => write!(f, "{}({})", Operand(name), evr),
                RelOp::Arch => write!(f, "{}.{}", Operand(name), Operand(evr)),
                op if op.is_complex() => {
                    let left_same_op = matches!(name.as_ref(), DepExpr::Rel(_, o, _) if o == op);
                    if left_same_op {
                        write!(f, "{}", name)?;
                    } else {
                        write!(f, "{}", Operand(name))?;
                    }
                    write!(f, " {} {}", op.name(), Operand(evr))
                }
                op => write!(f, "{} {} {}", Operand(name), op.name(), Operand(evr)),
            },
        }
    }
}

/// Renders nested complex expressions in parentheses
struct Operand<'a>(&'a DepExpr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_complex() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
}

/// Split on whitespace, peeling grouping parentheses off word edges.
///
/// Parentheses inside a word (`perl(Foo)`) stay part of it.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for mut word in text.split_whitespace() {
        while let Some(rest) = word.strip_prefix('(') {
            tokens.push(Token::Open);
            word = rest;
        }
        let mut depth = 0usize;
        let mut end = word.len();
        for (i, c) in word.char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ')' => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        let closers = word[end..].chars().filter(|&c| c == ')').count();
        if end > 0 {
            tokens.push(Token::Word(word[..end].to_string()));
        }
        tokens.extend(std::iter::repeat(Token::Close).take(closers));
    }
    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek_word(&self) -> Option<&str> {
        match self.tokens.get(self.pos) {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    fn expr(&mut self) -> Option<DepExpr> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek_word().and_then(RelOp::from_name) {
            if !op.is_complex() {
                break;
            }
            self.pos += 1;
            let right = self.unary()?;
            left = DepExpr::rel(left, op, right);
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<DepExpr> {
        match self.tokens.get(self.pos)? {
            Token::Open => {
                self.pos += 1;
                let inner = self.expr()?;
                match self.tokens.get(self.pos) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(inner)
                    }
                    _ => None,
                }
            }
            Token::Close => None,
            Token::Word(_) => self.simple(),
        }
    }

    fn simple(&mut self) -> Option<DepExpr> {
        let name = self.peek_word()?.to_string();
        self.pos += 1;
        let name = DepExpr::Lit(name);

        let op = match self.peek_word() {
            Some("compat") => {
                if self.tokens.get(self.pos + 1) != Some(&Token::Word(">=".to_string())) {
                    return Some(name);
                }
                self.pos += 1;
                Some(RelOp::Compat)
            }
            Some(word) => RelOp::from_name(word).filter(|op| op.version_mask().is_some()),
            None => None,
        };
        let Some(op) = op else {
            return Some(name);
        };
        self.pos += 1;
        let evr = self.peek_word()?.to_string();
        self.pos += 1;
        Some(DepExpr::rel(name, op, DepExpr::Lit(evr)))
    }
}
