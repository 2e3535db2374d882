/// A point in the template: 1-indexed line, 0-indexed column in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    /// Stand-in location for a body that has no statements.
    ///
    /// Line 0 never occurs in real input, so the sentinel cannot be mistaken
    /// for a location.
    pub const NON_EXISTENT: SourceLocation = SourceLocation {
        start: Position { line: 0, column: 0 },
        end: Position { line: 0, column: 0 },
    };

    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_non_existent(&self) -> bool {
        self.start.line == 0
    }
}

/// Whitespace-control markers (`~`) on the two sides of a mustache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StripFlags {
    pub open: bool,
    pub close: bool,
}

impl StripFlags {
    pub fn new(open: bool, close: bool) -> Self {
        Self { open, close }
    }
}

/// A sequence of statements: the whole template or the body of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
    pub block_params: Vec<String>,
    /// Set on the synthetic program that wraps an `{{else if ...}}` block.
    pub chained: bool,
    /// `None` when the body is empty.
    pub loc: Option<SourceLocation>,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        let loc = match (body.first(), body.last()) {
            (Some(first), Some(last)) => Some(SourceLocation::new(first.loc().start, last.loc().end)),
            _ => None,
        };
        Self {
            body,
            block_params: Vec::new(),
            chained: false,
            loc,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Mustache(MustacheStatement),
    Block(BlockStatement),
    Content(ContentStatement),
    Comment(CommentStatement),
    Partial(PartialStatement),
    PartialBlock(PartialBlockStatement),
    /// `{{* decorator}}`
    Decorator(MustacheStatement),
    /// `{{#* decorator}}...{{/decorator}}`
    DecoratorBlock(BlockStatement),
}

impl Statement {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Statement::Mustache(m) | Statement::Decorator(m) => m.loc,
            Statement::Block(b) | Statement::DecoratorBlock(b) => b.loc,
            Statement::Content(c) => c.loc,
            Statement::Comment(c) => c.loc,
            Statement::Partial(p) => p.loc,
            Statement::PartialBlock(p) => p.loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// `false` for `{{{ }}}` and `{{& }}`.
    pub escaped: bool,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub program: Program,
    pub inverse: Option<Program>,
    pub open_strip: StripFlags,
    pub inverse_strip: StripFlags,
    pub close_strip: StripFlags,
    pub loc: SourceLocation,
}

/// Literal template text between mustaches.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentStatement {
    /// Text after whitespace control.
    pub value: String,
    /// Text as written.
    pub original: String,
    pub left_stripped: bool,
    pub right_stripped: bool,
    pub loc: SourceLocation,
}

/// `{{! ... }}` or `{{!-- ... --}}`
#[derive(Debug, Clone, PartialEq)]
pub struct CommentStatement {
    pub value: String,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// Leading indentation of a standalone partial.
    pub indent: String,
    pub strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialBlockStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub program: Program,
    pub open_strip: StripFlags,
    pub close_strip: StripFlags,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Path(PathExpression),
    SubExpression(SubExpression),
    String(StringLiteral),
    Number(NumberLiteral),
    Boolean(BooleanLiteral),
    Undefined(SourceLocation),
    Null(SourceLocation),
}

impl Expression {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Expression::Path(p) => p.loc,
            Expression::SubExpression(s) => s.loc,
            Expression::String(s) => s.loc,
            Expression::Number(n) => n.loc,
            Expression::Boolean(b) => b.loc,
            Expression::Undefined(loc) | Expression::Null(loc) => *loc,
        }
    }

    /// The text a block close must repeat to match this opener.
    pub fn original(&self) -> String {
        match self {
            Expression::Path(p) => p.original.clone(),
            Expression::SubExpression(s) => s.path.original(),
            Expression::String(s) => s.value.clone(),
            Expression::Number(n) => n.original.clone(),
            Expression::Boolean(b) => b.value.to_string(),
            Expression::Undefined(_) => "undefined".to_string(),
            Expression::Null(_) => "null".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// Starts with `@`.
    pub data: bool,
    /// Number of `..` segments.
    pub depth: usize,
    /// Segments with `this`, `.` and `..` removed.
    pub parts: Vec<String>,
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
    pub original: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    pub loc: SourceLocation,
}
