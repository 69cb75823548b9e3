// AST (Abstract Syntax Tree) definitions for the playground script language

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Declaration keyword used to introduce a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
}

impl DeclKind {
    pub fn is_const(self) -> bool {
        matches!(self, DeclKind::Const)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical (short-circuit)
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Await,   // await x
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Declarations
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<AstNode>,
        is_async: bool,
        location: SourceLocation,
    },
    VarDecl {
        kind: DeclKind,
        name: String,
        init: Option<Box<AstNode>>,
        location: SourceLocation,
    },

    // Statements
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    DoWhile {
        body: Vec<AstNode>,
        condition: Box<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Block {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },

    // Expressions
    NumberLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Null {
        location: SourceLocation,
    },
    Undefined {
        location: SourceLocation,
    },
    ArrayLiteral {
        elements: Vec<AstNode>,
        location: SourceLocation,
    },
    Variable(String, SourceLocation),
    Assignment {
        target: Box<AstNode>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    CompoundAssignment {
        target: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    TernaryOp {
        condition: Box<AstNode>,
        true_expr: Box<AstNode>,
        false_expr: Box<AstNode>,
        location: SourceLocation,
    },
    Index {
        object: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
    Member {
        object: Box<AstNode>,
        name: String,
        location: SourceLocation,
    },
    Call {
        callee: Box<AstNode>,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Location of the node, used for error reporting and step tracking
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::NumberLiteral(_, loc)
            | AstNode::StringLiteral(_, loc)
            | AstNode::BoolLiteral(_, loc)
            | AstNode::Variable(_, loc) => *loc,
            AstNode::FunctionDef { location, .. }
            | AstNode::VarDecl { location, .. }
            | AstNode::Return { location, .. }
            | AstNode::If { location, .. }
            | AstNode::While { location, .. }
            | AstNode::DoWhile { location, .. }
            | AstNode::For { location, .. }
            | AstNode::Break { location }
            | AstNode::Continue { location }
            | AstNode::Block { location, .. }
            | AstNode::ExpressionStatement { location, .. }
            | AstNode::Null { location }
            | AstNode::Undefined { location }
            | AstNode::ArrayLiteral { location, .. }
            | AstNode::Assignment { location, .. }
            | AstNode::CompoundAssignment { location, .. }
            | AstNode::BinaryOp { location, .. }
            | AstNode::UnaryOp { location, .. }
            | AstNode::TernaryOp { location, .. }
            | AstNode::Index { location, .. }
            | AstNode::Member { location, .. }
            | AstNode::Call { location, .. } => *location,
        }
    }

    /// Whether the node may appear on the left of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(self, AstNode::Variable(..) | AstNode::Index { .. })
    }
}

/// A parsed script: the statements of the implicit async wrapper body
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub nodes: Vec<AstNode>,
}

impl Program {
    pub fn new() -> Self {
        Program { nodes: Vec::new() }
    }
}
