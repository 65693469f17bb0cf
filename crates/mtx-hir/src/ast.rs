use crate::def::{ClassDefId, FunctionDefId, FunctionRefId, VariableDefId};
use crate::ident::Ident;
use crate::scope::ScopeId;
use crate::source::{SourceId, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    MatrixTimes,
    RightDivide,
    LeftDivide,
    Power,
    Colon,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOperator {
    /// Recognizes an operator-function name (`plus`, `mtimes`, `eq`, ...)
    /// so class methods with those names also register as operators.
    pub fn from_name(name: &str) -> Option<Self> {
        use BinaryOperator::*;
        match name {
            "plus" => Some(Plus),
            "minus" => Some(Minus),
            "times" => Some(Times),
            "mtimes" => Some(MatrixTimes),
            "rdivide" => Some(RightDivide),
            "ldivide" => Some(LeftDivide),
            "power" => Some(Power),
            "colon" => Some(Colon),
            "eq" => Some(Equal),
            "ne" => Some(NotEqual),
            "lt" => Some(Less),
            "le" => Some(LessEqual),
            "gt" => Some(Greater),
            "ge" => Some(GreaterEqual),
            "and" => Some(And),
            "or" => Some(Or),
            _ => None,
        }
    }

    /// True for operators that compare values and must produce `logical`.
    pub fn is_relational(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Times => ".*",
            MatrixTimes => "*",
            RightDivide => "./",
            LeftDivide => ".\\",
            Power => "^",
            Colon => ":",
            Equal => "==",
            NotEqual => "~=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            And => "&&",
            Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
    Transpose,
}

impl UnaryOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        use UnaryOperator::*;
        match name {
            "uplus" => Some(Plus),
            "uminus" => Some(Minus),
            "not" => Some(Not),
            "transpose" | "ctranspose" => Some(Transpose),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        use UnaryOperator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Not => "~",
            Transpose => "'",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcatenationDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptMethod {
    Parens,
    Brace,
    Period,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMethod {
    Parens,
    Bracket,
    Brace,
}

/// One link in a subscript chain `a(x){y}.z`.
#[derive(Debug, Clone)]
pub struct SubscriptArg {
    pub method: SubscriptMethod,
    pub arguments: Vec<Expr>,
}

impl SubscriptArg {
    pub fn new(method: SubscriptMethod, arguments: Vec<Expr>) -> Self {
        Self { method, arguments }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        token: Token,
    },
    Char {
        token: Token,
    },
    String {
        token: Token,
    },
    /// `.name` with a compile-time constant field name.
    LiteralFieldReference {
        token: Token,
        field: Ident,
    },
    /// `.(expr)` with a computed field name.
    DynamicFieldReference {
        token: Token,
        expr: Box<Expr>,
    },
    /// A bare `:` in subscript position.
    ColonSubscript {
        token: Token,
    },
    VariableReference {
        token: Token,
        def: VariableDefId,
        subscripts: Vec<SubscriptArg>,
    },
    FunctionCall {
        token: Token,
        reference: FunctionRefId,
        args: Vec<Expr>,
    },
    /// `@f`.
    FunctionReference {
        token: Token,
        reference: FunctionRefId,
    },
    /// `@(x, y) expr`.
    AnonymousFunction {
        token: Token,
        scope: ScopeId,
        inputs: Vec<Option<VariableDefId>>,
        body: Box<Expr>,
    },
    BinaryOp {
        token: Token,
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        token: Token,
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Grouping {
        token: Token,
        method: GroupingMethod,
        components: Vec<Expr>,
    },
}

impl Expr {
    pub fn source_token(&self) -> &Token {
        match self {
            Expr::Number { token }
            | Expr::Char { token }
            | Expr::String { token }
            | Expr::LiteralFieldReference { token, .. }
            | Expr::DynamicFieldReference { token, .. }
            | Expr::ColonSubscript { token }
            | Expr::VariableReference { token, .. }
            | Expr::FunctionCall { token, .. }
            | Expr::FunctionReference { token, .. }
            | Expr::AnonymousFunction { token, .. }
            | Expr::BinaryOp { token, .. }
            | Expr::UnaryOp { token, .. }
            | Expr::Grouping { token, .. } => token,
        }
    }

    pub fn is_char_literal(&self) -> bool {
        matches!(self, Expr::Char { .. })
    }

    pub fn is_brace_grouping(&self) -> bool {
        matches!(
            self,
            Expr::Grouping {
                method: GroupingMethod::Brace,
                ..
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct IfBranch {
    pub token: Token,
    pub condition: Expr,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub token: Token,
    pub expr: Expr,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Assignment {
        token: Token,
        to: Expr,
        of: Expr,
    },
    If {
        branches: Vec<IfBranch>,
        else_block: Option<Block>,
    },
    While {
        token: Token,
        condition: Expr,
        body: Block,
    },
    For {
        token: Token,
        loop_variable: VariableDefId,
        expr: Expr,
        body: Block,
    },
    Switch {
        token: Token,
        condition: Expr,
        cases: Vec<SwitchCase>,
        otherwise: Option<Block>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub nodes: Vec<Node>,
}

impl Block {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Stmt(Stmt),
    FunctionDef(FunctionDefNode),
    ClassDef(ClassDefNode),
}

#[derive(Debug, Clone)]
pub struct FunctionDefNode {
    pub def: FunctionDefId,
    pub reference: FunctionRefId,
    pub scope: ScopeId,
    pub body: Option<Block>,
    pub source_token: Token,
}

#[derive(Debug, Clone)]
pub struct PropertyNode {
    pub name: Ident,
    pub initializer: Option<Expr>,
    pub source_token: Token,
}

#[derive(Debug, Clone)]
pub struct ClassDefNode {
    pub def: ClassDefId,
    pub properties: Vec<PropertyNode>,
    pub methods: Vec<FunctionDefNode>,
    pub source_token: Token,
}

/// One checked file: the top scope plus its statement list.
#[derive(Debug, Clone)]
pub struct RootBlock {
    pub scope: ScopeId,
    pub source: Option<SourceId>,
    pub block: Block,
}

impl RootBlock {
    /// The file's top-level function definition, when the file defines one.
    pub fn top_level_function_def(&self) -> Option<&FunctionDefNode> {
        self.block.nodes.iter().find_map(|node| match node {
            Node::FunctionDef(def) => Some(def),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plus", Some(BinaryOperator::Plus))]
    #[case("mtimes", Some(BinaryOperator::MatrixTimes))]
    #[case("rdivide", Some(BinaryOperator::RightDivide))]
    #[case("eq", Some(BinaryOperator::Equal))]
    #[case("le", Some(BinaryOperator::LessEqual))]
    #[case("not_an_operator", None)]
    fn test_binary_operator_from_name(
        #[case] name: &str,
        #[case] expected: Option<BinaryOperator>,
    ) {
        assert_eq!(BinaryOperator::from_name(name), expected);
    }

    #[rstest]
    #[case("uminus", Some(UnaryOperator::Minus))]
    #[case("not", Some(UnaryOperator::Not))]
    #[case("transpose", Some(UnaryOperator::Transpose))]
    #[case("plus", None)]
    fn test_unary_operator_from_name(#[case] name: &str, #[case] expected: Option<UnaryOperator>) {
        assert_eq!(UnaryOperator::from_name(name), expected);
    }

    #[rstest]
    #[case(BinaryOperator::Equal, true)]
    #[case(BinaryOperator::Less, true)]
    #[case(BinaryOperator::Plus, false)]
    #[case(BinaryOperator::And, false)]
    fn test_is_relational(#[case] op: BinaryOperator, #[case] expected: bool) {
        assert_eq!(op.is_relational(), expected);
    }
}
