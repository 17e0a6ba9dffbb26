//! Expression tree and precedence-climbing parser.
//!
//! The parser accepts exactly the normalized formula grammar: binary `+ -`
//! at the lowest precedence, `* /` above, and calls / parenthesized groups /
//! atoms at the top. There are no unary operators. The only callable
//! functions are the `min`/`max` built-ins; by the time a formula reaches
//! the parser, `avg` and `sum` have been rewritten away.

use crate::error::EvalError;
use crate::expr::normalize::normalize_functions;
use crate::expr::token::{Token, tokenize};
use crate::series::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinFn {
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Label(Label),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: BuiltinFn,
        args: Vec<Expr>,
    },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<(), EvalError> {
        match self.advance() {
            Some(token) if token == *expected => Ok(()),
            Some(token) => Err(EvalError::Syntax(format!(
                "expected {} {context}, found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(EvalError::Syntax(format!(
                "expected {} {context}, found end of expression",
                expected.describe()
            ))),
        }
    }

    fn parse(mut self) -> Result<Expr, EvalError> {
        let expr = self.parse_binary(0)?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(EvalError::Syntax(format!(
                "unexpected {} after expression",
                token.describe()
            ))),
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_atom()?;

        while let Some(op) = self.peek_operator()
            && op.precedence() >= min_precedence
        {
            self.pos += 1;
            let rhs = self.parse_binary(op.precedence() + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn peek_operator(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Label(label)) => Ok(Expr::Label(label)),
            Some(Token::OpenParen) => {
                let inner = self.parse_binary(0)?;
                self.expect(&Token::CloseParen, "to close group")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.parse_call(name),
            Some(token) => Err(EvalError::Syntax(format!(
                "unexpected {}",
                token.describe()
            ))),
            None => Err(EvalError::Syntax("unexpected end of expression".to_string())),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, EvalError> {
        self.expect(&Token::OpenParen, &format!("after \"{name}\""))?;

        let func = match name.as_str() {
            "min" => BuiltinFn::Min,
            "max" => BuiltinFn::Max,
            _ => return Err(EvalError::UnknownFunction(name)),
        };

        let mut args = vec![self.parse_binary(0)?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.parse_binary(0)?);
        }
        self.expect(&Token::CloseParen, "to close argument list")?;

        Ok(Expr::Call { func, args })
    }
}

/// A parsed formula, reusable across any number of evaluations.
///
/// Parsing normalizes aggregate calls, tokenizes against the closed grammar,
/// and builds the expression tree once; [`eval`](FormulaExpr::eval) then
/// walks the tree per binding set. The series aligner relies on this split
/// to parse once and evaluate per timestamp.
///
/// # Example
///
/// ```
/// use derived_metrics::{Bindings, FormulaExpr, Label};
///
/// let expr = FormulaExpr::parse("avg(A,B)").unwrap();
/// let bindings = Bindings::new()
///     .with(Label::new('A').unwrap(), 1.0)
///     .with(Label::new('B').unwrap(), 3.0);
/// assert_eq!(expr.eval(&bindings).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaExpr {
    root: Expr,
    labels: Vec<Label>,
}

impl FormulaExpr {
    /// Normalizes, tokenizes, and parses a formula.
    pub fn parse(formula: &str) -> Result<Self, EvalError> {
        let normalized = normalize_functions(formula);
        let tokens = tokenize(&normalized)?;
        let root = Parser::new(tokens).parse()?;

        let mut labels = Vec::new();
        collect_labels(&root, &mut labels);

        Ok(Self { root, labels })
    }

    /// The labels this formula references, in discovery order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub(crate) fn root(&self) -> &Expr {
        &self.root
    }
}

fn collect_labels(expr: &Expr, out: &mut Vec<Label>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Label(label) => {
            if !out.contains(label) {
                out.push(*label);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            collect_labels(lhs, out);
            collect_labels(rhs, out);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect_labels(arg, out);
            }
        }
    }
}
