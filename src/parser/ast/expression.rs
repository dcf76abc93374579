use std::fmt::Display;

use super::{Block, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Minus,
    Bang,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PrefixOperator::Minus => "-",
            PrefixOperator::Bang => "!",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,
    Reassign,
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Lte => "<=",
            InfixOperator::Gte => ">=",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
            InfixOperator::Reassign => "=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Integer(u64),
    Float(f64),
    Boolean(bool),
    Str(String),
    Null,
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        parameters: Vec<String>,
        body: Block,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Array(Vec<Expression>),
    Index(IndexExpression),
    /// Key/value pairs in the order they were written. The parser does not
    /// deduplicate keys.
    Hash(Vec<(Expression, Expression)>),
    For {
        init: Option<Box<Statement>>,
        test: Option<Box<Expression>>,
        update: Option<Box<Statement>>,
        body: Block,
    },
    While {
        test: Option<Box<Expression>>,
        body: Block,
    },
    DoWhile {
        test: Option<Box<Expression>>,
        body: Block,
    },
}

/// Index with up to three positional slots, python style: `a[start:end:stride]`.
/// The `*_set` flags record which colons the user actually wrote, so `a[1]`
/// and `a[1:]` stay distinguishable even though both only carry a start.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub start: Option<Box<Expression>>,
    pub start_set: bool,
    pub end: Option<Box<Expression>>,
    pub end_set: bool,
    pub stride: Option<Box<Expression>>,
    pub stride_set: bool,
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Float(value) => write!(f, "{value}"),
            Expression::Boolean(value) => write!(f, "{value}"),
            Expression::Str(value) => f.write_str(value),
            Expression::Null => f.write_str("null"),
            Expression::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left}{operator}{right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if({condition}){consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, "else{alternative}")?;
                }
                Ok(())
            }
            Expression::Function { parameters, body } => {
                write!(f, "fn({}){body}", parameters.join(","))
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| argument.to_string())
                    .collect::<Vec<_>>();
                write!(f, "{function}({})", arguments.join(","))
            }
            Expression::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<_>>();
                write!(f, "[{}]", elements.join(","))
            }
            Expression::Index(index) => write!(f, "{index}"),
            Expression::Hash(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| format!("{key}:{value}"))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(","))
            }
            Expression::For {
                init,
                test,
                update,
                body,
            } => {
                let mut header = String::from("for(");
                match init {
                    Some(init) => header.push_str(&init.to_string()),
                    None => header.push(';'),
                }
                if let Some(test) = test {
                    header.push_str(&test.to_string());
                }
                header.push(';');
                match update {
                    Some(update) => header.push_str(&update.to_string()),
                    None => header.push(';'),
                }
                // the update statement prints its own trailing semicolon
                let header = header.strip_suffix(';').unwrap_or(&header);
                write!(f, "{header}){body}")
            }
            Expression::While { test, body } => {
                f.write_str("while(")?;
                if let Some(test) = test {
                    write!(f, "{test}")?;
                }
                write!(f, "){body}")
            }
            Expression::DoWhile { test, body } => {
                write!(f, "do{body}while(")?;
                if let Some(test) = test {
                    write!(f, "{test}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[", self.left)?;
        if let Some(start) = &self.start {
            write!(f, "{start}")?;
        }
        if self.end_set {
            f.write_str(":")?;
            if let Some(end) = &self.end {
                write!(f, "{end}")?;
            }
        }
        if self.stride_set {
            f.write_str(":")?;
            if let Some(stride) = &self.stride {
                write!(f, "{stride}")?;
            }
        }
        f.write_str("])")
    }
}
