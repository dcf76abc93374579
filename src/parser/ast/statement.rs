use std::fmt::Display;

use super::Expression;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expression },
    Return(Expression),
    Expression(Expression),
    Break,
    Continue,
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Return(value) => write!(f, "return {value};"),
            Statement::Expression(expression) => write!(f, "{expression};"),
            Statement::Break => f.write_str("break;"),
            Statement::Continue => f.write_str("continue;"),
        }
    }
}

/// A braced sequence of statements, as used by conditionals, loops and
/// function bodies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        f.write_str("}")
    }
}
