use crate::code::Opcode;
use crate::object::{eval_binary, Object};
use crate::parser::ast::InfixOperator;

use super::{RuntimeError, VM};

impl VM {
    /// Pop the two operands and apply the operator. Arithmetic and
    /// comparison share the evaluator's promotion matrix, so both back-ends
    /// agree down to the error messages.
    pub(super) fn execute_binary_operation(&mut self, opcode: Opcode) -> Result<(), RuntimeError> {
        let right = self.pop();
        let left = self.pop();

        let operator = match opcode {
            Opcode::Add => InfixOperator::Plus,
            Opcode::Sub => InfixOperator::Minus,
            Opcode::Mul => InfixOperator::Asterisk,
            Opcode::Div => InfixOperator::Slash,
            Opcode::Equal => InfixOperator::Eq,
            Opcode::NotEqual => InfixOperator::NotEq,
            Opcode::GreaterThan => InfixOperator::Gt,
            Opcode::GreaterThanOrEqual => InfixOperator::Gte,
            _ => unreachable!(),
        };

        match eval_binary(&operator, &left, &right) {
            Object::Error(message) => Err(RuntimeError(message)),
            result => self.push(result),
        }
    }
}
