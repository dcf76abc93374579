mod symbol_table;

pub use symbol_table::*;

use std::{error::Error, fmt::Display};

use crate::code::{make, Instructions, Opcode};
use crate::object::Object;
use crate::parser::ast::{Block, Expression, InfixOperator, PrefixOperator, Program, Statement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError(pub String);

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for CompileError {}

/// Everything the VM needs to run a compiled program.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

/// Walks the AST and emits instructions into a flat buffer, interning
/// literals into the constant pool and binding `let` names to global slots.
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Object>,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
    symbol_table: SymbolTable,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::new_with_state(SymbolTable::new(), vec![])
    }

    /// Start from an existing symbol table and constant pool, so a repl
    /// session sees the definitions of its earlier turns.
    pub fn new_with_state(symbol_table: SymbolTable, constants: Vec<Object>) -> Self {
        Self {
            instructions: Instructions::default(),
            constants,
            last_instruction: None,
            previous_instruction: None,
            symbol_table,
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Expression(expression) => {
                self.compile_expression(expression)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Statement::Let { name, value } => {
                self.compile_expression(value)?;
                let symbol = self.symbol_table.define(name);
                self.emit(Opcode::SetGlobal, &[symbol.index]);
                Ok(())
            }
            other => Err(CompileError(format!(
                "compilation not supported for statement: {other}"
            ))),
        }
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::Integer(value) => {
                let index = self.add_constant(Object::Integer(*value as i64));
                self.emit(Opcode::Constant, &[index]);
            }
            Expression::Float(value) => {
                let index = self.add_constant(Object::Float(*value));
                self.emit(Opcode::Constant, &[index]);
            }
            Expression::Str(value) => {
                let index = self.add_constant(Object::Str(value.clone()));
                self.emit(Opcode::Constant, &[index]);
            }
            Expression::Boolean(true) => {
                self.emit(Opcode::True, &[]);
            }
            Expression::Boolean(false) => {
                self.emit(Opcode::False, &[]);
            }
            Expression::Null => {
                self.emit(Opcode::Null, &[]);
            }
            Expression::Identifier(name) => match self.symbol_table.resolve(name) {
                Some(symbol) => {
                    self.emit(Opcode::GetGlobal, &[symbol.index]);
                }
                None => return Err(CompileError(format!("undefined variable: {name}"))),
            },
            Expression::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator {
                    PrefixOperator::Minus => self.emit(Opcode::Minus, &[]),
                    PrefixOperator::Bang => self.emit(Opcode::Bang, &[]),
                };
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => self.compile_infix(operator, left, right)?,
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.compile_if(condition, consequence, alternative.as_ref())?,
            other => {
                return Err(CompileError(format!(
                    "compilation not supported for expression: {other}"
                )))
            }
        }
        Ok(())
    }

    fn compile_infix(
        &mut self,
        operator: &InfixOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), CompileError> {
        // `<` and `<=` compile by swapping the operands; the machine only
        // knows greater-than
        if matches!(operator, InfixOperator::Lt | InfixOperator::Lte) {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            match operator {
                InfixOperator::Lt => self.emit(Opcode::GreaterThan, &[]),
                _ => self.emit(Opcode::GreaterThanOrEqual, &[]),
            };
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;
        let opcode = match operator {
            InfixOperator::Plus => Opcode::Add,
            InfixOperator::Minus => Opcode::Sub,
            InfixOperator::Asterisk => Opcode::Mul,
            InfixOperator::Slash => Opcode::Div,
            InfixOperator::Gt => Opcode::GreaterThan,
            InfixOperator::Gte => Opcode::GreaterThanOrEqual,
            InfixOperator::Eq => Opcode::Equal,
            InfixOperator::NotEq => Opcode::NotEqual,
            other => return Err(CompileError(format!("unknown operator: {other}"))),
        };
        self.emit(opcode, &[]);
        Ok(())
    }

    /// `if` is an expression, so each branch leaves its value on the stack:
    /// the consequence's trailing pop is removed again, and a missing else
    /// branch becomes a pushed `null`. The two forward jumps are emitted
    /// with placeholder targets and patched once the offsets are known.
    fn compile_if(
        &mut self,
        condition: &Expression,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Result<(), CompileError> {
        self.compile_expression(condition)?;
        let jump_not_truthy_pos = self.emit(Opcode::JumpNotTruthy, &[9999]);

        self.compile_block(consequence)?;
        if self.last_instruction_is(Opcode::Pop) {
            self.remove_last_pop();
        }
        let jump_pos = self.emit(Opcode::Jump, &[9999]);

        self.change_operand(jump_not_truthy_pos, self.instructions.len());
        match alternative {
            None => {
                self.emit(Opcode::Null, &[]);
            }
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }
            }
        }
        self.change_operand(jump_pos, self.instructions.len());

        Ok(())
    }

    /// Add a literal to the constant pool and return its index. Constants
    /// are not deduplicated.
    fn add_constant(&mut self, object: Object) -> usize {
        self.constants.push(object);
        self.constants.len() - 1
    }

    fn emit(&mut self, opcode: Opcode, operands: &[usize]) -> usize {
        let instruction = make(opcode, operands);
        let position = self.add_instruction(instruction);
        self.set_last_instruction(opcode, position);
        position
    }

    fn add_instruction(&mut self, instruction: Vec<u8>) -> usize {
        let position = self.instructions.len();
        self.instructions.0.extend(instruction);
        position
    }

    fn set_last_instruction(&mut self, opcode: Opcode, position: usize) {
        self.previous_instruction = self.last_instruction.take();
        self.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn last_instruction_is(&self, opcode: Opcode) -> bool {
        self.last_instruction
            .map(|last| last.opcode == opcode)
            .unwrap_or(false)
    }

    fn remove_last_pop(&mut self) {
        if let Some(last) = self.last_instruction.take() {
            self.instructions.0.truncate(last.position);
            self.last_instruction = self.previous_instruction.take();
        }
    }

    /// Rewrite the operand of a previously emitted instruction in place.
    /// Used to back-patch forward jump targets.
    fn change_operand(&mut self, position: usize, operand: usize) {
        let Ok(opcode) = Opcode::try_from(self.instructions.0[position]) else {
            unreachable!()
        };
        let instruction = make(opcode, &[operand]);
        self.instructions.0[position..position + instruction.len()]
            .copy_from_slice(&instruction);
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile_source(input: &str) -> Result<Bytecode, CompileError> {
        let mut parser = Parser::new(Lexer::new(input).lex().into());
        let program = parser.parse();
        assert_eq!(None, parser.error(), "input: {input}");

        let mut compiler = Compiler::new();
        compiler.compile(&program)?;
        Ok(compiler.bytecode())
    }

    fn concat(parts: &[Vec<u8>]) -> Instructions {
        Instructions(parts.iter().flatten().copied().collect())
    }

    fn check(tests: &[(&str, Vec<Object>, Vec<Vec<u8>>)]) {
        for (input, constants, instructions) in tests {
            let bytecode = compile_source(input).expect("should compile");
            assert_eq!(
                concat(instructions),
                bytecode.instructions,
                "input: {input}\nwant:\n{}got:\n{}",
                concat(instructions),
                bytecode.instructions,
            );
            assert_eq!(*constants, bytecode.constants, "input: {input}");
        }
    }

    #[test]
    fn test_integer_arithmetic() {
        check(&[
            (
                "1+2",
                vec![Object::Integer(1), Object::Integer(2)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::Add, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "1; 2",
                vec![Object::Integer(1), Object::Integer(2)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Pop, &[]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "-1",
                vec![Object::Integer(1)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Minus, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
        ]);
    }

    #[test]
    fn test_constants_are_not_deduplicated() {
        let bytecode = compile_source("1+1").expect("should compile");
        assert_eq!(
            vec![Object::Integer(1), Object::Integer(1)],
            bytecode.constants
        );
    }

    #[test]
    fn test_boolean_expressions() {
        check(&[
            (
                "true",
                vec![],
                vec![make(Opcode::True, &[]), make(Opcode::Pop, &[])],
            ),
            (
                "!false",
                vec![],
                vec![
                    make(Opcode::False, &[]),
                    make(Opcode::Bang, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "1 > 2",
                vec![Object::Integer(1), Object::Integer(2)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::GreaterThan, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            // `<` swaps its operands instead of having its own opcode
            (
                "1 < 2",
                vec![Object::Integer(2), Object::Integer(1)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::GreaterThan, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "1 <= 2",
                vec![Object::Integer(2), Object::Integer(1)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::GreaterThanOrEqual, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "1 == 2",
                vec![Object::Integer(1), Object::Integer(2)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::Equal, &[]),
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "null",
                vec![],
                vec![make(Opcode::Null, &[]), make(Opcode::Pop, &[])],
            ),
        ]);
    }

    #[test]
    fn test_conditionals() {
        check(&[
            (
                "if (true) { 10 }; 3333;",
                vec![Object::Integer(10), Object::Integer(3333)],
                vec![
                    // 0000
                    make(Opcode::True, &[]),
                    // 0001
                    make(Opcode::JumpNotTruthy, &[10]),
                    // 0004
                    make(Opcode::Constant, &[0]),
                    // 0007
                    make(Opcode::Jump, &[11]),
                    // 0010
                    make(Opcode::Null, &[]),
                    // 0011
                    make(Opcode::Pop, &[]),
                    // 0012
                    make(Opcode::Constant, &[1]),
                    // 0015
                    make(Opcode::Pop, &[]),
                ],
            ),
            (
                "if (true) { 10 } else { 20 }; 3333;",
                vec![
                    Object::Integer(10),
                    Object::Integer(20),
                    Object::Integer(3333),
                ],
                vec![
                    // 0000
                    make(Opcode::True, &[]),
                    // 0001
                    make(Opcode::JumpNotTruthy, &[10]),
                    // 0004
                    make(Opcode::Constant, &[0]),
                    // 0007
                    make(Opcode::Jump, &[13]),
                    // 0010
                    make(Opcode::Constant, &[1]),
                    // 0013
                    make(Opcode::Pop, &[]),
                    // 0014
                    make(Opcode::Constant, &[2]),
                    // 0017
                    make(Opcode::Pop, &[]),
                ],
            ),
        ]);
    }

    #[test]
    fn test_global_let_statements() {
        check(&[
            (
                "let one = 1; let two = 2;",
                vec![Object::Integer(1), Object::Integer(2)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::SetGlobal, &[0]),
                    make(Opcode::Constant, &[1]),
                    make(Opcode::SetGlobal, &[1]),
                ],
            ),
            (
                "let one = 1; one;",
                vec![Object::Integer(1)],
                vec![
                    make(Opcode::Constant, &[0]),
                    make(Opcode::SetGlobal, &[0]),
                    make(Opcode::GetGlobal, &[0]),
                    make(Opcode::Pop, &[]),
                ],
            ),
        ]);
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            Err(CompileError("undefined variable: one".into())),
            compile_source("one").map(|_| ())
        );
    }

    #[test]
    fn test_reassignment_is_an_unknown_operator() {
        assert_eq!(
            Err(CompileError("unknown operator: =".into())),
            compile_source("let a = 1; a = 2;").map(|_| ())
        );
    }

    #[test]
    fn test_unsupported_constructs() {
        for input in ["fn(x){x}", "[1,2]", "{1:2}", "while(true){}", "return 1"] {
            let err = compile_source(input).map(|_| ()).expect_err("should fail");
            assert!(
                err.to_string().contains("compilation not supported"),
                "input: {input}, err: {err}"
            );
        }
    }

    #[test]
    fn test_state_injection_keeps_symbols() {
        let mut parser = Parser::new(Lexer::new("let one = 1;").lex().into());
        let mut compiler = Compiler::new();
        compiler.compile(&parser.parse()).expect("should compile");

        let symbol_table = compiler.symbol_table().clone();
        let constants = compiler.bytecode().constants;

        let mut parser = Parser::new(Lexer::new("one + 2").lex().into());
        let mut next_turn = Compiler::new_with_state(symbol_table, constants);
        next_turn.compile(&parser.parse()).expect("should compile");

        let bytecode = next_turn.bytecode();
        assert_eq!(
            vec![Object::Integer(1), Object::Integer(2)],
            bytecode.constants
        );
        assert_eq!(
            concat(&[
                make(Opcode::GetGlobal, &[0]),
                make(Opcode::Constant, &[1]),
                make(Opcode::Add, &[]),
                make(Opcode::Pop, &[]),
            ]),
            bytecode.instructions
        );
    }
}
