use std::error::Error;

use log::debug;

use crate::compiler::{Compiler, SymbolTable};
use crate::evaluator;
use crate::lexer::Lexer;
use crate::object::{Env, Environment, Object};
use crate::parser::{ast::Program, Parser};
use crate::vm::{RuntimeError, GLOBALS_SIZE, VM};

/// A back-end for running M source. Implementations keep their session
/// state between calls, so a repl sees earlier definitions.
pub trait Engine {
    /// Evaluate one chunk of source against the session state, yielding
    /// the value of its last statement.
    fn evaluate(&mut self, code: &str) -> Result<Object, Box<dyn Error>>;
}

fn parse(code: &str) -> Result<Program, Box<dyn Error>> {
    let mut parser = Parser::new(Lexer::new(code).lex().into());
    let program = parser.parse();
    if let Some(error) = parser.error() {
        return Err(Box::new(error.clone()));
    }
    Ok(program)
}

/// Tree-walking back-end: one environment for the whole session.
pub struct EvalEngine {
    env: Env,
}

impl EvalEngine {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }
}

impl Default for EvalEngine {
    fn default() -> Self {
        EvalEngine::new()
    }
}

impl Engine for EvalEngine {
    fn evaluate(&mut self, code: &str) -> Result<Object, Box<dyn Error>> {
        let program = parse(code)?;
        match evaluator::eval_program(&program, &self.env) {
            Object::Error(message) => Err(Box::new(RuntimeError(message))),
            result => Ok(result),
        }
    }
}

/// Compile-and-run back-end. The session owns the constant pool, symbol
/// table and globals array; every call compiles against that state and
/// runs a fresh machine over the shared globals.
pub struct VmEngine {
    constants: Vec<Object>,
    symbol_table: SymbolTable,
    globals: Vec<Object>,
}

impl VmEngine {
    pub fn new() -> Self {
        Self {
            constants: vec![],
            symbol_table: SymbolTable::new(),
            globals: vec![Object::Null; GLOBALS_SIZE],
        }
    }
}

impl Default for VmEngine {
    fn default() -> Self {
        VmEngine::new()
    }
}

impl Engine for VmEngine {
    fn evaluate(&mut self, code: &str) -> Result<Object, Box<dyn Error>> {
        let program = parse(code)?;

        let mut compiler =
            Compiler::new_with_state(self.symbol_table.clone(), self.constants.clone());
        compiler.compile(&program)?;

        let bytecode = compiler.bytecode();
        debug!("compiled bytecode:\n{}", bytecode.instructions);
        self.constants = bytecode.constants.clone();
        self.symbol_table = compiler.symbol_table().clone();

        let mut vm = VM::new_with_globals(bytecode, std::mem::take(&mut self.globals));
        let outcome = vm.run();
        let result = vm.last_popped_stack_item();
        self.globals = vm.into_globals();
        outcome?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_engine_keeps_session_state() {
        let mut engine = EvalEngine::new();
        engine.evaluate("let a = 1;").expect("should evaluate");
        let result = engine.evaluate("a + 2").expect("should evaluate");

        assert_eq!(Object::Integer(3), result);
    }

    #[test]
    fn test_vm_engine_keeps_session_state() {
        let mut engine = VmEngine::new();
        engine.evaluate("let one = 1;").expect("should evaluate");
        engine.evaluate("let two = 2;").expect("should evaluate");
        let result = engine.evaluate("one + two").expect("should evaluate");

        assert_eq!(Object::Integer(3), result);
    }

    #[test]
    fn test_parse_errors_prevent_execution() {
        let mut engine = VmEngine::new();
        let error = engine.evaluate("let = 3").expect_err("should fail");
        assert!(error.to_string().contains("expecting token IDENT"));

        let mut engine = EvalEngine::new();
        assert!(engine.evaluate("let = 3").is_err());
    }

    #[test]
    fn test_runtime_errors_are_errors_in_both_engines() {
        let mut eval_engine = EvalEngine::new();
        let error = eval_engine.evaluate("break").expect_err("should fail");
        assert!(error.to_string().contains("break outside loop"));

        let mut vm_engine = VmEngine::new();
        let error = vm_engine.evaluate("1+null").expect_err("should fail");
        assert_eq!("unknown operator: INT+NULL", error.to_string());
    }

    #[test]
    fn test_compile_error_does_not_poison_session() {
        let mut engine = VmEngine::new();
        engine.evaluate("let one = 1;").expect("should evaluate");
        assert!(engine.evaluate("undefined_name").is_err());

        let result = engine.evaluate("one").expect("should evaluate");
        assert_eq!(Object::Integer(1), result);
    }
}
