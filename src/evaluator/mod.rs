mod index;
mod infix;
mod loops;

use std::rc::Rc;

use crate::object::{Builtin, Env, Environment, Function, HashObject, Object};
use crate::parser::ast::{Block, Expression, PrefixOperator, Program, Statement};

/// Sentinel error carrying a `break` to the nearest enclosing loop. If it
/// escapes to the top it reads as the user visible error it is.
pub const BREAK_ERROR: &str = "break outside loop";
/// Sentinel error carrying a `continue`, same mechanism as [`BREAK_ERROR`].
pub const CONTINUE_ERROR: &str = "continue outside loop";

/// Evaluate a whole program. A `return` unwraps here, an error stops
/// evaluation; otherwise the value of the last statement is the result.
pub fn eval_program(program: &Program, env: &Env) -> Object {
    let mut result = Object::Null;

    for statement in &program.statements {
        result = eval_statement(statement, env);
        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Object {
    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name, value.clone());
            value
        }
        Statement::Return(value) => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression(expression) => eval_expression(expression, env),
        Statement::Break => Object::Error(BREAK_ERROR.into()),
        Statement::Continue => Object::Error(CONTINUE_ERROR.into()),
    }
}

/// Evaluate the statements of a block in order. `ReturnValue` and `Error`
/// results short-circuit and bubble up unchanged, so the construct that
/// knows how to consume them gets to see them.
fn eval_block(block: &Block, env: &Env) -> Object {
    let mut result = Object::Null;

    for statement in &block.statements {
        result = eval_statement(statement, env);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_expression(expression: &Expression, env: &Env) -> Object {
    match expression {
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::Integer(value) => Object::Integer(*value as i64),
        Expression::Float(value) => Object::Float(*value),
        Expression::Boolean(value) => Object::Boolean(*value),
        Expression::Str(value) => Object::Str(value.clone()),
        Expression::Null => Object::Null,
        Expression::Prefix { operator, right } => eval_prefix(operator, right, env),
        Expression::Infix {
            operator,
            left,
            right,
        } => infix::eval_infix(operator, left, right, env),
        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if(condition, consequence, alternative.as_ref(), env),
        Expression::Function { parameters, body } => Object::Function(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }),
        Expression::Call {
            function,
            arguments,
        } => eval_call(function, arguments, env),
        Expression::Array(elements) => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(error) => error,
        },
        Expression::Hash(pairs) => eval_hash(pairs, env),
        Expression::Index(index) => index::eval_index(index, env),
        Expression::For {
            init,
            test,
            update,
            body,
        } => loops::eval_for(init.as_deref(), test.as_deref(), update.as_deref(), body, env),
        Expression::While { test, body } => loops::eval_while(test.as_deref(), body, env),
        Expression::DoWhile { test, body } => loops::eval_do_while(test.as_deref(), body, env),
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = Builtin::lookup(name) {
        return Object::Builtin(builtin);
    }
    Object::Error(format!("identifier not found: {name}"))
}

fn eval_prefix(operator: &PrefixOperator, right: &Expression, env: &Env) -> Object {
    let right = eval_expression(right, env);
    if right.is_error() {
        return right;
    }
    match operator {
        PrefixOperator::Bang => Object::Boolean(!right.is_truthy()),
        PrefixOperator::Minus => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            Object::Float(value) => Object::Float(-value),
            Object::Boolean(value) => Object::Boolean(!value),
            other => Object::Error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

/// Condition and taken branch share one freshly enclosed scope, so a `let`
/// inside the branch shadows without leaking into the caller scope.
fn eval_if(
    condition: &Expression,
    consequence: &Block,
    alternative: Option<&Block>,
    env: &Env,
) -> Object {
    let enclosed = Environment::new_enclosed(env);

    let condition = eval_expression(condition, &enclosed);
    if condition.is_error() {
        return condition;
    }
    if condition.is_truthy() {
        return eval_block(consequence, &enclosed);
    }
    if let Some(alternative) = alternative {
        return eval_block(alternative, &enclosed);
    }
    Object::Null
}

fn eval_call(function: &Expression, arguments: &[Expression], env: &Env) -> Object {
    let function = eval_expression(function, env);
    if function.is_error() {
        return function;
    }
    let arguments = match eval_expressions(arguments, env) {
        Ok(arguments) => arguments,
        Err(error) => return error,
    };

    match function {
        Object::Function(function) => {
            let extended = Environment::new_enclosed(&function.env);
            // positional binding; surplus parameters stay unbound and fail
            // as "identifier not found" on first use
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                extended.borrow_mut().set(parameter, argument);
            }
            match eval_block(&function.body, &extended) {
                Object::ReturnValue(value) => *value,
                other => other,
            }
        }
        Object::Builtin(builtin) => builtin.apply(&arguments),
        other => Object::Error(format!("not a function: {}", other.type_name())),
    }
}

/// Evaluate a list of expressions left to right, stopping at the first
/// error.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    let mut results = vec![];
    for expression in expressions {
        let result = eval_expression(expression, env);
        if result.is_error() {
            return Err(result);
        }
        results.push(result);
    }
    Ok(results)
}

fn eval_hash(pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut hash = HashObject::default();

    for (key_expression, value_expression) in pairs {
        // a bare identifier key is taken literally, like `{two: 2}`
        let key = match key_expression {
            Expression::Identifier(name) => Object::Str(name.clone()),
            _ => eval_expression(key_expression, env),
        };
        if key.is_error() {
            return key;
        }
        let Some(hash_key) = key.hash_key() else {
            return Object::Error(format!("key type not hashable: {}", key.type_name()));
        };
        let value = eval_expression(value_expression, env);
        if value.is_error() {
            return value;
        }
        hash.insert(hash_key, key, value);
    }

    Object::Hash(hash)
}

fn is_break(object: &Object) -> bool {
    matches!(object, Object::Error(message) if message == BREAK_ERROR)
}

fn is_continue(object: &Object) -> bool {
    matches!(object, Object::Error(message) if message == CONTINUE_ERROR)
}
