use crate::object::{Env, Environment, Object};
use crate::parser::ast::{Block, Expression, Statement};

use super::{eval_block, eval_expression, eval_statement, is_break, is_continue};

/// `for (init?; test?; update?) body`. The whole construct runs inside one
/// enclosed scope, so variables declared by the init statement or the body
/// stay confined to the loop. The result is the value of the last body run
/// that completed normally, `null` if none did.
pub(super) fn eval_for(
    init: Option<&Statement>,
    test: Option<&Expression>,
    update: Option<&Statement>,
    body: &Block,
    env: &Env,
) -> Object {
    let enclosed = Environment::new_enclosed(env);

    if let Some(init) = init {
        let init = eval_statement(init, &enclosed);
        if init.is_error() {
            return init;
        }
    }

    let mut body_value = Object::Null;
    loop {
        if let Some(test) = test {
            let test = eval_expression(test, &enclosed);
            if test.is_error() {
                return test;
            }
            if !test.is_truthy() {
                break;
            }
        }

        let result = eval_block(body, &enclosed);
        if is_break(&result) {
            break;
        }
        if is_continue(&result) {
            // continue skips the update statement
            continue;
        }
        if result.is_error() {
            return result;
        }
        body_value = result;

        if let Some(update) = update {
            let update = eval_statement(update, &enclosed);
            if update.is_error() {
                return update;
            }
        }
    }

    body_value
}

/// `while (test?) body`; an omitted test never fails, so only `break` (or
/// an error) leaves the loop.
pub(super) fn eval_while(test: Option<&Expression>, body: &Block, env: &Env) -> Object {
    let enclosed = Environment::new_enclosed(env);

    let mut body_value = Object::Null;
    loop {
        if let Some(test) = test {
            let test = eval_expression(test, &enclosed);
            if test.is_error() {
                return test;
            }
            if !test.is_truthy() {
                break;
            }
        }

        let result = eval_block(body, &enclosed);
        if is_break(&result) {
            break;
        }
        if is_continue(&result) {
            continue;
        }
        if result.is_error() {
            return result;
        }
        body_value = result;
    }

    body_value
}

/// `do body while (test?)`: the body runs at least once.
pub(super) fn eval_do_while(test: Option<&Expression>, body: &Block, env: &Env) -> Object {
    let enclosed = Environment::new_enclosed(env);

    let mut body_value = Object::Null;
    loop {
        let result = eval_block(body, &enclosed);
        if is_break(&result) {
            break;
        }
        if is_continue(&result) {
            continue;
        }
        if result.is_error() {
            return result;
        }
        body_value = result;

        if let Some(test) = test {
            let test = eval_expression(test, &enclosed);
            if test.is_error() {
                return test;
            }
            if !test.is_truthy() {
                break;
            }
        }
    }

    body_value
}
