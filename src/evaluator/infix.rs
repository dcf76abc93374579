use crate::object::{eval_binary, Env, Object};
use crate::parser::ast::{Expression, InfixOperator};

use super::eval_expression;

pub(super) fn eval_infix(
    operator: &InfixOperator,
    left: &Expression,
    right: &Expression,
    env: &Env,
) -> Object {
    if *operator == InfixOperator::Reassign {
        return eval_reassign(left, right, env);
    }

    let left = eval_expression(left, env);
    if left.is_error() {
        return left;
    }
    let right = eval_expression(right, env);
    if right.is_error() {
        return right;
    }

    eval_binary(operator, &left, &right)
}

/// `<IDENT> = <EXPR>`: rebind at the nearest scope that defines the name.
/// The right hand side is only evaluated once the target is known to exist.
fn eval_reassign(left: &Expression, right: &Expression, env: &Env) -> Object {
    let Expression::Identifier(name) = left else {
        return Object::Error(format!(
            "cannot assign to values other than identifier: got={left}"
        ));
    };
    if env.borrow().get(name).is_none() {
        return Object::Error("cannot assign to undefined identifier".into());
    }

    let value = eval_expression(right, env);
    if value.is_error() {
        return value;
    }
    env.borrow_mut().reassign(name, value.clone());
    value
}
