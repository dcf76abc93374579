use crate::parser::ast::InfixOperator;

use super::Object;

/// Apply a binary operator to two runtime values, promoting mixed numeric
/// operands: bool and int promote to int, int and float promote to float.
/// Both execution back-ends route their infix/comparison semantics through
/// here so they cannot drift apart. Type combinations outside the promotion
/// matrix come back as `Object::Error`.
pub fn eval_binary(operator: &InfixOperator, left: &Object, right: &Object) -> Object {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => integer_op(operator, *l, *r),
        (Object::Integer(l), Object::Boolean(r)) => integer_op(operator, *l, bool_to_int(*r)),
        (Object::Integer(l), Object::Float(r)) => float_op(operator, *l as f64, *r),

        (Object::Boolean(l), Object::Integer(r)) => integer_op(operator, bool_to_int(*l), *r),
        (Object::Boolean(l), Object::Boolean(r)) => {
            integer_op(operator, bool_to_int(*l), bool_to_int(*r))
        }
        (Object::Boolean(l), Object::Float(r)) => {
            float_op(operator, bool_to_int(*l) as f64, *r)
        }

        (Object::Float(l), Object::Integer(r)) => float_op(operator, *l, *r as f64),
        (Object::Float(l), Object::Boolean(r)) => {
            float_op(operator, *l, bool_to_int(*r) as f64)
        }
        (Object::Float(l), Object::Float(r)) => float_op(operator, *l, *r),

        (Object::Null, Object::Null) => match operator {
            InfixOperator::Eq | InfixOperator::Lte | InfixOperator::Gte => Object::Boolean(true),
            InfixOperator::NotEq | InfixOperator::Lt | InfixOperator::Gt => Object::Boolean(false),
            _ => unknown_operator(operator, left, right),
        },

        (Object::Str(l), Object::Str(r)) if *operator == InfixOperator::Plus => {
            Object::Str(format!("{l}{r}"))
        }

        _ => unknown_operator(operator, left, right),
    }
}

fn integer_op(operator: &InfixOperator, left: i64, right: i64) -> Object {
    match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Asterisk => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash => Object::Integer(left.wrapping_div(right)),
        InfixOperator::Lt => Object::Boolean(left < right),
        InfixOperator::Gt => Object::Boolean(left > right),
        InfixOperator::Lte => Object::Boolean(left <= right),
        InfixOperator::Gte => Object::Boolean(left >= right),
        InfixOperator::Eq => Object::Boolean(left == right),
        InfixOperator::NotEq => Object::Boolean(left != right),
        InfixOperator::Reassign => {
            unknown_operator(operator, &Object::Integer(left), &Object::Integer(right))
        }
    }
}

fn float_op(operator: &InfixOperator, left: f64, right: f64) -> Object {
    match operator {
        InfixOperator::Plus => Object::Float(left + right),
        InfixOperator::Minus => Object::Float(left - right),
        InfixOperator::Asterisk => Object::Float(left * right),
        InfixOperator::Slash => Object::Float(left / right),
        InfixOperator::Lt => Object::Boolean(left < right),
        InfixOperator::Gt => Object::Boolean(left > right),
        InfixOperator::Lte => Object::Boolean(left <= right),
        InfixOperator::Gte => Object::Boolean(left >= right),
        InfixOperator::Eq => Object::Boolean(left == right),
        InfixOperator::NotEq => Object::Boolean(left != right),
        InfixOperator::Reassign => {
            unknown_operator(operator, &Object::Float(left), &Object::Float(right))
        }
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn unknown_operator(operator: &InfixOperator, left: &Object, right: &Object) -> Object {
    Object::Error(format!(
        "unknown operator: {}{}{}",
        left.type_name(),
        operator,
        right.type_name()
    ))
}
