use crate::object::{Env, HashObject, Object};
use crate::parser::ast::{Expression, IndexExpression};

use super::eval_expression;

pub(super) fn eval_index(index: &IndexExpression, env: &Env) -> Object {
    let left = eval_expression(&index.left, env);
    if left.is_error() {
        return left;
    }

    // `e[]`
    if !index.start_set && !index.end_set && !index.stride_set {
        return Object::Error("array-like indexing with empty expression".into());
    }

    match left {
        Object::Array(elements) => eval_array_index(&elements, index, env),
        Object::Hash(hash) => eval_hash_index(&hash, index, env),
        other => Object::Error(format!(
            "index operator not supported: {}",
            other.type_name()
        )),
    }
}

fn eval_array_index(elements: &[Object], index: &IndexExpression, env: &Env) -> Object {
    // `a[k]` without any colon is a plain element access
    if !index.end_set && !index.stride_set {
        let Some(start) = &index.start else {
            unreachable!()
        };
        let key = match eval_index_component(start, env) {
            Ok(key) => key,
            Err(error) => return error,
        };
        return eval_element_access(elements, key);
    }

    let length = elements.len() as i64;

    let stride = match &index.stride {
        Some(stride) => match eval_index_component(stride, env) {
            Ok(stride) => stride,
            Err(error) => return error,
        },
        None => 1,
    };
    if stride == 0 {
        return Object::Error("array-like indexing expecting non-zero stride".into());
    }

    let mut start = match &index.start {
        Some(start) => match eval_index_component(start, env) {
            Ok(start) => start,
            Err(error) => return error,
        },
        None if stride < 0 => length - 1,
        None => 0,
    };
    // an omitted end means "one step past the last index in walking
    // direction"; -length-1 normalizes to the -1 sentinel below
    let mut end = match &index.end {
        Some(end) => match eval_index_component(end, env) {
            Ok(end) => end,
            Err(error) => return error,
        },
        None if stride < 0 => -length - 1,
        None => length,
    };

    // python style normalization and clamping
    if start < 0 {
        start += length;
    }
    if end < 0 {
        end += length;
    }
    if stride > 0 {
        start = start.max(0);
        end = end.min(length);
    } else {
        if start >= length {
            start = length - 1;
        }
        start = start.max(-1);
        end = end.max(-1);
    }

    let mut sliced = vec![];
    let mut i = start;
    while (stride > 0 && i < end) || (stride < 0 && i > end) {
        sliced.push(elements[i as usize].clone());
        i += stride;
    }
    Object::Array(sliced)
}

fn eval_element_access(elements: &[Object], key: i64) -> Object {
    let length = elements.len() as i64;
    if key >= 0 && key < length {
        return elements[key as usize].clone();
    }
    // negative indices count from the back
    if key < 0 && key >= -length {
        return elements[(length + key) as usize].clone();
    }
    Object::Error(format!("index {key} out of array with length {length}"))
}

fn eval_hash_index(hash: &HashObject, index: &IndexExpression, env: &Env) -> Object {
    if index.end_set || index.stride_set {
        return Object::Error("hash indexing expecting a single key".into());
    }
    let Some(start) = &index.start else {
        unreachable!()
    };

    let key = eval_expression(start, env);
    if key.is_error() {
        return key;
    }
    let Some(hash_key) = key.hash_key() else {
        return Object::Error(format!("key type not hashable: {}", key.type_name()));
    };

    match hash.get(&hash_key) {
        Some(pair) => pair.value.clone(),
        None => Object::Null,
    }
}

/// Evaluate one slot of an index expression down to an integer.
fn eval_index_component(expression: &Expression, env: &Env) -> Result<i64, Object> {
    match eval_expression(expression, env) {
        Object::Integer(value) => Ok(value),
        error @ Object::Error(_) => Err(error),
        other => Err(Object::Error(format!(
            "array-like indexing expecting integer index, got {}",
            other.type_name()
        ))),
    }
}
