use std::cmp::Ordering;

use super::EvaluationContext;
use crate::{Error, Type, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    /// `#name`
    Variable(String),
    /// `name`, resolved against the context's root object
    Property(String),
    /// `#name(args...)`
    Function(String, Vec<Node>),
    Index(Box<Node>, Box<Node>),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Ternary(Box<Node>, Box<Node>, Box<Node>),
    Elvis(Box<Node>, Box<Node>),
}

pub(crate) fn null() -> Value {
    Value::Null(Type::String)
}

impl Node {
    pub(crate) fn evaluate(&self, context: &dyn EvaluationContext) -> Result<Value, Error> {
        match self {
            Node::Literal(value) => Ok(value.clone()),
            Node::Variable(name) => context.variable(name).ok_or_else(|| {
                Error::Evaluation(format!("variable '#{}' cannot be resolved", name))
            }),
            Node::Property(name) => context.property(name).ok_or_else(|| {
                Error::Evaluation(format!("property '{}' cannot be resolved", name))
            }),
            Node::Function(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<Result<Vec<Value>, Error>>()?;
                context.call_function(name, &args)
            }
            Node::Index(target, index) => {
                let target = target.evaluate(context)?;
                let index = index.evaluate(context)?;
                index_into(target, index)
            }
            Node::Unary(UnaryOp::Not, operand) => match operand.evaluate(context)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(type_error("!", &other)),
            },
            Node::Unary(UnaryOp::Neg, operand) => match operand.evaluate(context)? {
                Value::Int64(i) => i
                    .checked_neg()
                    .map(Value::Int64)
                    .ok_or_else(|| Error::Evaluation(format!("overflow negating {}", i))),
                Value::Float64(f) => Ok(Value::Float64(-f)),
                other => Err(type_error("-", &other)),
            },
            Node::Binary(BinaryOp::And, lhs, rhs) => {
                if as_bool("&&", lhs.evaluate(context)?)? {
                    rhs.evaluate(context).and_then(|v| as_bool("&&", v)).map(Value::Bool)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Node::Binary(BinaryOp::Or, lhs, rhs) => {
                if as_bool("||", lhs.evaluate(context)?)? {
                    Ok(Value::Bool(true))
                } else {
                    rhs.evaluate(context).and_then(|v| as_bool("||", v)).map(Value::Bool)
                }
            }
            Node::Binary(op, lhs, rhs) => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                binary(*op, lhs, rhs)
            }
            Node::Ternary(condition, then, otherwise) => {
                if as_bool("?", condition.evaluate(context)?)? {
                    then.evaluate(context)
                } else {
                    otherwise.evaluate(context)
                }
            }
            Node::Elvis(value, fallback) => match value.evaluate(context)? {
                Value::Null(_) => fallback.evaluate(context),
                Value::String(s) if s.is_empty() => fallback.evaluate(context),
                present => Ok(present),
            },
        }
    }
}

fn type_error(op: &str, value: &Value) -> Error {
    Error::Evaluation(format!(
        "operator '{}' cannot be applied to a value of type {}",
        op,
        value.spanner_type()
    ))
}

fn as_bool(op: &str, value: Value) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(type_error(op, &other)),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int64(i) => Some(*i as f64),
        Value::Float64(f) => Some(*f),
        _ => None,
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match op {
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(lhs.try_to_text()? + &rhs.try_to_text()?))
            }
            (Value::Int64(a), Value::Int64(b)) => a
                .checked_add(*b)
                .map(Value::Int64)
                .ok_or_else(|| Error::Evaluation(format!("overflow adding {} and {}", a, b))),
            _ => arithmetic("+", &lhs, &rhs, |a, b| a + b),
        },
        BinaryOp::Sub => match (&lhs, &rhs) {
            (Value::Int64(a), Value::Int64(b)) => a
                .checked_sub(*b)
                .map(Value::Int64)
                .ok_or_else(|| Error::Evaluation(format!("overflow subtracting {} from {}", b, a))),
            _ => arithmetic("-", &lhs, &rhs, |a, b| a - b),
        },
        BinaryOp::Eq => Ok(Value::Bool(equals(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!equals(&lhs, &rhs))),
        BinaryOp::Lt => compare("<", &lhs, &rhs).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::Le => compare("<=", &lhs, &rhs).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Gt => compare(">", &lhs, &rhs).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Ge => compare(">=", &lhs, &rhs).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit"),
    }
}

fn arithmetic(op: &str, lhs: &Value, rhs: &Value, f: fn(f64, f64) -> f64) -> Result<Value, Error> {
    match (as_f64(lhs), as_f64(rhs)) {
        (Some(a), Some(b)) => Ok(Value::Float64(f(a, b))),
        (None, _) => Err(type_error(op, lhs)),
        (_, None) => Err(type_error(op, rhs)),
    }
}

fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null(_), Value::Null(_)) => true,
        (Value::Int64(_), Value::Float64(_)) | (Value::Float64(_), Value::Int64(_)) => {
            as_f64(lhs) == as_f64(rhs)
        }
        _ => lhs == rhs,
    }
}

fn compare(op: &str, lhs: &Value, rhs: &Value) -> Result<Ordering, Error> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Ok(a.cmp(b)),
        _ => match (as_f64(lhs), as_f64(rhs)) {
            (Some(a), Some(b)) => a
                .partial_cmp(&b)
                .ok_or_else(|| Error::Evaluation(format!("cannot compare {} with {}", a, b))),
            (None, _) => Err(type_error(op, lhs)),
            (_, None) => Err(type_error(op, rhs)),
        },
    }
}

fn index_into(target: Value, index: Value) -> Result<Value, Error> {
    let out_of_bounds =
        |idx: i64, len: usize| Error::Evaluation(format!("index {} out of bounds for length {}", idx, len));
    match (target, index) {
        (Value::Array(_, values), Value::Int64(idx)) => {
            let len = values.len();
            usize::try_from(idx)
                .ok()
                .and_then(|i| values.into_iter().nth(i))
                .ok_or_else(|| out_of_bounds(idx, len))
        }
        (Value::String(s), Value::Int64(idx)) => usize::try_from(idx)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .ok_or_else(|| out_of_bounds(idx, s.chars().count())),
        (Value::Struct(strct), Value::String(field)) => strct
            .get(&field)
            .cloned()
            .ok_or_else(|| Error::Evaluation(format!("no field named '{}'", field))),
        (target, index) => Err(Error::Evaluation(format!(
            "cannot index a value of type {} with a value of type {}",
            target.spanner_type(),
            index.spanner_type()
        ))),
    }
}
