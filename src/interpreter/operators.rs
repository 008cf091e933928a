//! Runtime semantics of the binary operators.
//!
//! `&&` and `||` are only reached here once both sides are known; the
//! interpreter short-circuits them before evaluating the right operand.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    ast::expressions::BinaryOperator, environment::Value, errors::errors::ErrorImpl,
};

/// Fractional digits kept by decimal division.
const DIVISION_SCALE: u32 = 1;

pub fn require_boolean(value: &Value) -> Result<bool, ErrorImpl> {
    match value {
        Value::Boolean(value) => Ok(*value),
        other => Err(ErrorImpl::RuntimeTypeMismatch {
            expected: String::from("Boolean"),
            received: other.get_type().to_string(),
        }),
    }
}

pub fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> Result<Value, ErrorImpl> {
    use BinaryOperator::*;

    match operator {
        Add if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", left, right)))
        }
        Add | Subtract | Multiply | Divide => arithmetic(operator, left, right),
        Less | LessEquals | Greater | GreaterEquals => compare(operator, left, right),
        Equals => Ok(Value::Boolean(left == right)),
        NotEquals => Ok(Value::Boolean(left != right)),
        And => Ok(Value::Boolean(require_boolean(left)? && require_boolean(right)?)),
        Or => Ok(Value::Boolean(require_boolean(left)? || require_boolean(right)?)),
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(value) => Some(Decimal::from(*value)),
        Value::Decimal(value) => Some(*value),
        _ => None,
    }
}

fn numeric_mismatch(left: &Value, right: &Value) -> ErrorImpl {
    ErrorImpl::RuntimeTypeMismatch {
        expected: String::from("Integer or Decimal"),
        received: format!("{} and {}", left.get_type(), right.get_type()),
    }
}

fn invalid_operation(operator: BinaryOperator, left: &Value, right: &Value) -> ErrorImpl {
    ErrorImpl::InvalidOperation {
        operator: operator.to_string(),
        left: left.get_type().to_string(),
        right: right.get_type().to_string(),
    }
}

/// Integer arithmetic is checked and truncating; anything involving a
/// Decimal is done in Decimal.
fn arithmetic(operator: BinaryOperator, left: &Value, right: &Value) -> Result<Value, ErrorImpl> {
    let overflow = || ErrorImpl::IntegerOverflow {
        value: format!("{} {} {}", left, operator, right),
    };

    if let (Value::Integer(l), Value::Integer(r)) = (left, right) {
        let result = match operator {
            BinaryOperator::Add => l.checked_add(*r),
            BinaryOperator::Subtract => l.checked_sub(*r),
            BinaryOperator::Multiply => l.checked_mul(*r),
            BinaryOperator::Divide if *r == 0 => return Err(ErrorImpl::DivisionByZero),
            BinaryOperator::Divide => l.checked_div(*r),
            _ => return Err(invalid_operation(operator, left, right)),
        };

        return result.map(Value::Integer).ok_or_else(overflow);
    }

    let (Some(l), Some(r)) = (to_decimal(left), to_decimal(right)) else {
        return Err(numeric_mismatch(left, right));
    };

    let result = match operator {
        BinaryOperator::Add => l.checked_add(r),
        BinaryOperator::Subtract => l.checked_sub(r),
        BinaryOperator::Multiply => l.checked_mul(r),
        BinaryOperator::Divide if r.is_zero() => return Err(ErrorImpl::DivisionByZero),
        BinaryOperator::Divide => l.checked_div(r).map(|quotient| {
            quotient
                .round_dp_with_strategy(DIVISION_SCALE, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        }),
        _ => return Err(invalid_operation(operator, left, right)),
    };

    result.map(Value::Decimal).ok_or_else(overflow)
}

/// Orders numeric values, promoting an Integer only when the other side is a Decimal.
fn compare(operator: BinaryOperator, left: &Value, right: &Value) -> Result<Value, ErrorImpl> {
    let ordering = match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => l.cmp(r),
        _ => match (to_decimal(left), to_decimal(right)) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => return Err(numeric_mismatch(left, right)),
        },
    };

    let result = match operator {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEquals => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEquals => ordering.is_ge(),
        _ => return Err(invalid_operation(operator, left, right)),
    };

    Ok(Value::Boolean(result))
}
