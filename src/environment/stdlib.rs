//! Builtin members of the lattice types.
//!
//! Each type with members gets its own scope holding the member fields and
//! methods, so receiver-based lookups reuse the normal scope machinery.
//! Field values are computed from the receiver by a getter; member methods
//! are natives that receive the receiver as their first argument.

use std::{collections::HashMap, rc::Rc};

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::errors::errors::ErrorImpl;

use super::{
    environment::{
        Callable, Function, FunctionRef, NativeFn, Scope, ScopeRef, Variable, VariableRef,
    },
    types::Type,
    value::Value,
};

pub type FieldGetter = fn(&Value) -> Result<Value, ErrorImpl>;

#[derive(Debug)]
pub struct TypeMembers {
    scopes: HashMap<Type, ScopeRef>,
    getters: HashMap<(Type, String), FieldGetter>,
}

impl TypeMembers {
    /// Builds the member tables for every builtin type.
    pub fn new() -> Self {
        let mut members = TypeMembers {
            scopes: HashMap::new(),
            getters: HashMap::new(),
        };

        members.field(Type::String, "length", Type::Integer, string_length);
        members.method(Type::String, "charAt", vec![Type::Integer], Type::Character, string_char_at);
        members.method(Type::String, "contains", vec![Type::String], Type::Boolean, string_contains);
        members.method(Type::Integer, "abs", vec![], Type::Integer, integer_abs);
        members.method(Type::Integer, "toDecimal", vec![], Type::Decimal, integer_to_decimal);
        members.method(Type::Decimal, "abs", vec![], Type::Decimal, decimal_abs);
        members.method(Type::Decimal, "round", vec![], Type::Integer, decimal_round);

        members
    }

    fn scope_of(&mut self, ty: Type) -> ScopeRef {
        Rc::clone(self.scopes.entry(ty).or_insert_with(Scope::root))
    }

    fn field(&mut self, owner: Type, name: &str, ty: Type, getter: FieldGetter) {
        let scope = self.scope_of(owner);
        scope
            .borrow_mut()
            .insert_variable(Variable::new(name, ty, true, Value::Nil));
        self.getters.insert((owner, String::from(name)), getter);
    }

    fn method(
        &mut self,
        owner: Type,
        name: &str,
        parameter_types: Vec<Type>,
        return_type: Type,
        native: fn(&[Value]) -> Result<Value, ErrorImpl>,
    ) {
        let scope = self.scope_of(owner);
        let native: NativeFn = Rc::new(native);
        scope.borrow_mut().insert_function(Function {
            name: String::from(name),
            parameter_types,
            return_type,
            body: Callable::Native(native),
        });
    }

    fn unknown_member(ty: Type, name: &str) -> ErrorImpl {
        ErrorImpl::UnknownMember {
            type_: ty.to_string(),
            member: String::from(name),
        }
    }

    /// Resolves a member field of `ty`.
    pub fn lookup_field(&self, ty: Type, name: &str) -> Result<VariableRef, ErrorImpl> {
        self.scopes
            .get(&ty)
            .and_then(|scope| scope.borrow().lookup_variable(name).ok())
            .ok_or_else(|| Self::unknown_member(ty, name))
    }

    /// Resolves a member method of `ty`; `arity` does not count the receiver.
    pub fn lookup_method(&self, ty: Type, name: &str, arity: usize) -> Result<FunctionRef, ErrorImpl> {
        self.scopes
            .get(&ty)
            .and_then(|scope| scope.borrow().lookup_function(name, arity).ok())
            .ok_or_else(|| Self::unknown_member(ty, name))
    }

    /// Reads a member field off a runtime receiver.
    pub fn read_field(&self, receiver: &Value, name: &str) -> Result<Value, ErrorImpl> {
        let ty = receiver.get_type();
        match self.getters.get(&(ty, String::from(name))) {
            Some(getter) => getter(receiver),
            None => Err(Self::unknown_member(ty, name)),
        }
    }
}

impl Default for TypeMembers {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_arguments(expected: &str, arguments: &[Value]) -> ErrorImpl {
    let received = arguments
        .iter()
        .map(|argument| argument.get_type().get_name())
        .collect::<Vec<_>>()
        .join(", ");

    ErrorImpl::RuntimeTypeMismatch {
        expected: String::from(expected),
        received,
    }
}

fn to_integer(count: usize) -> Result<Value, ErrorImpl> {
    i32::try_from(count)
        .map(Value::Integer)
        .map_err(|_| ErrorImpl::IntegerOverflow {
            value: count.to_string(),
        })
}

fn string_length(receiver: &Value) -> Result<Value, ErrorImpl> {
    match receiver {
        Value::String(value) => to_integer(value.chars().count()),
        other => Err(invalid_arguments("String", std::slice::from_ref(other))),
    }
}

fn string_char_at(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    let [Value::String(value), Value::Integer(index)] = arguments else {
        return Err(invalid_arguments("String, Integer", arguments));
    };

    let length = value.chars().count();
    usize::try_from(*index)
        .ok()
        .and_then(|position| value.chars().nth(position))
        .map(Value::Character)
        .ok_or(ErrorImpl::IndexOutOfBounds {
            index: i64::from(*index),
            length,
        })
}

fn string_contains(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    match arguments {
        [Value::String(value), Value::String(needle)] => {
            Ok(Value::Boolean(value.contains(needle.as_str())))
        }
        _ => Err(invalid_arguments("String, String", arguments)),
    }
}

fn integer_abs(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    match arguments {
        [Value::Integer(value)] => value
            .checked_abs()
            .map(Value::Integer)
            .ok_or(ErrorImpl::IntegerOverflow {
                value: format!("|{}|", value),
            }),
        _ => Err(invalid_arguments("Integer", arguments)),
    }
}

fn integer_to_decimal(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    match arguments {
        [Value::Integer(value)] => Ok(Value::Decimal(Decimal::from(*value))),
        _ => Err(invalid_arguments("Integer", arguments)),
    }
}

fn decimal_abs(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    match arguments {
        [Value::Decimal(value)] => Ok(Value::Decimal(value.abs())),
        _ => Err(invalid_arguments("Decimal", arguments)),
    }
}

fn decimal_round(arguments: &[Value]) -> Result<Value, ErrorImpl> {
    let [Value::Decimal(value)] = arguments else {
        return Err(invalid_arguments("Decimal", arguments));
    };

    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .to_i32()
        .map(Value::Integer)
        .ok_or(ErrorImpl::IntegerOverflow {
            value: rounded.to_string(),
        })
}
