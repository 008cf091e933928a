use std::fmt::Display;

/// The fixed type lattice of the language.
///
/// `Comparable` and `Any` are supertypes only; no value has them as its
/// runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Decimal,
    Character,
    String,
    Comparable,
    Any,
}

impl Type {
    /// Resolves a type name as written in source.
    pub fn from_name(name: &str) -> Option<Type> {
        Some(match name {
            "Nil" => Type::Nil,
            "Boolean" => Type::Boolean,
            "Integer" => Type::Integer,
            "Decimal" => Type::Decimal,
            "Character" => Type::Character,
            "String" => Type::String,
            "Comparable" => Type::Comparable,
            "Any" => Type::Any,
            _ => return None,
        })
    }

    pub fn get_name(&self) -> &'static str {
        match self {
            Type::Nil => "Nil",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
            Type::Comparable => "Comparable",
            Type::Any => "Any",
        }
    }

    /// Whether a value of type `actual` may be stored where `self` is expected.
    pub fn is_assignable_from(&self, actual: Type) -> bool {
        match self {
            Type::Any => true,
            Type::Comparable => matches!(
                actual,
                Type::Integer | Type::Decimal | Type::Character | Type::String | Type::Comparable
            ),
            _ => *self == actual,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}
