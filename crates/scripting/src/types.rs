//! Script type model

use std::fmt;

/// Type of a script value slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptType {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    /// Generic dynamic array `array<T>`
    Array(Box<ScriptType>),
    /// Generic `dictionary` container
    Dictionary,
    /// Type-erased `any` container
    Any,
    /// Handle to a registered reference type, `T@`
    Handle(String),
    /// Registered value type, stored inline
    Value(String),
    /// Registered enum
    Enum(String),
    /// Handle to a function matching a funcdef, `F@`
    FuncDef(String),
    /// Variable type argument `?`
    Variadic,
}

impl ScriptType {
    /// Resolve a built-in type name
    pub fn primitive(name: &str) -> Option<Self> {
        let ty = match name {
            "void" => Self::Void,
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int" | "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::UInt8,
            "uint16" => Self::UInt16,
            "uint" | "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::String,
            "dictionary" => Self::Dictionary,
            "any" => Self::Any,
            _ => return None,
        };
        Some(ty)
    }

    /// Names reserved by the engine, including the `array` template
    pub fn is_builtin_name(name: &str) -> bool {
        name == "array" || name == "?" || Self::primitive(name).is_some()
    }

    pub fn array_of(element: ScriptType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Bool => write!(f, "bool"),
            Self::Int8 => write!(f, "int8"),
            Self::Int16 => write!(f, "int16"),
            Self::Int32 => write!(f, "int"),
            Self::Int64 => write!(f, "int64"),
            Self::UInt8 => write!(f, "uint8"),
            Self::UInt16 => write!(f, "uint16"),
            Self::UInt32 => write!(f, "uint"),
            Self::UInt64 => write!(f, "uint64"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Array(element) => write!(f, "array<{}>", element),
            Self::Dictionary => write!(f, "dictionary"),
            Self::Any => write!(f, "any"),
            Self::Handle(name) | Self::FuncDef(name) => write!(f, "{}@", name),
            Self::Value(name) | Self::Enum(name) => write!(f, "{}", name),
            Self::Variadic => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_aliases() {
        assert_eq!(ScriptType::primitive("int"), Some(ScriptType::Int32));
        assert_eq!(ScriptType::primitive("uint32"), Some(ScriptType::UInt32));
        assert_eq!(ScriptType::primitive("Player"), None);
        assert!(ScriptType::is_builtin_name("array"));
    }

    #[test]
    fn test_display() {
        let ty = ScriptType::array_of(ScriptType::Handle("Player".into()));
        assert_eq!(ty.to_string(), "array<Player@>");
        assert_eq!(ScriptType::array_of(ScriptType::Any).to_string(), "array<any>");
    }
}
