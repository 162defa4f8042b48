//! Script-side values
//!
//! Values live in typed slots; containers are the generic `array<T>`,
//! `dictionary` and `any`. Host objects are reached through non-owning
//! [`ObjectHandle`]s, script callables through [`ScriptFunction`].

use crate::error::{ScriptError, ScriptResult};
use crate::types::ScriptType;
use asbridge_core::EntityRef;
use std::fmt;
use std::sync::{Arc, Weak};

/// A value held in a script slot
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// No value (return of `void` functions)
    Void,
    /// Null handle
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Array(ScriptArray),
    Dictionary(ScriptDictionary),
    Any(Box<ScriptValue>),
    Handle(ObjectHandle),
    Object(ScriptObject),
    Function(ScriptFunction),
}

impl ScriptValue {
    /// Type of the slot holding this value, `None` for void and null
    pub fn script_type(&self) -> Option<ScriptType> {
        let ty = match self {
            Self::Void | Self::Null => return None,
            Self::Bool(_) => ScriptType::Bool,
            Self::Int8(_) => ScriptType::Int8,
            Self::Int16(_) => ScriptType::Int16,
            Self::Int32(_) => ScriptType::Int32,
            Self::Int64(_) => ScriptType::Int64,
            Self::UInt8(_) => ScriptType::UInt8,
            Self::UInt16(_) => ScriptType::UInt16,
            Self::UInt32(_) => ScriptType::UInt32,
            Self::UInt64(_) => ScriptType::UInt64,
            Self::Float(_) => ScriptType::Float,
            Self::Double(_) => ScriptType::Double,
            Self::String(_) => ScriptType::String,
            Self::Array(array) => ScriptType::array_of(array.element_type().clone()),
            Self::Dictionary(_) => ScriptType::Dictionary,
            Self::Any(_) => ScriptType::Any,
            Self::Handle(handle) => ScriptType::Handle(handle.type_name().to_string()),
            Self::Object(object) => ScriptType::Value(object.type_name().to_string()),
            Self::Function(function) => {
                ScriptType::FuncDef(function.funcdef().unwrap_or("function").to_string())
            }
        };
        Some(ty)
    }

    /// Human readable type name for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Self::Void => "void".to_string(),
            Self::Null => "null".to_string(),
            other => other
                .script_type()
                .map(|ty| ty.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer slot widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(v) => Some(*v as i64),
            Self::Int16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt8(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Any non-negative integer slot widened to `u64`
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt64(v) => Some(*v),
            other => other.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    /// Any numeric slot widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::UInt64(v) => Some(*v as f64),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ScriptArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ScriptObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Convert a numeric slot into another numeric slot type
    ///
    /// Integer targets are range checked and never accept floating values.
    pub fn cast_numeric(&self, target: &ScriptType) -> Option<ScriptValue> {
        let value = match target {
            ScriptType::Float => Self::Float(self.as_f64()? as f32),
            ScriptType::Double => Self::Double(self.as_f64()?),
            ScriptType::UInt64 => Self::UInt64(self.as_u64()?),
            ScriptType::Int8 => Self::Int8(i8::try_from(self.as_i64()?).ok()?),
            ScriptType::Int16 => Self::Int16(i16::try_from(self.as_i64()?).ok()?),
            ScriptType::Int32 => Self::Int32(i32::try_from(self.as_i64()?).ok()?),
            ScriptType::Int64 => Self::Int64(self.as_i64()?),
            ScriptType::UInt8 => Self::UInt8(u8::try_from(self.as_u64()?).ok()?),
            ScriptType::UInt16 => Self::UInt16(u16::try_from(self.as_u64()?).ok()?),
            ScriptType::UInt32 => Self::UInt32(u32::try_from(self.as_u64()?).ok()?),
            _ => return None,
        };
        Some(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ScriptValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for ScriptValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<f32> for ScriptValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjectHandle> for ScriptValue {
    fn from(v: ObjectHandle) -> Self {
        Self::Handle(v)
    }
}

impl From<Option<ObjectHandle>> for ScriptValue {
    fn from(v: Option<ObjectHandle>) -> Self {
        v.map(Self::Handle).unwrap_or(Self::Null)
    }
}

impl From<ScriptFunction> for ScriptValue {
    fn from(v: ScriptFunction) -> Self {
        Self::Function(v)
    }
}

/// Instance of the generic `array<T>` type
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptArray {
    element: ScriptType,
    items: Vec<ScriptValue>,
}

impl ScriptArray {
    pub fn new(element: ScriptType) -> Self {
        Self::with_items(element, Vec::new())
    }

    pub fn with_items(element: ScriptType, items: Vec<ScriptValue>) -> Self {
        Self { element, items }
    }

    pub fn element_type(&self) -> &ScriptType {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScriptValue> {
        self.items.get(index)
    }

    pub fn push(&mut self, value: ScriptValue) {
        self.items.push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptValue> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<ScriptValue> {
        self.items
    }
}

/// Instance of the `dictionary` type
///
/// Keys are unique and keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptDictionary {
    entries: Vec<(String, ScriptValue)>,
}

impl ScriptDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ScriptValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Instance of a registered value type, stored by value
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptObject {
    type_name: String,
    fields: Vec<(String, ScriptValue)>,
}

impl ScriptObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: ScriptValue) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&ScriptValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: ScriptValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug)]
struct HandleTarget {
    type_name: String,
    entity: EntityRef,
}

/// Script handle to a host object
///
/// The handle only names the object; the host keeps sole ownership of it.
/// Clones share one allocation whose strong count is the script reference
/// count. Two handles compare equal when they name the same object
/// (same ID and generation).
#[derive(Debug, Clone)]
pub struct ObjectHandle {
    target: Arc<HandleTarget>,
}

impl ObjectHandle {
    pub fn new(type_name: impl Into<String>, entity: EntityRef) -> Self {
        Self {
            target: Arc::new(HandleTarget {
                type_name: type_name.into(),
                entity,
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.target.type_name
    }

    pub fn entity(&self) -> EntityRef {
        self.target.entity
    }

    /// Number of live script references to this handle
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.target)
    }

    /// Whether both handles share the same allocation
    pub fn same_instance(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    pub fn downgrade(&self) -> WeakHandle {
        WeakHandle {
            target: Arc::downgrade(&self.target),
        }
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.target.entity == other.target.entity
    }
}

/// Weak reference to a handle allocation, used for identity caching
#[derive(Debug, Clone)]
pub struct WeakHandle {
    target: Weak<HandleTarget>,
}

impl WeakHandle {
    pub fn upgrade(&self) -> Option<ObjectHandle> {
        self.target.upgrade().map(|target| ObjectHandle { target })
    }
}

type Callback = dyn Fn(&[ScriptValue]) -> ScriptResult<ScriptValue> + Send + Sync;

/// Reference to a script callable
#[derive(Clone)]
pub struct ScriptFunction {
    name: String,
    funcdef: Option<String>,
    callback: Arc<Callback>,
}

impl ScriptFunction {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&[ScriptValue]) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            funcdef: None,
            callback: Arc::new(callback),
        }
    }

    /// Tag the callable with the funcdef it was declared against
    pub fn with_funcdef(mut self, funcdef: impl Into<String>) -> Self {
        self.funcdef = Some(funcdef.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn funcdef(&self) -> Option<&str> {
        self.funcdef.as_deref()
    }

    pub fn invoke(&self, args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        (self.callback)(args)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .field("funcdef", &self.funcdef)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScriptFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

/// Maximum number of slots a variadic function accepts
pub const MAX_VARIADIC_ARGS: usize = 32;

/// Bounded argument slots of a variadic call
///
/// Every slot carries an explicit presence marker; absent slots stand for
/// omitted optional arguments and are never forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariadicArgs {
    slots: Vec<Option<ScriptValue>>,
}

impl VariadicArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit slots, failing when more than `max` are given
    pub fn from_slots<I>(max: usize, slots: I) -> ScriptResult<Self>
    where
        I: IntoIterator<Item = Option<ScriptValue>>,
    {
        let mut args = Self::new();
        for slot in slots {
            if args.slots.len() >= max {
                return Err(ScriptError::RuntimeError(format!(
                    "Too many variadic arguments (max {})",
                    max
                )));
            }
            args.slots.push(slot);
        }
        Ok(args)
    }

    /// Present values followed by absent slots up to `max`
    pub fn padded(max: usize, values: Vec<ScriptValue>) -> ScriptResult<Self> {
        let mut args = Self::from_slots(max, values.into_iter().map(Some))?;
        args.slots.resize(max, None);
        Ok(args)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Present values in slot order, absent slots skipped
    pub fn present(&self) -> impl Iterator<Item = &ScriptValue> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asbridge_core::{EntityId, EntityKind};

    fn player_ref(id: u32) -> EntityRef {
        EntityRef::new(EntityId::new(id), EntityKind::Player, 1)
    }

    #[test]
    fn test_cast_numeric_range_checked() {
        assert_eq!(
            ScriptValue::Int64(200).cast_numeric(&ScriptType::UInt8),
            Some(ScriptValue::UInt8(200))
        );
        assert_eq!(ScriptValue::Int64(300).cast_numeric(&ScriptType::UInt8), None);
        assert_eq!(ScriptValue::Int32(-1).cast_numeric(&ScriptType::UInt32), None);
        assert_eq!(ScriptValue::Double(1.5).cast_numeric(&ScriptType::Int32), None);
        assert_eq!(
            ScriptValue::UInt32(3).cast_numeric(&ScriptType::Double),
            Some(ScriptValue::Double(3.0))
        );
    }

    #[test]
    fn test_handle_identity_and_refcount() {
        let a = ObjectHandle::new("Player", player_ref(1));
        let b = a.clone();
        let c = ObjectHandle::new("Player", player_ref(1));

        assert_eq!(a.ref_count(), 2);
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
        assert_eq!(a, c);
        assert_ne!(a, ObjectHandle::new("Player", player_ref(2)));

        let weak = a.downgrade();
        drop(a);
        drop(b);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_script_function_invoke() {
        let f = ScriptFunction::new("double", |args| {
            let v = args[0].as_i64().unwrap_or(0);
            Ok(ScriptValue::Int64(v * 2))
        })
        .with_funcdef("Doubler");

        assert_eq!(f.invoke(&[ScriptValue::Int32(4)]), Ok(ScriptValue::Int64(8)));
        assert_eq!(f.funcdef(), Some("Doubler"));
        assert_eq!(f.clone(), f);
    }

    #[test]
    fn test_variadic_skips_absent_slots() {
        let args = VariadicArgs::from_slots(
            MAX_VARIADIC_ARGS,
            vec![Some("a".into()), None, Some("b".into()), None, None],
        )
        .unwrap();
        let present: Vec<&ScriptValue> = args.present().collect();
        assert_eq!(present, vec![&ScriptValue::from("a"), &ScriptValue::from("b")]);
    }

    #[test]
    fn test_variadic_bounds() {
        let args = VariadicArgs::padded(4, vec![ScriptValue::Int32(1)]).unwrap();
        assert_eq!(args.slot_count(), 4);
        assert_eq!(args.present().count(), 1);

        let too_many = VariadicArgs::padded(2, vec![1.into(), 2.into(), 3.into()]);
        assert!(too_many.is_err());
    }

    #[test]
    fn test_dictionary_unique_keys() {
        let mut dict = ScriptDictionary::new();
        dict.set("a", 1.into());
        dict.set("a", 2.into());
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("a"), Some(&ScriptValue::Int32(2)));
    }
}
