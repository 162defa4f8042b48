//! # Value Converter
//!
//! Conversion between the host's [`DynamicValue`] and typed script values.
//! Every conversion either succeeds completely or fails with
//! [`ScriptError::Conversion`]; nothing is silently replaced by null or zero.

use crate::api::objects::value_layout;
use crate::identity::{kind_matches, IdentityBridge};
use asbridge_core::{DynamicDict, DynamicValue};
use asbridge_host::HostRuntime;
use asbridge_scripting::{
    ScriptArray, ScriptDictionary, ScriptError, ScriptObject, ScriptResult, ScriptType,
    ScriptValue, VariadicArgs,
};

/// Converter bound to one host and its identity bridge
pub struct ValueConverter<'a> {
    host: &'a dyn HostRuntime,
    bridge: &'a IdentityBridge,
}

impl<'a> ValueConverter<'a> {
    pub fn new(host: &'a dyn HostRuntime, bridge: &'a IdentityBridge) -> Self {
        Self { host, bridge }
    }

    /// Script value to host value
    pub fn to_host(&self, value: &ScriptValue) -> ScriptResult<DynamicValue> {
        let converted = match value {
            ScriptValue::Void | ScriptValue::Null => DynamicValue::Null,
            ScriptValue::Bool(b) => DynamicValue::Bool(*b),
            ScriptValue::Int8(v) => DynamicValue::Int(*v as i64),
            ScriptValue::Int16(v) => DynamicValue::Int(*v as i64),
            ScriptValue::Int32(v) => DynamicValue::Int(*v as i64),
            ScriptValue::Int64(v) => DynamicValue::Int(*v),
            ScriptValue::UInt8(v) => DynamicValue::UInt(*v as u64),
            ScriptValue::UInt16(v) => DynamicValue::UInt(*v as u64),
            ScriptValue::UInt32(v) => DynamicValue::UInt(*v as u64),
            ScriptValue::UInt64(v) => DynamicValue::UInt(*v),
            ScriptValue::Float(v) => DynamicValue::Double(*v as f64),
            ScriptValue::Double(v) => DynamicValue::Double(*v),
            ScriptValue::String(s) => DynamicValue::String(s.clone()),
            ScriptValue::Array(array) if *array.element_type() == ScriptType::UInt8 => {
                DynamicValue::Bytes(
                    array
                        .iter()
                        .map(|item| match item {
                            ScriptValue::UInt8(byte) => Ok(*byte),
                            other => Err(conversion(other.type_name(), "bytes")),
                        })
                        .collect::<ScriptResult<_>>()?,
                )
            }
            ScriptValue::Array(array) => DynamicValue::List(
                array
                    .iter()
                    .map(|item| self.to_host(item))
                    .collect::<ScriptResult<_>>()?,
            ),
            ScriptValue::Dictionary(dict) => DynamicValue::Dict(
                dict.iter()
                    .map(|(key, item)| Ok((key.to_string(), self.to_host(item)?)))
                    .collect::<ScriptResult<DynamicDict>>()?,
            ),
            ScriptValue::Any(inner) => self.to_host(inner)?,
            ScriptValue::Handle(handle) => match self.bridge.resolve(self.host, handle) {
                Ok(entity) => DynamicValue::Entity(entity),
                Err(_) => DynamicValue::Null,
            },
            ScriptValue::Object(object) => DynamicValue::Dict(
                object
                    .fields()
                    .map(|(key, item)| Ok((key.to_string(), self.to_host(item)?)))
                    .collect::<ScriptResult<DynamicDict>>()?,
            ),
            ScriptValue::Function(_) => return Err(conversion("function", "DynamicValue")),
        };
        Ok(converted)
    }

    /// Present slots of a variadic call, in order
    pub fn variadic_to_host(&self, args: &VariadicArgs) -> ScriptResult<Vec<DynamicValue>> {
        args.present().map(|value| self.to_host(value)).collect()
    }

    /// Host value into a slot of type `hint`
    pub fn to_script(&self, value: &DynamicValue, hint: &ScriptType) -> ScriptResult<ScriptValue> {
        let mismatch = || conversion(value.kind_name(), &hint.to_string());

        match (value, hint) {
            (_, ScriptType::Any) => Ok(ScriptValue::Any(Box::new(self.natural(value)?))),
            (_, ScriptType::Variadic) => self.natural(value),
            (DynamicValue::Null, ScriptType::Handle(_) | ScriptType::FuncDef(_)) => {
                Ok(ScriptValue::Null)
            }
            (DynamicValue::Bool(b), ScriptType::Bool) => Ok(ScriptValue::Bool(*b)),
            (DynamicValue::Int(i), ty) if ty.is_numeric() => ScriptValue::Int64(*i)
                .cast_numeric(ty)
                .ok_or_else(mismatch),
            (DynamicValue::UInt(u), ty) if ty.is_numeric() => ScriptValue::UInt64(*u)
                .cast_numeric(ty)
                .ok_or_else(mismatch),
            (DynamicValue::Double(d), ScriptType::Double) => Ok(ScriptValue::Double(*d)),
            (DynamicValue::Double(d), ScriptType::Float) => Ok(ScriptValue::Float(*d as f32)),
            (DynamicValue::Int(_) | DynamicValue::UInt(_), ScriptType::Enum(_)) => {
                self.to_script(value, &ScriptType::Int32)
            }
            (DynamicValue::String(s), ScriptType::String) => Ok(ScriptValue::String(s.clone())),
            (DynamicValue::Bytes(bytes), ScriptType::Array(element))
                if **element == ScriptType::UInt8 =>
            {
                Ok(bytes_array(bytes))
            }
            (DynamicValue::List(items), ScriptType::Array(element)) => {
                let items = items
                    .iter()
                    .map(|item| self.to_script(item, element))
                    .collect::<ScriptResult<Vec<_>>>()?;
                Ok(ScriptValue::Array(ScriptArray::with_items(
                    (**element).clone(),
                    items,
                )))
            }
            (DynamicValue::Dict(dict), ScriptType::Dictionary) => self.natural_dict(dict),
            (DynamicValue::Dict(dict), ScriptType::Value(type_name)) => {
                let layout = value_layout(type_name).ok_or_else(mismatch)?;
                if dict.len() != layout.len() {
                    return Err(mismatch());
                }
                let mut object = ScriptObject::new(type_name.clone());
                for (field, ty) in layout {
                    let item = dict.get(field).ok_or_else(mismatch)?;
                    object.set_field(field, self.to_script(item, &ty)?);
                }
                Ok(ScriptValue::Object(object))
            }
            (DynamicValue::Entity(entity), ScriptType::Handle(type_name)) => {
                if !kind_matches(type_name, entity.kind) {
                    return Err(mismatch());
                }
                Ok(self.bridge.to_script(self.host, *entity))
            }
            _ => Err(mismatch()),
        }
    }

    /// Script value of the type a host value maps to without a hint
    pub fn natural(&self, value: &DynamicValue) -> ScriptResult<ScriptValue> {
        let converted = match value {
            DynamicValue::Null => ScriptValue::Null,
            DynamicValue::Bool(b) => ScriptValue::Bool(*b),
            DynamicValue::Int(i) => ScriptValue::Int64(*i),
            DynamicValue::UInt(u) => ScriptValue::UInt64(*u),
            DynamicValue::Double(d) => ScriptValue::Double(*d),
            DynamicValue::String(s) => ScriptValue::String(s.clone()),
            DynamicValue::Bytes(bytes) => bytes_array(bytes),
            DynamicValue::List(_) => {
                return self.to_script(value, &ScriptType::array_of(ScriptType::Any))
            }
            DynamicValue::Dict(dict) => self.natural_dict(dict)?,
            DynamicValue::Entity(entity) => self.bridge.to_script(self.host, *entity),
        };
        Ok(converted)
    }

    fn natural_dict(&self, dict: &DynamicDict) -> ScriptResult<ScriptValue> {
        let mut converted = ScriptDictionary::new();
        for (key, item) in dict.iter() {
            converted.set(key, self.natural(item)?);
        }
        Ok(ScriptValue::Dictionary(converted))
    }

    /// Arguments of a custom event as `array<any>`
    pub fn event_args(&self, args: &[DynamicValue]) -> ScriptResult<ScriptValue> {
        let items = args
            .iter()
            .map(|arg| self.to_script(arg, &ScriptType::Any))
            .collect::<ScriptResult<Vec<_>>>()?;
        Ok(ScriptValue::Array(ScriptArray::with_items(
            ScriptType::Any,
            items,
        )))
    }
}

fn bytes_array(bytes: &[u8]) -> ScriptValue {
    ScriptValue::Array(ScriptArray::with_items(
        ScriptType::UInt8,
        bytes.iter().copied().map(ScriptValue::UInt8).collect(),
    ))
}

fn conversion(from: impl Into<String>, to: &str) -> ScriptError {
    ScriptError::Conversion {
        from: from.into(),
        to: to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asbridge_core::EntityKind;
    use asbridge_host::MemoryHost;
    use asbridge_scripting::ScriptFunction;

    fn with_converter<T>(f: impl FnOnce(&MemoryHost, ValueConverter<'_>) -> T) -> T {
        let host = MemoryHost::new();
        let bridge = IdentityBridge::new();
        let converter = ValueConverter::new(&host, &bridge);
        f(&host, converter)
    }

    #[test]
    fn test_round_trip_primitives() {
        with_converter(|_, conv| {
            let cases = [
                (DynamicValue::Bool(true), ScriptType::Bool),
                (DynamicValue::Int(-5), ScriptType::Int32),
                (DynamicValue::Int(i64::MIN), ScriptType::Int64),
                (DynamicValue::UInt(200), ScriptType::UInt8),
                (DynamicValue::UInt(u64::MAX), ScriptType::UInt64),
                (DynamicValue::Double(0.5), ScriptType::Double),
                (DynamicValue::String("hi".into()), ScriptType::String),
            ];
            for (value, hint) in cases {
                let script = conv.to_script(&value, &hint).unwrap();
                assert_eq!(script.script_type(), Some(hint.clone()));
                assert_eq!(conv.to_host(&script).unwrap(), value);
            }
        });
    }

    #[test]
    fn test_round_trip_nested() {
        with_converter(|_, conv| {
            let mut inner = DynamicDict::new();
            inner.insert("b", DynamicValue::from(1u32));
            inner.insert("a", DynamicValue::from("x"));
            let value = DynamicValue::List(vec![
                DynamicValue::Dict(inner),
                DynamicValue::Bytes(vec![1, 2, 3]),
                DynamicValue::Null,
            ]);

            let script = conv.natural(&value).unwrap();
            let back = conv.to_host(&script).unwrap();
            assert_eq!(back, value);

            if let DynamicValue::List(items) = back {
                if let DynamicValue::Dict(dict) = &items[0] {
                    assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["b", "a"]);
                }
            }
        });
    }

    #[test]
    fn test_narrowing_is_range_checked() {
        with_converter(|_, conv| {
            assert!(matches!(
                conv.to_script(&DynamicValue::Int(300), &ScriptType::UInt8),
                Err(ScriptError::Conversion { .. })
            ));
            assert!(matches!(
                conv.to_script(&DynamicValue::Int(-1), &ScriptType::UInt32),
                Err(ScriptError::Conversion { .. })
            ));
            assert!(matches!(
                conv.to_script(&DynamicValue::Double(1.0), &ScriptType::Int32),
                Err(ScriptError::Conversion { .. })
            ));
            assert!(matches!(
                conv.to_script(&DynamicValue::Null, &ScriptType::Int32),
                Err(ScriptError::Conversion { .. })
            ));
        });
    }

    #[test]
    fn test_array_conversion_is_atomic() {
        with_converter(|_, conv| {
            let value = DynamicValue::List(vec![
                DynamicValue::Int(1),
                DynamicValue::String("two".into()),
            ]);
            let result = conv.to_script(&value, &ScriptType::array_of(ScriptType::Int32));
            assert_eq!(
                result,
                Err(ScriptError::Conversion {
                    from: "string".into(),
                    to: "int".into(),
                })
            );
        });
    }

    #[test]
    fn test_functions_do_not_convert() {
        with_converter(|_, conv| {
            let function = ScriptFunction::new("cb", |_| Ok(ScriptValue::Void));
            assert!(matches!(
                conv.to_host(&function.into()),
                Err(ScriptError::Conversion { .. })
            ));
        });
    }

    #[test]
    fn test_entities_go_through_the_bridge() {
        with_converter(|host, conv| {
            let player = host.spawn_player("p").unwrap();
            let value = DynamicValue::Entity(player);

            let handle = conv
                .to_script(&value, &ScriptType::Handle("Entity".into()))
                .unwrap();
            assert_eq!(handle.as_handle().map(|h| h.entity()), Some(player));
            assert_eq!(conv.to_host(&handle).unwrap(), value);

            assert!(conv
                .to_script(&value, &ScriptType::Handle("Vehicle".into()))
                .is_err());

            host.destroy(player);
            assert_eq!(
                conv.to_script(&value, &ScriptType::Handle("Player".into())),
                Ok(ScriptValue::Null)
            );
            assert_eq!(conv.to_host(&handle).unwrap(), DynamicValue::Null);
            assert_eq!(player.kind, EntityKind::Player);
        });
    }

    #[test]
    fn test_variadic_skips_absent_slots() {
        with_converter(|_, conv| {
            let args = VariadicArgs::from_slots(
                4,
                vec![
                    Some(ScriptValue::Int32(1)),
                    None,
                    Some(ScriptValue::String("x".into())),
                    None,
                ],
            )
            .unwrap();
            assert_eq!(
                conv.variadic_to_host(&args).unwrap(),
                vec![DynamicValue::Int(1), DynamicValue::String("x".into())]
            );
        });
    }

    #[test]
    fn test_value_types_require_their_fields() {
        with_converter(|_, conv| {
            let hint = ScriptType::Value("Vector3f".into());
            let vector: DynamicDict = [("z", 3.0), ("x", 1.0), ("y", 2.0)]
                .into_iter()
                .map(|(key, v)| (key.to_string(), DynamicValue::Double(v)))
                .collect();
            assert_eq!(
                conv.to_script(&DynamicValue::Dict(vector.clone()), &hint),
                Ok(crate::api::objects::vector_to_script(
                    asbridge_core::Vector3f::new(1.0, 2.0, 3.0)
                ))
            );

            let foreign: DynamicDict = [("foo".to_string(), DynamicValue::from("bar"))]
                .into_iter()
                .collect();
            assert!(matches!(
                conv.to_script(&DynamicValue::Dict(foreign), &hint),
                Err(ScriptError::Conversion { .. })
            ));

            let mut partial = vector.clone();
            partial.remove("z");
            assert!(matches!(
                conv.to_script(&DynamicValue::Dict(partial), &hint),
                Err(ScriptError::Conversion { .. })
            ));

            let mut extra = vector;
            extra.insert("w", DynamicValue::Double(0.0));
            assert!(matches!(
                conv.to_script(&DynamicValue::Dict(extra), &hint),
                Err(ScriptError::Conversion { .. })
            ));

            let mut wrong = DynamicDict::new();
            for field in ["x", "y", "z"] {
                wrong.insert(field, DynamicValue::from("0"));
            }
            assert!(matches!(
                conv.to_script(&DynamicValue::Dict(wrong), &hint),
                Err(ScriptError::Conversion { .. })
            ));
            assert!(matches!(
                conv.to_script(&DynamicValue::Dict(DynamicDict::new()), &ScriptType::Value("Quat".into())),
                Err(ScriptError::Conversion { .. })
            ));
        });
    }
}
