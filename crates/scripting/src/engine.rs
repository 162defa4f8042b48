//! Script engine symbol table
//!
//! The engine owns every installed symbol together with its native
//! implementation and dispatches calls to them. Installation is only
//! reachable through [`crate::Registrar`], which documents every symbol
//! it installs.
//!
//! The engine is generic over the context type `C` handed to every native
//! call, so bindings receive their runtime explicitly instead of through a
//! process-wide singleton.

use crate::decl::{self, ParamDecl, TypeExpr};
use crate::error::{RegistrationError, Result, ScriptError, ScriptResult};
use crate::types::ScriptType;
use crate::value::{ScriptValue, VariadicArgs};
use std::collections::HashMap;
use std::sync::Arc;

pub type NativeFunction<C> =
    Arc<dyn Fn(&C, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync>;
pub type NativeMethod<C> =
    Arc<dyn Fn(&C, &ScriptValue, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync>;
pub type PropertyGetter<C> =
    Arc<dyn Fn(&C, &ScriptValue) -> ScriptResult<ScriptValue> + Send + Sync>;
pub type PropertySetter<C> =
    Arc<dyn Fn(&C, &ScriptValue, ScriptValue) -> ScriptResult<()> + Send + Sync>;
pub type GlobalGetter<C> = Arc<dyn Fn(&C) -> ScriptResult<ScriptValue> + Send + Sync>;

/// How instances of an object type are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Host owned, reached through handles
    Ref,
    /// Copied by value
    Value,
}

/// Resolved parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: ScriptType,
    pub name: Option<String>,
    pub optional: bool,
}

/// Resolved function signature
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub return_type: ScriptType,
    pub params: Vec<Param>,
    /// Maximum number of variadic slots after the fixed parameters
    pub variadic: Option<usize>,
}

impl Signature {
    fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    fn same_params(&self, other: &Signature) -> bool {
        self.variadic == other.variadic
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// Arguments of a native call, already checked against the signature
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: Vec<ScriptValue>,
    variadic: Option<VariadicArgs>,
}

impl CallArgs {
    pub fn new(values: Vec<ScriptValue>) -> Self {
        Self {
            values,
            variadic: None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScriptValue> {
        self.values.get(index)
    }

    pub fn value(&self, index: usize) -> ScriptResult<&ScriptValue> {
        self.get(index).ok_or(ScriptError::InvalidArgument {
            index,
            message: "missing argument".into(),
        })
    }

    pub fn string(&self, index: usize) -> ScriptResult<&str> {
        self.value(index)?
            .as_str()
            .ok_or_else(|| self.invalid(index, "expected string"))
    }

    pub fn boolean(&self, index: usize) -> ScriptResult<bool> {
        self.value(index)?
            .as_bool()
            .ok_or_else(|| self.invalid(index, "expected bool"))
    }

    pub fn int(&self, index: usize) -> ScriptResult<i32> {
        self.value(index)?
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.invalid(index, "expected int"))
    }

    pub fn uint(&self, index: usize) -> ScriptResult<u32> {
        self.value(index)?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.invalid(index, "expected uint"))
    }

    pub fn float(&self, index: usize) -> ScriptResult<f32> {
        self.value(index)?
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| self.invalid(index, "expected float"))
    }

    pub fn function(&self, index: usize) -> ScriptResult<crate::ScriptFunction> {
        match self.value(index)? {
            ScriptValue::Function(function) => Ok(function.clone()),
            ScriptValue::Null => Err(ScriptError::NullHandle),
            _ => Err(self.invalid(index, "expected function handle")),
        }
    }

    /// Variadic slots, present only for variadic functions
    pub fn variadic(&self) -> Option<&VariadicArgs> {
        self.variadic.as_ref()
    }

    fn invalid(&self, index: usize, message: &str) -> ScriptError {
        ScriptError::InvalidArgument {
            index,
            message: format!(
                "{}, found {}",
                message,
                self.values
                    .get(index)
                    .map(|v| v.type_name())
                    .unwrap_or_default()
            ),
        }
    }
}

struct FunctionEntry<C> {
    signature: Signature,
    native: NativeFunction<C>,
}

struct MethodEntry<C> {
    signature: Signature,
    native: NativeMethod<C>,
}

struct GlobalProperty<C> {
    ty: ScriptType,
    getter: GlobalGetter<C>,
}

struct ObjectProperty<C> {
    ty: ScriptType,
    getter: PropertyGetter<C>,
    setter: Option<PropertySetter<C>>,
}

struct ObjectTypeEntry<C> {
    kind: ObjectKind,
    base: Option<String>,
    properties: HashMap<String, ObjectProperty<C>>,
    constructors: Vec<FunctionEntry<C>>,
    methods: HashMap<String, Vec<MethodEntry<C>>>,
}

/// Script engine with its registered API
pub struct Engine<C> {
    functions: HashMap<String, Vec<FunctionEntry<C>>>,
    properties: HashMap<String, GlobalProperty<C>>,
    funcdefs: HashMap<String, Signature>,
    enums: HashMap<String, Vec<(String, i64)>>,
    object_types: HashMap<String, ObjectTypeEntry<C>>,
    symbol_count: usize,
}

impl<C> Engine<C> {
    /// Create an engine with only the built-in types
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            properties: HashMap::new(),
            funcdefs: HashMap::new(),
            enums: HashMap::new(),
            object_types: HashMap::new(),
            symbol_count: 0,
        }
    }

    /// Number of installed symbols of every kind
    pub fn symbol_count(&self) -> usize {
        self.symbol_count
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.object_types.contains_key(name)
            || self.enums.contains_key(name)
            || self.funcdefs.contains_key(name)
    }

    pub fn funcdef(&self, name: &str) -> Option<&Signature> {
        self.funcdefs.get(name)
    }

    pub fn enum_value(&self, enum_name: &str, value_name: &str) -> Option<i64> {
        self.enums
            .get(enum_name)?
            .iter()
            .find(|(name, _)| name == value_name)
            .map(|(_, value)| *value)
    }

    /// Whether `derived` is `base` or inherits from it
    pub fn is_subtype(&self, derived: &str, base: &str) -> bool {
        let mut current = Some(derived);
        while let Some(name) = current {
            if name == base {
                return true;
            }
            current = self
                .object_types
                .get(name)
                .and_then(|entry| entry.base.as_deref());
        }
        false
    }

    // ------------------------------------------------------------------
    // Installation
    // ------------------------------------------------------------------

    pub(crate) fn install_function(
        &mut self,
        declaration: &str,
        native: NativeFunction<C>,
    ) -> Result<Signature> {
        let parsed = decl::parse_function(declaration)?;
        let signature = Signature {
            return_type: self.resolve_return(declaration, &parsed.return_type)?,
            params: self.resolve_params(declaration, &parsed.params)?,
            name: parsed.name,
            variadic: None,
        };
        self.insert_function(signature.clone(), native)?;
        Ok(signature)
    }

    pub(crate) fn install_variadic(
        &mut self,
        return_type: &str,
        name: &str,
        fixed_params: &str,
        max_args: usize,
        native: NativeFunction<C>,
    ) -> Result<Signature> {
        let declaration = format!("{} {}({})", return_type, name, fixed_params);
        let parsed = decl::parse_function(&declaration)?;
        if max_args == 0 {
            return Err(RegistrationError::malformed(
                &declaration,
                "variadic functions need at least one slot",
            ));
        }
        let signature = Signature {
            return_type: self.resolve_return(&declaration, &parsed.return_type)?,
            params: self.resolve_params(&declaration, &parsed.params)?,
            name: parsed.name,
            variadic: Some(max_args),
        };
        self.insert_function(signature.clone(), native)?;
        Ok(signature)
    }

    fn insert_function(&mut self, signature: Signature, native: NativeFunction<C>) -> Result<()> {
        if self.properties.contains_key(&signature.name) {
            return Err(RegistrationError::DuplicateSymbol(signature.name));
        }
        let overloads = self.functions.entry(signature.name.clone()).or_default();
        if overloads.iter().any(|f| f.signature.same_params(&signature)) {
            return Err(RegistrationError::DuplicateSymbol(signature.name));
        }
        overloads.push(FunctionEntry { signature, native });
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_global_property(
        &mut self,
        declaration: &str,
        getter: GlobalGetter<C>,
    ) -> Result<()> {
        let parsed = decl::parse_property(declaration)?;
        let ty = self.resolve_value_type(declaration, &parsed.ty)?;
        if self.properties.contains_key(&parsed.name) || self.functions.contains_key(&parsed.name)
        {
            return Err(RegistrationError::DuplicateSymbol(parsed.name));
        }
        self.properties
            .insert(parsed.name, GlobalProperty { ty, getter });
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_funcdef(&mut self, declaration: &str) -> Result<Signature> {
        let parsed = decl::parse_function(declaration)?;
        self.ensure_type_name_free(&parsed.name)?;
        let signature = Signature {
            return_type: self.resolve_return(declaration, &parsed.return_type)?,
            params: self.resolve_params(declaration, &parsed.params)?,
            name: parsed.name.clone(),
            variadic: None,
        };
        self.funcdefs.insert(parsed.name, signature.clone());
        self.symbol_count += 1;
        Ok(signature)
    }

    pub(crate) fn install_object_type(
        &mut self,
        name: &str,
        kind: ObjectKind,
        base: Option<&str>,
    ) -> Result<()> {
        if !is_identifier(name) {
            return Err(RegistrationError::malformed(name, "invalid type name"));
        }
        self.ensure_type_name_free(name)?;
        if let Some(base) = base {
            match self.object_types.get(base) {
                Some(entry) if entry.kind == kind => {}
                Some(_) => {
                    return Err(RegistrationError::malformed(
                        name,
                        format!("base type {} has a different object kind", base),
                    ))
                }
                None => return Err(RegistrationError::UnknownObjectType(base.to_string())),
            }
        }
        self.object_types.insert(
            name.to_string(),
            ObjectTypeEntry {
                kind,
                base: base.map(str::to_string),
                properties: HashMap::new(),
                constructors: Vec::new(),
                methods: HashMap::new(),
            },
        );
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_object_property(
        &mut self,
        owner: &str,
        declaration: &str,
        getter: PropertyGetter<C>,
        setter: Option<PropertySetter<C>>,
    ) -> Result<()> {
        let parsed = decl::parse_property(declaration)?;
        let ty = self.resolve_value_type(declaration, &parsed.ty)?;
        let entry = self.object_type_mut(owner)?;
        if entry.properties.contains_key(&parsed.name) || entry.methods.contains_key(&parsed.name)
        {
            return Err(RegistrationError::DuplicateSymbol(format!(
                "{}::{}",
                owner, parsed.name
            )));
        }
        entry
            .properties
            .insert(parsed.name, ObjectProperty { ty, getter, setter });
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_constructor(
        &mut self,
        owner: &str,
        params: &str,
        native: NativeFunction<C>,
    ) -> Result<()> {
        let declaration = format!("{}({})", owner, params);
        let parsed = decl::parse_params(params)
            .map_err(|_| RegistrationError::malformed(&declaration, "invalid parameter list"))?;
        let signature = Signature {
            name: owner.to_string(),
            return_type: ScriptType::Void,
            params: self.resolve_params(&declaration, &parsed)?,
            variadic: None,
        };
        let entry = self.object_type_mut(owner)?;
        if entry.kind != ObjectKind::Value {
            return Err(RegistrationError::malformed(
                &declaration,
                "constructors are only supported on value types",
            ));
        }
        if entry
            .constructors
            .iter()
            .any(|c| c.signature.same_params(&signature))
        {
            return Err(RegistrationError::DuplicateSymbol(declaration));
        }
        entry.constructors.push(FunctionEntry { signature, native });
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_method(
        &mut self,
        owner: &str,
        declaration: &str,
        native: NativeMethod<C>,
    ) -> Result<()> {
        let parsed = decl::parse_function(declaration)?;
        let signature = Signature {
            return_type: self.resolve_return(declaration, &parsed.return_type)?,
            params: self.resolve_params(declaration, &parsed.params)?,
            name: parsed.name,
            variadic: None,
        };
        let entry = self.object_type_mut(owner)?;
        let qualified = format!("{}::{}", owner, signature.name);
        if entry.properties.contains_key(&signature.name) {
            return Err(RegistrationError::DuplicateSymbol(qualified));
        }
        let overloads = entry.methods.entry(signature.name.clone()).or_default();
        if overloads.iter().any(|m| m.signature.same_params(&signature)) {
            return Err(RegistrationError::DuplicateSymbol(qualified));
        }
        overloads.push(MethodEntry { signature, native });
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_enum(&mut self, name: &str) -> Result<()> {
        if !is_identifier(name) {
            return Err(RegistrationError::malformed(name, "invalid enum name"));
        }
        self.ensure_type_name_free(name)?;
        self.enums.insert(name.to_string(), Vec::new());
        self.symbol_count += 1;
        Ok(())
    }

    pub(crate) fn install_enum_value(&mut self, enum_name: &str, name: &str, value: i64) -> Result<()> {
        if !is_identifier(name) {
            return Err(RegistrationError::malformed(name, "invalid enum value name"));
        }
        let values = self
            .enums
            .get_mut(enum_name)
            .ok_or_else(|| RegistrationError::UnknownEnum(enum_name.to_string()))?;
        if values.iter().any(|(existing, _)| existing == name) {
            return Err(RegistrationError::DuplicateSymbol(format!(
                "{}::{}",
                enum_name, name
            )));
        }
        values.push((name.to_string(), value));
        self.symbol_count += 1;
        Ok(())
    }

    fn object_type_mut(&mut self, owner: &str) -> Result<&mut ObjectTypeEntry<C>> {
        self.object_types
            .get_mut(owner)
            .ok_or_else(|| RegistrationError::UnknownObjectType(owner.to_string()))
    }

    fn ensure_type_name_free(&self, name: &str) -> Result<()> {
        if ScriptType::is_builtin_name(name) || self.has_type(name) {
            return Err(RegistrationError::DuplicateSymbol(name.to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Type resolution
    // ------------------------------------------------------------------

    fn resolve_type(&self, declaration: &str, expr: &TypeExpr) -> Result<ScriptType> {
        let unknown = || RegistrationError::UnknownType {
            decl: declaration.to_string(),
            ty: expr.name.clone(),
        };

        if expr.name == "array" {
            return match expr.subtypes.as_slice() {
                [element] => Ok(ScriptType::array_of(
                    self.resolve_value_type(declaration, element)?,
                )),
                _ => Err(RegistrationError::malformed(
                    declaration,
                    "array takes exactly one subtype",
                )),
            };
        }
        if !expr.subtypes.is_empty() {
            return Err(RegistrationError::malformed(
                declaration,
                format!("{} is not a template", expr.name),
            ));
        }
        if expr.name == "?" {
            return Ok(ScriptType::Variadic);
        }
        if let Some(ty) = ScriptType::primitive(&expr.name) {
            return Ok(ty);
        }
        if self.funcdefs.contains_key(&expr.name) {
            return Ok(ScriptType::FuncDef(expr.name.clone()));
        }
        if self.enums.contains_key(&expr.name) {
            return Ok(ScriptType::Enum(expr.name.clone()));
        }
        match self.object_types.get(&expr.name) {
            Some(entry) if entry.kind == ObjectKind::Ref => Ok(ScriptType::Handle(expr.name.clone())),
            Some(_) if expr.is_handle => Err(RegistrationError::malformed(
                declaration,
                format!("value type {} cannot be used as a handle", expr.name),
            )),
            Some(_) => Ok(ScriptType::Value(expr.name.clone())),
            None => Err(unknown()),
        }
    }

    fn resolve_value_type(&self, declaration: &str, expr: &TypeExpr) -> Result<ScriptType> {
        match self.resolve_type(declaration, expr)? {
            ScriptType::Void => Err(RegistrationError::malformed(
                declaration,
                "void is only valid as a return type",
            )),
            ty => Ok(ty),
        }
    }

    fn resolve_return(&self, declaration: &str, expr: &TypeExpr) -> Result<ScriptType> {
        match self.resolve_type(declaration, expr)? {
            ScriptType::Variadic => Err(RegistrationError::malformed(
                declaration,
                "'?' is only valid as a parameter type",
            )),
            ty => Ok(ty),
        }
    }

    fn resolve_params(&self, declaration: &str, params: &[ParamDecl]) -> Result<Vec<Param>> {
        let mut resolved = Vec::with_capacity(params.len());
        let mut seen_optional = false;
        for param in params {
            if seen_optional && !param.has_default {
                return Err(RegistrationError::malformed(
                    declaration,
                    "required parameter after a defaulted one",
                ));
            }
            seen_optional |= param.has_default;
            resolved.push(Param {
                ty: self.resolve_value_type(declaration, &param.ty)?,
                name: param.name.clone(),
                optional: param.has_default,
            });
        }
        Ok(resolved)
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    /// Call a global function with positional arguments
    ///
    /// Arguments past the fixed parameters of a variadic function fill its
    /// slots; the remaining slots are marked absent.
    pub fn call(&self, ctx: &C, name: &str, args: Vec<ScriptValue>) -> ScriptResult<ScriptValue> {
        let overloads = self
            .functions
            .get(name)
            .ok_or_else(|| ScriptError::UnknownSymbol(name.to_string()))?;

        let mut last_error = None;
        for entry in overloads {
            match self.bind_args(&entry.signature, args.clone()) {
                Ok(call_args) => {
                    tracing::trace!("Calling {}", name);
                    return (entry.native)(ctx, &call_args);
                }
                Err(err) => last_error = Some(err),
            }
        }
        Err(self.no_match(name, overloads.len(), last_error))
    }

    /// Call a variadic function with explicit slot presence markers
    pub fn call_variadic(
        &self,
        ctx: &C,
        name: &str,
        fixed: Vec<ScriptValue>,
        slots: VariadicArgs,
    ) -> ScriptResult<ScriptValue> {
        let entry = self
            .functions
            .get(name)
            .and_then(|overloads| overloads.iter().find(|f| f.signature.variadic.is_some()))
            .ok_or_else(|| ScriptError::UnknownSymbol(name.to_string()))?;

        let max = entry.signature.variadic.unwrap_or_default();
        if slots.slot_count() > max {
            return Err(ScriptError::NoMatchingSignature {
                name: name.to_string(),
                reason: format!("too many variadic arguments (max {})", max),
            });
        }
        let mut call_args = self.bind_args(&entry.signature, fixed)?;
        call_args.variadic = Some(slots);
        (entry.native)(ctx, &call_args)
    }

    /// Read a global property
    pub fn get_global(&self, ctx: &C, name: &str) -> ScriptResult<ScriptValue> {
        let property = self
            .properties
            .get(name)
            .ok_or_else(|| ScriptError::UnknownSymbol(name.to_string()))?;
        let value = (property.getter)(ctx)?;
        tracing::trace!("Read global {} of type {}", name, property.ty);
        Ok(value)
    }

    /// Read a property of an object
    pub fn get_property(&self, ctx: &C, this: &ScriptValue, name: &str) -> ScriptResult<ScriptValue> {
        let property = self.object_property(this, name)?;
        (property.getter)(ctx, this)
    }

    /// Write a property of an object
    pub fn set_property(
        &self,
        ctx: &C,
        this: &ScriptValue,
        name: &str,
        value: ScriptValue,
    ) -> ScriptResult<()> {
        let property = self.object_property(this, name)?;
        let setter = property
            .setter
            .as_ref()
            .ok_or_else(|| ScriptError::ReadOnlyProperty(name.to_string()))?;
        let value = self.coerce(value, &property.ty, 0)?;
        setter(ctx, this, value)
    }

    /// Call a method on an object
    pub fn call_method(
        &self,
        ctx: &C,
        this: &ScriptValue,
        name: &str,
        args: Vec<ScriptValue>,
    ) -> ScriptResult<ScriptValue> {
        let entry = self.object_entry(this)?;
        let overloads = entry
            .methods
            .get(name)
            .ok_or_else(|| ScriptError::UnknownSymbol(name.to_string()))?;

        let mut last_error = None;
        for method in overloads {
            match self.bind_args(&method.signature, args.clone()) {
                Ok(call_args) => return (method.native)(ctx, this, &call_args),
                Err(err) => last_error = Some(err),
            }
        }
        Err(self.no_match(name, overloads.len(), last_error))
    }

    /// Construct an instance of a value type
    pub fn construct(&self, ctx: &C, type_name: &str, args: Vec<ScriptValue>) -> ScriptResult<ScriptValue> {
        let entry = self
            .object_types
            .get(type_name)
            .ok_or_else(|| ScriptError::UnknownSymbol(type_name.to_string()))?;

        let mut last_error = None;
        for constructor in &entry.constructors {
            match self.bind_args(&constructor.signature, args.clone()) {
                Ok(call_args) => return (constructor.native)(ctx, &call_args),
                Err(err) => last_error = Some(err),
            }
        }
        Err(self.no_match(type_name, entry.constructors.len(), last_error))
    }

    fn object_entry(&self, this: &ScriptValue) -> ScriptResult<&ObjectTypeEntry<C>> {
        let type_name = match this {
            ScriptValue::Handle(handle) => handle.type_name(),
            ScriptValue::Object(object) => object.type_name(),
            ScriptValue::Null => return Err(ScriptError::NullHandle),
            other => {
                return Err(ScriptError::TypeMismatch {
                    expected: "object".into(),
                    found: other.type_name(),
                })
            }
        };
        self.object_types
            .get(type_name)
            .ok_or_else(|| ScriptError::UnknownSymbol(type_name.to_string()))
    }

    fn object_property(&self, this: &ScriptValue, name: &str) -> ScriptResult<&ObjectProperty<C>> {
        self.object_entry(this)?
            .properties
            .get(name)
            .ok_or_else(|| ScriptError::UnknownSymbol(name.to_string()))
    }

    fn no_match(&self, name: &str, candidates: usize, last_error: Option<ScriptError>) -> ScriptError {
        match last_error {
            Some(err) if candidates == 1 => err,
            _ => ScriptError::NoMatchingSignature {
                name: name.to_string(),
                reason: format!("none of {} overloads accepts the arguments", candidates),
            },
        }
    }

    fn bind_args(&self, signature: &Signature, mut args: Vec<ScriptValue>) -> ScriptResult<CallArgs> {
        let fixed = signature.params.len();
        if args.len() < signature.required_count() {
            return Err(ScriptError::NoMatchingSignature {
                name: signature.name.clone(),
                reason: format!(
                    "expected at least {} arguments, got {}",
                    signature.required_count(),
                    args.len()
                ),
            });
        }

        let variadic = match signature.variadic {
            Some(max) => {
                let rest = if args.len() > fixed {
                    args.split_off(fixed)
                } else {
                    Vec::new()
                };
                Some(VariadicArgs::padded(max, rest).map_err(|_| {
                    ScriptError::NoMatchingSignature {
                        name: signature.name.clone(),
                        reason: format!("too many variadic arguments (max {})", max),
                    }
                })?)
            }
            None if args.len() > fixed => {
                return Err(ScriptError::NoMatchingSignature {
                    name: signature.name.clone(),
                    reason: format!("expected at most {} arguments, got {}", fixed, args.len()),
                })
            }
            None => None,
        };

        let values = args
            .into_iter()
            .zip(&signature.params)
            .enumerate()
            .map(|(index, (value, param))| self.coerce(value, &param.ty, index))
            .collect::<ScriptResult<Vec<_>>>()?;

        Ok(CallArgs { values, variadic })
    }

    /// Implicit conversion of an argument into a parameter slot
    fn coerce(&self, value: ScriptValue, ty: &ScriptType, index: usize) -> ScriptResult<ScriptValue> {
        let mismatch = |value: &ScriptValue| ScriptError::InvalidArgument {
            index,
            message: format!("expected {}, found {}", ty, value.type_name()),
        };

        match ty {
            ScriptType::Variadic => Ok(value),
            ScriptType::Any => match value {
                ScriptValue::Any(_) => Ok(value),
                other => Ok(ScriptValue::Any(Box::new(other))),
            },
            ty if ty.is_numeric() => value.cast_numeric(ty).ok_or_else(|| mismatch(&value)),
            ScriptType::Enum(_) => value
                .cast_numeric(&ScriptType::Int32)
                .ok_or_else(|| mismatch(&value)),
            ScriptType::Handle(expected) => {
                let accepted = match &value {
                    ScriptValue::Null => true,
                    ScriptValue::Handle(handle) => self.is_subtype(handle.type_name(), expected),
                    _ => false,
                };
                if accepted {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
            ScriptType::FuncDef(expected) => {
                let accepted = match &value {
                    ScriptValue::Null => true,
                    ScriptValue::Function(function) => {
                        function.funcdef().map_or(true, |fd| fd == expected)
                    }
                    _ => false,
                };
                if accepted {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
            ScriptType::Value(expected) => {
                if matches!(value.as_object(), Some(object) if object.type_name() == expected) {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
            _ => {
                if value.script_type().as_ref() == Some(ty) {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
        }
    }
}

// Natives are shared through `Arc`; `C` itself need not be `Clone`.
impl<C> Clone for FunctionEntry<C> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            native: self.native.clone(),
        }
    }
}

impl<C> Clone for MethodEntry<C> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            native: self.native.clone(),
        }
    }
}

impl<C> Clone for GlobalProperty<C> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            getter: self.getter.clone(),
        }
    }
}

impl<C> Clone for ObjectProperty<C> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<C> Clone for ObjectTypeEntry<C> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            base: self.base.clone(),
            properties: self.properties.clone(),
            constructors: self.constructors.clone(),
            methods: self.methods.clone(),
        }
    }
}

/// Copy of the symbol table, used to stage registrations that may fail
impl<C> Clone for Engine<C> {
    fn clone(&self) -> Self {
        Self {
            functions: self.functions.clone(),
            properties: self.properties.clone(),
            funcdefs: self.funcdefs.clone(),
            enums: self.enums.clone(),
            object_types: self.object_types.clone(),
            symbol_count: self.symbol_count,
        }
    }
}

impl<C> Default for Engine<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
