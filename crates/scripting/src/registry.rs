//! Registration layer
//!
//! [`Registrar`] is the only way to put symbols into an [`Engine`]. Every
//! call installs the symbol first and records its documentation entry only
//! once the install succeeded, so the engine and the documentation always
//! describe the same set of symbols.

use crate::docs::DocsGenerator;
use crate::engine::{CallArgs, Engine, ObjectKind};
use crate::error::{Result, ScriptResult};
use crate::value::ScriptValue;
use std::sync::Arc;
use tracing::debug;

/// Documentation entry for one installed symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationRecord {
    GlobalFunction {
        declaration: String,
        description: String,
    },
    GlobalProperty {
        declaration: String,
        description: String,
    },
    FuncDef {
        declaration: String,
        description: String,
    },
    /// Callback funcdef paired with the global function subscribing to it
    EventDeclaration {
        funcdef: String,
        declaration: String,
        description: String,
    },
    ObjectType {
        name: String,
        description: String,
    },
    ObjectProperty {
        owner: String,
        declaration: String,
        description: String,
    },
    ObjectConstructor {
        owner: String,
        params: String,
        description: String,
    },
    ObjectMethod {
        owner: String,
        declaration: String,
        description: String,
    },
    EnumType {
        name: String,
        description: String,
    },
    EnumValue {
        owner: String,
        name: String,
        value: i64,
    },
}

impl RegistrationRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GlobalFunction { .. } => "function",
            Self::GlobalProperty { .. } => "property",
            Self::FuncDef { .. } => "funcdef",
            Self::EventDeclaration { .. } => "event",
            Self::ObjectType { .. } => "object type",
            Self::ObjectProperty { .. } => "object property",
            Self::ObjectConstructor { .. } => "object constructor",
            Self::ObjectMethod { .. } => "object method",
            Self::EnumType { .. } => "enum",
            Self::EnumValue { .. } => "enum value",
        }
    }

    /// Owning type of member records
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::ObjectProperty { owner, .. }
            | Self::ObjectConstructor { owner, .. }
            | Self::ObjectMethod { owner, .. }
            | Self::EnumValue { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// Number of engine symbols this record stands for
    pub fn symbol_count(&self) -> usize {
        match self {
            Self::EventDeclaration { .. } => 2,
            _ => 1,
        }
    }
}

/// Installs symbols into an engine and documents them
pub struct Registrar<'a, C> {
    engine: &'a mut Engine<C>,
    docs: &'a mut DocsGenerator,
}

impl<'a, C: 'static> Registrar<'a, C> {
    pub fn new(engine: &'a mut Engine<C>, docs: &'a mut DocsGenerator) -> Self {
        Self { engine, docs }
    }

    pub fn global_function<F>(&mut self, declaration: &str, description: &str, f: F) -> Result<()>
    where
        F: Fn(&C, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine.install_function(declaration, Arc::new(f))?;
        debug!(target: "scripting", "Registered function {}", declaration);
        self.docs.push(RegistrationRecord::GlobalFunction {
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Register a function taking up to `max_args` trailing values of any type
    ///
    /// The documented declaration marks the trailing slots as `?&in`.
    pub fn variadic_function<F>(
        &mut self,
        return_type: &str,
        name: &str,
        fixed_params: &str,
        max_args: usize,
        description: &str,
        f: F,
    ) -> Result<()>
    where
        F: Fn(&C, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine
            .install_variadic(return_type, name, fixed_params, max_args, Arc::new(f))?;
        let declaration = if fixed_params.trim().is_empty() {
            format!("{} {}(?&in ...)", return_type, name)
        } else {
            format!("{} {}({}, ?&in ...)", return_type, name, fixed_params)
        };
        debug!(target: "scripting", "Registered variadic function {}", declaration);
        self.docs.push(RegistrationRecord::GlobalFunction {
            declaration,
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn global_property<F>(&mut self, declaration: &str, description: &str, getter: F) -> Result<()>
    where
        F: Fn(&C) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine
            .install_global_property(declaration, Arc::new(getter))?;
        debug!(target: "scripting", "Registered global {}", declaration);
        self.docs.push(RegistrationRecord::GlobalProperty {
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn funcdef(&mut self, declaration: &str, description: &str) -> Result<()> {
        self.engine.install_funcdef(declaration)?;
        debug!(target: "scripting", "Registered funcdef {}", declaration);
        self.docs.push(RegistrationRecord::FuncDef {
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Register an event: its callback funcdef and the function subscribing to it
    pub fn event<F>(
        &mut self,
        funcdef: &str,
        declaration: &str,
        description: &str,
        subscribe: F,
    ) -> Result<()>
    where
        F: Fn(&C, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        let checkpoint = self.engine.clone();
        self.engine.install_funcdef(funcdef)?;
        if let Err(err) = self.engine.install_function(declaration, Arc::new(subscribe)) {
            *self.engine = checkpoint;
            return Err(err);
        }
        debug!(target: "scripting", "Registered event {}", declaration);
        self.docs.push(RegistrationRecord::EventDeclaration {
            funcdef: funcdef.to_string(),
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn object_type(
        &mut self,
        name: &str,
        kind: ObjectKind,
        base: Option<&str>,
        description: &str,
    ) -> Result<()> {
        self.engine.install_object_type(name, kind, base)?;
        debug!(target: "scripting", "Registered object type {}", name);
        self.docs.push(RegistrationRecord::ObjectType {
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Register a read-only property
    pub fn object_property<G>(
        &mut self,
        owner: &str,
        declaration: &str,
        description: &str,
        getter: G,
    ) -> Result<()>
    where
        G: Fn(&C, &ScriptValue) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine
            .install_object_property(owner, declaration, Arc::new(getter), None)?;
        self.record_property(owner, declaration, description);
        Ok(())
    }

    /// Register a property with both accessors
    pub fn object_property_rw<G, S>(
        &mut self,
        owner: &str,
        declaration: &str,
        description: &str,
        getter: G,
        setter: S,
    ) -> Result<()>
    where
        G: Fn(&C, &ScriptValue) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
        S: Fn(&C, &ScriptValue, ScriptValue) -> ScriptResult<()> + Send + Sync + 'static,
    {
        self.engine.install_object_property(
            owner,
            declaration,
            Arc::new(getter),
            Some(Arc::new(setter)),
        )?;
        self.record_property(owner, declaration, description);
        Ok(())
    }

    fn record_property(&mut self, owner: &str, declaration: &str, description: &str) {
        debug!(target: "scripting", "Registered property {}::{}", owner, declaration);
        self.docs.push(RegistrationRecord::ObjectProperty {
            owner: owner.to_string(),
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
    }

    pub fn object_constructor<F>(
        &mut self,
        owner: &str,
        params: &str,
        description: &str,
        f: F,
    ) -> Result<()>
    where
        F: Fn(&C, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine.install_constructor(owner, params, Arc::new(f))?;
        debug!(target: "scripting", "Registered constructor {}({})", owner, params);
        self.docs.push(RegistrationRecord::ObjectConstructor {
            owner: owner.to_string(),
            params: params.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn object_method<F>(
        &mut self,
        owner: &str,
        declaration: &str,
        description: &str,
        f: F,
    ) -> Result<()>
    where
        F: Fn(&C, &ScriptValue, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        self.engine.install_method(owner, declaration, Arc::new(f))?;
        debug!(target: "scripting", "Registered method {}::{}", owner, declaration);
        self.docs.push(RegistrationRecord::ObjectMethod {
            owner: owner.to_string(),
            declaration: declaration.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn enum_type(&mut self, name: &str, description: &str) -> Result<()> {
        self.engine.install_enum(name)?;
        debug!(target: "scripting", "Registered enum {}", name);
        self.docs.push(RegistrationRecord::EnumType {
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn enum_value(&mut self, owner: &str, name: &str, value: i64) -> Result<()> {
        self.engine.install_enum_value(owner, name, value)?;
        self.docs.push(RegistrationRecord::EnumValue {
            owner: owner.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }
}
