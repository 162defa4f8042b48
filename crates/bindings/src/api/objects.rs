//! # Object Types
//!
//! Host object classes exposed to scripts. Each class is described by an
//! [`EntityClass`] and composes the capability sets of its parents: a
//! `Player` gets the `BaseObject`, `WorldObject` and `Entity` members
//! registered directly on its own type, in that order.

use crate::context::{host_error, BindingContext};
use asbridge_core::{EntityKind, Vector3f};
use asbridge_scripting::{
    ObjectKind, Registrar, Result, ScriptError, ScriptObject, ScriptResult, ScriptType, ScriptValue,
};

type Reg<'a> = Registrar<'a, BindingContext>;

/// Script class of a host object
pub trait EntityClass {
    const NAME: &'static str;
    const BASE: Option<&'static str>;
    const DESCRIPTION: &'static str;
}

pub struct BaseObjectClass;
pub struct WorldObjectClass;
pub struct EntityBaseClass;
pub struct PlayerClass;
pub struct VehicleClass;
pub struct CheckpointClass;

impl EntityClass for BaseObjectClass {
    const NAME: &'static str = "BaseObject";
    const BASE: Option<&'static str> = None;
    const DESCRIPTION: &'static str = "Base class of every host object";
}

impl EntityClass for WorldObjectClass {
    const NAME: &'static str = "WorldObject";
    const BASE: Option<&'static str> = Some("BaseObject");
    const DESCRIPTION: &'static str = "Object with a position in the world";
}

impl EntityClass for EntityBaseClass {
    const NAME: &'static str = "Entity";
    const BASE: Option<&'static str> = Some("WorldObject");
    const DESCRIPTION: &'static str = "Networked world object with a model";
}

impl EntityClass for PlayerClass {
    const NAME: &'static str = "Player";
    const BASE: Option<&'static str> = Some("Entity");
    const DESCRIPTION: &'static str = "A connected player";
}

impl EntityClass for VehicleClass {
    const NAME: &'static str = "Vehicle";
    const BASE: Option<&'static str> = Some("Entity");
    const DESCRIPTION: &'static str = "A vehicle";
}

impl EntityClass for CheckpointClass {
    const NAME: &'static str = "Checkpoint";
    const BASE: Option<&'static str> = Some("WorldObject");
    const DESCRIPTION: &'static str = "A checkpoint marker";
}

pub const VECTOR3F: &str = "Vector3f";
pub const VECTOR3F_FIELDS: [&str; 3] = ["x", "y", "z"];

/// Fields of a registered value type, in declaration order
pub fn value_layout(type_name: &str) -> Option<Vec<(&'static str, ScriptType)>> {
    match type_name {
        VECTOR3F => Some(
            VECTOR3F_FIELDS
                .iter()
                .map(|field| (*field, ScriptType::Float))
                .collect(),
        ),
        _ => None,
    }
}

pub fn vector_to_script(v: Vector3f) -> ScriptValue {
    ScriptValue::Object(
        ScriptObject::new(VECTOR3F)
            .with_field("x", ScriptValue::Float(v.x))
            .with_field("y", ScriptValue::Float(v.y))
            .with_field("z", ScriptValue::Float(v.z)),
    )
}

pub fn vector_from_script(value: &ScriptValue) -> ScriptResult<Vector3f> {
    let object = match value {
        ScriptValue::Object(object) if object.type_name() == VECTOR3F => object,
        other => {
            return Err(ScriptError::TypeMismatch {
                expected: VECTOR3F.into(),
                found: other.type_name(),
            })
        }
    };
    let component = |name: &str| -> ScriptResult<f32> {
        object
            .field(name)
            .and_then(ScriptValue::as_f64)
            .map(|v| v as f32)
            .ok_or_else(|| ScriptError::RuntimeError(format!("Vector3f is missing {}", name)))
    };
    Ok(Vector3f::new(component("x")?, component("y")?, component("z")?))
}

fn register_class<T: EntityClass>(reg: &mut Reg<'_>) -> Result<()> {
    reg.object_type(T::NAME, ObjectKind::Ref, T::BASE, T::DESCRIPTION)
}

/// Id, type, validity and meta data
pub fn register_base_object<T: EntityClass>(reg: &mut Reg<'_>) -> Result<()> {
    reg.object_property(T::NAME, "uint id", "Id of the object", |ctx, this| {
        Ok(ScriptValue::UInt32(ctx.entity(this)?.id.get()))
    })?;
    reg.object_property(
        T::NAME,
        "BaseObjectType type",
        "Type of the object",
        |ctx, this| Ok(ScriptValue::Int32(ctx.entity(this)?.kind as i32)),
    )?;
    reg.object_property(
        T::NAME,
        "bool valid",
        "Whether the object still exists",
        |ctx, this| Ok(ScriptValue::Bool(ctx.entity(this).is_ok())),
    )?;

    reg.object_method(
        T::NAME,
        "any@ GetMeta(const string&in key) const",
        "Gets the meta data value with the given key",
        |ctx, this, args| {
            let entity = ctx.entity(this)?;
            match ctx.host().get_meta(entity, args.string(0)?).map_err(host_error)? {
                Some(value) => ctx.converter().to_script(&value, &ScriptType::Any),
                None => Ok(ScriptValue::Null),
            }
        },
    )?;
    reg.object_method(
        T::NAME,
        "void SetMeta(const string&in key, any@ value)",
        "Sets the meta data value with the given key",
        |ctx, this, args| {
            let entity = ctx.entity(this)?;
            let value = ctx.converter().to_host(args.value(1)?)?;
            ctx.host()
                .set_meta(entity, args.string(0)?, value)
                .map_err(host_error)?;
            Ok(ScriptValue::Void)
        },
    )?;
    reg.object_method(
        T::NAME,
        "bool HasMeta(const string&in key) const",
        "Returns whether meta data with the given key exists",
        |ctx, this, args| {
            let entity = ctx.entity(this)?;
            let exists = ctx
                .host()
                .has_meta(entity, args.string(0)?)
                .map_err(host_error)?;
            Ok(ScriptValue::Bool(exists))
        },
    )?;
    reg.object_method(
        T::NAME,
        "void DeleteMeta(const string&in key)",
        "Deletes the meta data with the given key",
        |ctx, this, args| {
            let entity = ctx.entity(this)?;
            ctx.host()
                .delete_meta(entity, args.string(0)?)
                .map_err(host_error)?;
            Ok(ScriptValue::Void)
        },
    )
}

/// Base object members plus position and dimension
pub fn register_world_object<T: EntityClass>(reg: &mut Reg<'_>) -> Result<()> {
    register_base_object::<T>(reg)?;

    reg.object_property_rw(
        T::NAME,
        "Vector3f pos",
        "Position of the object",
        |ctx, this| {
            let position = ctx.host().position(ctx.entity(this)?).map_err(host_error)?;
            Ok(vector_to_script(position))
        },
        |ctx, this, value| {
            let entity = ctx.entity(this)?;
            ctx.host()
                .set_position(entity, vector_from_script(&value)?)
                .map_err(host_error)
        },
    )?;
    reg.object_property_rw(
        T::NAME,
        "int dimension",
        "Dimension of the object",
        |ctx, this| {
            let dimension = ctx.host().dimension(ctx.entity(this)?).map_err(host_error)?;
            Ok(ScriptValue::Int32(dimension))
        },
        |ctx, this, value| {
            let entity = ctx.entity(this)?;
            let dimension = value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| ScriptError::TypeMismatch {
                    expected: "int".into(),
                    found: value.type_name(),
                })?;
            ctx.host()
                .set_dimension(entity, dimension)
                .map_err(host_error)
        },
    )
}

/// World object members plus rotation and model
pub fn register_entity<T: EntityClass>(reg: &mut Reg<'_>) -> Result<()> {
    register_world_object::<T>(reg)?;

    reg.object_property_rw(
        T::NAME,
        "Vector3f rot",
        "Rotation of the entity",
        |ctx, this| {
            let rotation = ctx.host().rotation(ctx.entity(this)?).map_err(host_error)?;
            Ok(vector_to_script(rotation))
        },
        |ctx, this, value| {
            let entity = ctx.entity(this)?;
            ctx.host()
                .set_rotation(entity, vector_from_script(&value)?)
                .map_err(host_error)
        },
    )?;
    reg.object_property(T::NAME, "uint model", "Model hash of the entity", |ctx, this| {
        let model = ctx.host().model(ctx.entity(this)?).map_err(host_error)?;
        Ok(ScriptValue::UInt32(model))
    })
}

/// Entity members plus the player name
pub fn register_player<T: EntityClass>(reg: &mut Reg<'_>) -> Result<()> {
    register_entity::<T>(reg)?;

    reg.object_property(T::NAME, "string name", "Name of the player", |ctx, this| {
        let name = ctx.host().player_name(ctx.entity(this)?).map_err(host_error)?;
        Ok(ScriptValue::String(name))
    })
}

fn register_vector(reg: &mut Reg<'_>) -> Result<()> {
    reg.object_type(VECTOR3F, ObjectKind::Value, None, "Three component float vector")?;
    for component in VECTOR3F_FIELDS {
        let declaration = format!("float {}", component);
        reg.object_property(VECTOR3F, &declaration, "", move |_, this| {
            this.as_object()
                .and_then(|object| object.field(component).cloned())
                .ok_or_else(|| ScriptError::UnknownSymbol(component.to_string()))
        })?;
    }
    reg.object_constructor(VECTOR3F, "float x, float y, float z", "", |_, args| {
        Ok(vector_to_script(Vector3f::new(
            args.float(0)?,
            args.float(1)?,
            args.float(2)?,
        )))
    })?;
    reg.object_method(
        VECTOR3F,
        "float DistanceTo(Vector3f other) const",
        "Distance to another vector",
        |_, this, args| {
            let a = vector_from_script(this)?;
            let b = vector_from_script(args.value(0)?)?;
            Ok(ScriptValue::Float(a.distance_to(b)))
        },
    )
}

fn register_object_type_enum(reg: &mut Reg<'_>) -> Result<()> {
    reg.enum_type("BaseObjectType", "Type of a host object")?;
    for kind in [EntityKind::Player, EntityKind::Vehicle, EntityKind::Checkpoint] {
        reg.enum_value(
            "BaseObjectType",
            &kind.type_name().to_ascii_uppercase(),
            kind as i64,
        )?;
    }
    Ok(())
}

/// Register every object type, parents before children
pub fn register(reg: &mut Reg<'_>) -> Result<()> {
    register_object_type_enum(reg)?;
    register_vector(reg)?;

    register_class::<BaseObjectClass>(reg)?;
    register_base_object::<BaseObjectClass>(reg)?;

    register_class::<WorldObjectClass>(reg)?;
    register_world_object::<WorldObjectClass>(reg)?;

    register_class::<EntityBaseClass>(reg)?;
    register_entity::<EntityBaseClass>(reg)?;

    register_class::<PlayerClass>(reg)?;
    register_player::<PlayerClass>(reg)?;

    register_class::<VehicleClass>(reg)?;
    register_entity::<VehicleClass>(reg)?;

    register_class::<CheckpointClass>(reg)?;
    register_world_object::<CheckpointClass>(reg)
}
