//! Global functions and properties of the `alt` module

use crate::context::{host_error, BindingContext};
use crate::timers::TimerId;
use asbridge_core::{DynamicValue, DEFAULT_DIMENSION, GLOBAL_DIMENSION};
use asbridge_scripting::{
    CallArgs, Registrar, Result, ScriptError, ScriptResult, ScriptType, ScriptValue,
    MAX_VARIADIC_ARGS,
};
use tracing::{error, info, warn};

type Reg<'a> = Registrar<'a, BindingContext>;

/// Timers start at the runtime clock; hosts calling in between ticks move
/// it forward with `ScriptRuntime::set_clock` first
fn create_timer(
    ctx: &BindingContext,
    args: &CallArgs,
    interval: Option<u32>,
    repeat: bool,
) -> ScriptResult<ScriptValue> {
    let callback = args.function(0)?;
    let interval = match interval {
        Some(interval) => interval,
        None => args.uint(1)?,
    };
    let id = ctx.timers().create(callback, interval, repeat, ctx.now())?;
    Ok(ScriptValue::UInt32(id.get()))
}

fn register_generic(reg: &mut Reg<'_>) -> Result<()> {
    reg.global_function(
        "uint Hash(const string &in value)",
        "Hashes the given string using the joaat algorithm",
        |ctx, args| Ok(ScriptValue::UInt32(ctx.host().hash(args.string(0)?))),
    )?;
    reg.global_function(
        "array<Player@>@ GetAllPlayers()",
        "Gets all players on the server",
        |ctx, _| Ok(ctx.bridge().snapshot(ctx.host(), ctx.host().players(), "Player")),
    )?;
    reg.global_function(
        "array<Entity@>@ GetAllEntities()",
        "Gets all entities on the server",
        |ctx, _| Ok(ctx.bridge().snapshot(ctx.host(), ctx.host().entities(), "Entity")),
    )?;
    reg.global_function(
        "array<Vehicle@>@ GetAllVehicles()",
        "Gets all vehicles on the server",
        |ctx, _| Ok(ctx.bridge().snapshot(ctx.host(), ctx.host().vehicles(), "Vehicle")),
    )?;
    reg.global_property("int defaultDimension", "Default dimension", |_| {
        Ok(ScriptValue::Int32(DEFAULT_DIMENSION))
    })?;
    reg.global_property("int globalDimension", "Dimension visible from every dimension", |_| {
        Ok(ScriptValue::Int32(GLOBAL_DIMENSION))
    })?;
    reg.global_property("string version", "Server version", |ctx| {
        Ok(ScriptValue::String(ctx.host().server_info().version))
    })?;
    reg.global_property("string branch", "Server branch", |ctx| {
        Ok(ScriptValue::String(ctx.host().server_info().branch))
    })?;
    reg.global_property("uint sdkVersion", "Version of the server SDK", |ctx| {
        Ok(ScriptValue::UInt32(ctx.host().server_info().sdk_version))
    })
}

fn register_filesystem(reg: &mut Reg<'_>) -> Result<()> {
    reg.global_function(
        "string ReadFile(const string&in path)",
        "Reads the specified file contents",
        |ctx, args| {
            let contents = ctx
                .host()
                .read_file(ctx.resource_name(), args.string(0)?)
                .map_err(host_error)?
                .ok_or_else(|| ScriptError::RuntimeError("File not found".into()))?;
            let text = String::from_utf8(contents).map_err(|_| ScriptError::Conversion {
                from: "bytes".into(),
                to: "string".into(),
            })?;
            Ok(ScriptValue::String(text))
        },
    )?;
    reg.global_function(
        "bool FileExists(const string&in path)",
        "Checks if the given file exists",
        |ctx, args| {
            let exists = matches!(
                ctx.host().read_file(ctx.resource_name(), args.string(0)?),
                Ok(Some(_))
            );
            Ok(ScriptValue::Bool(exists))
        },
    )?;
    reg.global_property("string rootDir", "Root directory of the server", |ctx| {
        Ok(ScriptValue::String(ctx.host().server_info().root_dir))
    })
}

fn register_resources(reg: &mut Reg<'_>) -> Result<()> {
    reg.global_function(
        "string GetResourcePath(const string&in name)",
        "Gets the path to the specified resource",
        |ctx, args| {
            let resource = ctx
                .host()
                .resource(args.string(0)?)
                .ok_or_else(|| ScriptError::RuntimeError("Resource not found".into()))?;
            Ok(ScriptValue::String(resource.path))
        },
    )?;
    reg.global_function(
        "bool HasResource(const string&in name)",
        "Returns whether the specified resource exists and is started",
        |ctx, args| {
            let started = ctx
                .host()
                .resource(args.string(0)?)
                .map_or(false, |resource| resource.started);
            Ok(ScriptValue::Bool(started))
        },
    )?;
    reg.global_function(
        "void StartResource(const string&in name)",
        "Starts the specified resource",
        |ctx, args| {
            ctx.host()
                .start_resource(args.string(0)?)
                .map_err(host_error)?;
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "void StopResource(const string&in name)",
        "Stops the specified resource",
        |ctx, args| {
            ctx.host()
                .stop_resource(args.string(0)?)
                .map_err(host_error)?;
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "void RestartResource(const string&in name)",
        "Restarts the specified resource",
        |ctx, args| {
            ctx.host()
                .restart_resource(args.string(0)?)
                .map_err(host_error)?;
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "dictionary@ GetResourceExports(const string&in name)",
        "Gets the exports of the specified resource",
        |ctx, args| {
            let exports = ctx
                .host()
                .resource_exports(args.string(0)?)
                .map_err(host_error)?;
            ctx.converter()
                .to_script(&DynamicValue::Dict(exports), &ScriptType::Dictionary)
        },
    )?;
    reg.global_property("string resourceMain", "Main file of the current resource", |ctx| {
        Ok(ScriptValue::String(ctx.resource()?.main))
    })?;
    reg.global_property("string resourceName", "Name of the current resource", |ctx| {
        Ok(ScriptValue::String(ctx.resource_name().to_string()))
    })
}

fn register_server(reg: &mut Reg<'_>) -> Result<()> {
    reg.global_function(
        "uint GetNetTime()",
        "Gets the total time the server has been running for",
        |ctx, _| Ok(ScriptValue::UInt32(ctx.host().net_time())),
    )?;
    reg.global_function(
        "void SetPassword(const string&in password)",
        "Sets the current server password",
        |ctx, args| {
            ctx.host().set_password(args.string(0)?);
            Ok(ScriptValue::Void)
        },
    )
}

fn register_logging(reg: &mut Reg<'_>) -> Result<()> {
    reg.global_function(
        "void Log(const string&in msg)",
        "Logs the specified message to the console",
        |ctx, args| {
            let msg = args.string(0)?;
            info!(target: "script", resource = ctx.resource_name(), "{}", msg);
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "void LogWarning(const string&in msg)",
        "Logs the specified message as a warning to the console",
        |ctx, args| {
            let msg = args.string(0)?;
            warn!(target: "script", resource = ctx.resource_name(), "{}", msg);
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "void LogError(const string&in msg)",
        "Logs the specified message as an error to the console",
        |ctx, args| {
            let msg = args.string(0)?;
            error!(target: "script", resource = ctx.resource_name(), "{}", msg);
            Ok(ScriptValue::Void)
        },
    )
}

fn register_timers(reg: &mut Reg<'_>) -> Result<()> {
    reg.funcdef("void TimerCallback()", "Callback used for timers")?;
    reg.global_function(
        "uint SetTimeout(TimerCallback@ callback, uint timeout)",
        "Sets a timeout",
        |ctx, args| create_timer(ctx, args, None, false),
    )?;
    reg.global_function(
        "uint SetInterval(TimerCallback@ callback, uint interval)",
        "Sets a interval",
        |ctx, args| create_timer(ctx, args, None, true),
    )?;
    reg.global_function(
        "uint NextTick(TimerCallback@ callback)",
        "Sets a next tick handler",
        |ctx, args| create_timer(ctx, args, Some(0), false),
    )?;
    reg.global_function(
        "uint EveryTick(TimerCallback@ callback)",
        "Sets a every tick handler",
        |ctx, args| create_timer(ctx, args, Some(0), true),
    )?;
    for name in [
        "ClearTimeout",
        "ClearInterval",
        "ClearNextTick",
        "ClearEveryTick",
        "ClearTimer",
    ] {
        reg.global_function(
            &format!("void {}(uint timerId)", name),
            "Clears specified timer",
            |ctx, args| {
                ctx.timers().cancel(TimerId::from(args.uint(0)?));
                Ok(ScriptValue::Void)
            },
        )?;
    }
    Ok(())
}

fn register_events(reg: &mut Reg<'_>) -> Result<()> {
    reg.funcdef(
        "void LocalEventCallback(array<any> args)",
        "Event callback used for custom events",
    )?;
    reg.funcdef(
        "void RemoteEventCallback(Player@ player, array<any>@ args)",
        "Event callback used for custom events",
    )?;
    reg.global_function(
        "void On(const string&in event, LocalEventCallback@ callback)",
        "Registers an event handler for a local custom event",
        |ctx, args| {
            ctx.events()
                .local
                .add(args.string(0)?.to_string(), args.function(1)?);
            Ok(ScriptValue::Void)
        },
    )?;
    reg.global_function(
        "void OnClient(const string&in event, RemoteEventCallback@ callback)",
        "Registers an event handler for a remote custom event",
        |ctx, args| {
            ctx.events()
                .remote
                .add(args.string(0)?.to_string(), args.function(1)?);
            Ok(ScriptValue::Void)
        },
    )?;
    reg.variadic_function(
        "void",
        "Emit",
        "const string&in event",
        MAX_VARIADIC_ARGS,
        "Emits a local event (Max 32 args)",
        |ctx, args| {
            let name = args.string(0)?;
            let values = match args.variadic() {
                Some(slots) => ctx.converter().variadic_to_host(slots)?,
                None => Vec::new(),
            };
            ctx.host().trigger_local_event(name, values);
            Ok(ScriptValue::Void)
        },
    )
}

/// Register the global API
pub fn register(reg: &mut Reg<'_>) -> Result<()> {
    register_generic(reg)?;
    register_filesystem(reg)?;
    register_resources(reg)?;
    register_server(reg)?;
    register_logging(reg)?;
    register_timers(reg)?;
    register_events(reg)
}
