//! Host lifecycle events
//!
//! Each event is a callback funcdef plus the global function subscribing
//! to it. The runtime calls the handlers from `dispatch_host_event`.

use crate::context::BindingContext;
use crate::events::HostEventKind;
use asbridge_scripting::{CallArgs, Registrar, Result, ScriptResult, ScriptValue};

type Reg<'a> = Registrar<'a, BindingContext>;

fn subscribe(
    kind: HostEventKind,
) -> impl Fn(&BindingContext, &CallArgs) -> ScriptResult<ScriptValue> + Send + Sync + 'static {
    move |ctx, args| {
        ctx.events().host.add(kind, args.function(0)?);
        Ok(ScriptValue::Void)
    }
}

pub fn register(reg: &mut Reg<'_>) -> Result<()> {
    reg.event(
        "void PlayerConnectCallback(Player@ player)",
        "void OnPlayerConnect(PlayerConnectCallback@ callback)",
        "Called when a player connects",
        subscribe(HostEventKind::PlayerConnect),
    )?;
    reg.event(
        "void PlayerDisconnectCallback(Player@ player, const string&in reason)",
        "void OnPlayerDisconnect(PlayerDisconnectCallback@ callback)",
        "Called when a player disconnects",
        subscribe(HostEventKind::PlayerDisconnect),
    )?;
    reg.event(
        "void ResourceStartCallback(const string&in resource)",
        "void OnResourceStart(ResourceStartCallback@ callback)",
        "Called when a resource starts",
        subscribe(HostEventKind::ResourceStart),
    )?;
    reg.event(
        "void ResourceStopCallback(const string&in resource)",
        "void OnResourceStop(ResourceStopCallback@ callback)",
        "Called when a resource stops",
        subscribe(HostEventKind::ResourceStop),
    )
}
