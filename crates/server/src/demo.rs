//! Demo world and the handlers a resource script would install on start

use asbridge_core::{DynamicValue, Vector3f};
use asbridge_host::{joaat, HostRuntime, MemoryHost, ResourceInfo};
use asbridge_scripting::{ScriptFunction, ScriptResult, ScriptValue};
use asbridge_bindings::ScriptRuntime;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

const HEARTBEAT: &str = "demo:heartbeat";

pub fn host(resource: &str) -> asbridge_core::Result<MemoryHost> {
    let host = MemoryHost::new();
    host.add_resource(ResourceInfo {
        name: resource.to_string(),
        main: "main.as".into(),
        path: format!("resources/{}", resource),
        started: true,
    });
    host.add_file(resource, "motd.txt", "Welcome to the demo resource");

    host.spawn_player("alice")?;
    host.spawn_player("bob")?;
    host.spawn_vehicle(joaat("adder"), Vector3f::new(10.0, 0.0, 72.0))?;
    host.spawn_checkpoint(Vector3f::new(120.0, -40.0, 71.5))?;
    Ok(host)
}

pub fn attach(runtime: &ScriptRuntime, host: Arc<MemoryHost>) -> ScriptResult<()> {
    let motd = runtime.call("ReadFile", vec!["motd.txt".into()])?;
    runtime.call("Log", vec![motd])?;

    let names = host.clone();
    let on_connect = ScriptFunction::new("onPlayerConnect", move |args| {
        if let Some(handle) = args.first().and_then(ScriptValue::as_handle) {
            let name = names.player_name(handle.entity()).unwrap_or_default();
            info!(target: "script", "{} joined", name);
        }
        Ok(ScriptValue::Void)
    });
    runtime.call("OnPlayerConnect", vec![on_connect.into()])?;

    let beats = Arc::new(AtomicU64::new(0));
    let emitter = host.clone();
    let heartbeat = ScriptFunction::new("heartbeat", move |_| {
        let beat = beats.fetch_add(1, Ordering::Relaxed) + 1;
        emitter.trigger_local_event(HEARTBEAT, vec![DynamicValue::UInt(beat)]);
        Ok(ScriptValue::Void)
    });
    runtime.call("SetInterval", vec![heartbeat.into(), ScriptValue::UInt32(1000)])?;

    let on_heartbeat = ScriptFunction::new("onHeartbeat", |args| {
        let count = args
            .first()
            .and_then(ScriptValue::as_array)
            .map_or(0, |array| array.len());
        info!(target: "script", "Heartbeat with {} args", count);
        Ok(ScriptValue::Void)
    });
    runtime.call("On", vec![HEARTBEAT.into(), on_heartbeat.into()])?;

    let players = runtime.call("GetAllPlayers", vec![])?;
    let count = players.as_array().map_or(0, |array| array.len());
    info!(target: "script", "{} players online", count);
    Ok(())
}
