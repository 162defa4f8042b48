//! # Script Runtime
//!
//! Owns an engine, its binding context and the documentation of every
//! loaded module. The host drives it: calls, ticks and event dispatch all
//! run synchronously on the caller's thread.

use crate::context::BindingContext;
use crate::events::HostEvent;
use crate::module::Module;
use asbridge_core::{BridgeError, DynamicValue, EntityRef};
use asbridge_host::HostRuntime;
use asbridge_scripting::{
    DocsGenerator, Engine, ScriptFunction, ScriptResult, ScriptValue, VariadicArgs,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct ScriptRuntime {
    engine: Engine<BindingContext>,
    ctx: BindingContext,
    docs: Vec<DocsGenerator>,
    generate_docs: bool,
}

impl ScriptRuntime {
    /// Create a runtime for `resource` on `host`
    pub fn new(host: Arc<dyn HostRuntime>, resource: impl Into<String>) -> Self {
        let ctx = BindingContext::new(host, resource);
        debug!("Creating script runtime for {}", ctx.resource_name());

        Self {
            engine: Engine::new(),
            ctx,
            docs: Vec::new(),
            generate_docs: true,
        }
    }

    /// Enable or disable writing documentation files
    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.generate_docs = enabled;
        self
    }

    /// Install a module; any registration error aborts the load
    pub fn load_module(&mut self, module: &Module<BindingContext>) -> Result<(), BridgeError> {
        if self.docs.iter().any(|docs| docs.module() == module.name()) {
            return Err(BridgeError::Registration(format!(
                "Module {} is already loaded",
                module.name()
            )));
        }

        match module.register(&mut self.engine) {
            Ok(docs) => {
                info!(
                    "Loaded module {} into {}",
                    module.name(),
                    self.ctx.resource_name()
                );
                self.docs.push(docs);
                Ok(())
            }
            Err(err) => {
                error!("Failed to load module {}: {}", module.name(), err);
                Err(err.into())
            }
        }
    }

    pub fn engine(&self) -> &Engine<BindingContext> {
        &self.engine
    }

    pub fn context(&self) -> &BindingContext {
        &self.ctx
    }

    pub fn docs(&self) -> &[DocsGenerator] {
        &self.docs
    }

    pub fn call(&self, name: &str, args: Vec<ScriptValue>) -> ScriptResult<ScriptValue> {
        self.engine.call(&self.ctx, name, args)
    }

    pub fn call_variadic(
        &self,
        name: &str,
        fixed: Vec<ScriptValue>,
        slots: VariadicArgs,
    ) -> ScriptResult<ScriptValue> {
        self.engine.call_variadic(&self.ctx, name, fixed, slots)
    }

    pub fn get_global(&self, name: &str) -> ScriptResult<ScriptValue> {
        self.engine.get_global(&self.ctx, name)
    }

    pub fn get_property(&self, this: &ScriptValue, name: &str) -> ScriptResult<ScriptValue> {
        self.engine.get_property(&self.ctx, this, name)
    }

    pub fn set_property(&self, this: &ScriptValue, name: &str, value: ScriptValue) -> ScriptResult<()> {
        self.engine.set_property(&self.ctx, this, name, value)
    }

    pub fn call_method(
        &self,
        this: &ScriptValue,
        name: &str,
        args: Vec<ScriptValue>,
    ) -> ScriptResult<ScriptValue> {
        self.engine.call_method(&self.ctx, this, name, args)
    }

    pub fn construct(&self, type_name: &str, args: Vec<ScriptValue>) -> ScriptResult<ScriptValue> {
        self.engine.construct(&self.ctx, type_name, args)
    }

    /// Move the runtime clock without firing timers
    ///
    /// Timers created afterwards count from `now`. Call this before calling
    /// into scripts long after the last tick.
    pub fn set_clock(&self, now: Instant) {
        self.ctx.set_now(now);
    }

    /// Advance to `now`: fire due timers and drop released handles
    pub fn tick(&self, now: Instant) -> usize {
        self.ctx.set_now(now);
        let fired = self.ctx.timers().tick(now);
        let purged = self.ctx.bridge().purge();
        if purged > 0 {
            tracing::trace!("Purged {} released handles", purged);
        }
        fired
    }

    /// Call the local handlers of `name`, returning how many ran
    pub fn dispatch_local_event(&self, name: &str, args: &[DynamicValue]) -> usize {
        let handlers = self.ctx.events().local.snapshot(name);
        if handlers.is_empty() {
            return 0;
        }
        match self.ctx.converter().event_args(args) {
            Ok(args) => invoke_all(name, &handlers, &[args]),
            Err(err) => {
                error!(target: "script", "Cannot convert arguments of event {}: {}", name, err);
                0
            }
        }
    }

    /// Call the remote handlers of `name` for an event sent by `player`
    pub fn dispatch_remote_event(&self, player: EntityRef, name: &str, args: &[DynamicValue]) -> usize {
        let handlers = self.ctx.events().remote.snapshot(name);
        if handlers.is_empty() {
            return 0;
        }
        match self.ctx.converter().event_args(args) {
            Ok(args) => invoke_all(name, &handlers, &[self.ctx.handle(player), args]),
            Err(err) => {
                error!(target: "script", "Cannot convert arguments of event {}: {}", name, err);
                0
            }
        }
    }

    /// Call the handlers subscribed to a host lifecycle event
    pub fn dispatch_host_event(&self, event: &HostEvent) -> usize {
        let handlers = self.ctx.events().host.snapshot(&event.kind());
        let args = match event {
            HostEvent::PlayerConnect { player } => vec![self.ctx.handle(*player)],
            HostEvent::PlayerDisconnect { player, reason } => {
                vec![self.ctx.handle(*player), ScriptValue::String(reason.clone())]
            }
            HostEvent::ResourceStart { resource } | HostEvent::ResourceStop { resource } => {
                vec![ScriptValue::String(resource.clone())]
            }
        };
        invoke_all(&format!("{:?}", event.kind()), &handlers, &args)
    }

    /// Write one declaration file per loaded module into `dir`
    ///
    /// Returns no paths when documentation is disabled.
    pub fn export_docs(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, BridgeError> {
        if !self.generate_docs {
            debug!("Documentation disabled, skipping export");
            return Ok(Vec::new());
        }
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.docs
            .iter()
            .map(|docs| docs.write_to(dir).map_err(BridgeError::from))
            .collect()
    }
}

/// Run handlers in order; a failing handler does not stop the others
fn invoke_all(event: &str, handlers: &[ScriptFunction], args: &[ScriptValue]) -> usize {
    for handler in handlers {
        if let Err(err) = handler.invoke(args) {
            warn!(target: "script", "Handler {} of event {} failed: {}", handler.name(), event, err);
        }
    }
    handlers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::alt_module;
    use asbridge_core::Vector3f;
    use asbridge_host::{MemoryHost, ResourceInfo};
    use asbridge_scripting::{Registrar, ScriptError, MAX_VARIADIC_ARGS};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn setup() -> (Arc<MemoryHost>, ScriptRuntime) {
        let host = Arc::new(MemoryHost::new());
        host.add_resource(ResourceInfo {
            name: "race".into(),
            main: "main.as".into(),
            path: "resources/race".into(),
            started: true,
        });
        let mut runtime = ScriptRuntime::new(host.clone(), "race");
        runtime.load_module(&alt_module()).unwrap();
        (host, runtime)
    }

    fn counter() -> (Arc<AtomicUsize>, ScriptValue) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let callback = ScriptFunction::new("count", move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(ScriptValue::Void)
        });
        (count, callback.into())
    }

    fn recorder() -> (Arc<Mutex<Vec<Vec<ScriptValue>>>>, ScriptValue) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let inner = calls.clone();
        let callback = ScriptFunction::new("record", move |args| {
            inner.lock().push(args.to_vec());
            Ok(ScriptValue::Void)
        });
        (calls, callback.into())
    }

    fn players(runtime: &ScriptRuntime) -> Vec<ScriptValue> {
        match runtime.call("GetAllPlayers", vec![]).unwrap() {
            ScriptValue::Array(array) => array.into_items(),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_symbol_count_matches_docs() {
        let (_, runtime) = setup();
        let documented: usize = runtime.docs().iter().map(|d| d.symbol_count()).sum();
        assert_eq!(runtime.engine().symbol_count(), documented);
        assert!(runtime.engine().has_function("Emit"));
        assert!(runtime.engine().has_type("Player"));
    }

    #[test]
    fn test_module_loads_once() {
        let (_, mut runtime) = setup();
        assert!(matches!(
            runtime.load_module(&alt_module()),
            Err(BridgeError::Registration(_))
        ));
    }

    fn register_good(reg: &mut Registrar<'_, BindingContext>) -> asbridge_scripting::Result<()> {
        reg.global_function("int Good()", "Always one", |_, _| Ok(ScriptValue::Int32(1)))
    }

    fn register_broken(reg: &mut Registrar<'_, BindingContext>) -> asbridge_scripting::Result<()> {
        reg.event(
            "void BrokenCallback()",
            "void OnBroken(Unknown@ callback)",
            "",
            |_, _| Ok(ScriptValue::Void),
        )
    }

    #[test]
    fn test_failed_load_leaves_engine_untouched() {
        let (_, mut runtime) = setup();
        let before = runtime.engine().symbol_count();

        let broken = Module::new("extra").with(register_good).with(register_broken);
        assert!(matches!(
            runtime.load_module(&broken),
            Err(BridgeError::Registration(_))
        ));
        assert!(!runtime.engine().has_function("Good"));
        assert!(!runtime.engine().has_type("BrokenCallback"));
        assert_eq!(
            runtime.call("Good", vec![]),
            Err(ScriptError::UnknownSymbol("Good".into()))
        );
        assert_eq!(runtime.engine().symbol_count(), before);
        let documented: usize = runtime.docs().iter().map(|d| d.symbol_count()).sum();
        assert_eq!(runtime.engine().symbol_count(), documented);
        assert_eq!(runtime.docs().len(), 1);

        let fixed = Module::new("extra").with(register_good);
        runtime.load_module(&fixed).unwrap();
        assert_eq!(runtime.call("Good", vec![]), Ok(ScriptValue::Int32(1)));
        assert_eq!(runtime.engine().symbol_count(), before + 1);
    }

    #[test]
    fn test_timers_count_from_the_runtime_clock() {
        let (_, runtime) = setup();
        let start = runtime.context().now();
        let (count, callback) = counter();

        runtime.set_clock(start + Duration::from_millis(1000));
        runtime
            .call("SetTimeout", vec![callback, ScriptValue::UInt32(100)])
            .unwrap();

        assert_eq!(runtime.tick(start + Duration::from_millis(1050)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(runtime.tick(start + Duration::from_millis(1100)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timeout_and_interval() {
        let (_, runtime) = setup();
        let start = runtime.context().now();
        let (once, once_cb) = counter();
        let (every, every_cb) = counter();
        runtime
            .call("SetTimeout", vec![once_cb, ScriptValue::UInt32(100)])
            .unwrap();
        runtime
            .call("SetInterval", vec![every_cb, ScriptValue::UInt32(10)])
            .unwrap();

        for step in 1..=30 {
            runtime.tick(start + Duration::from_millis(10 * step));
        }
        assert_eq!(once.load(Ordering::SeqCst), 1);
        assert_eq!(every.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn test_tick_handlers() {
        let (_, runtime) = setup();
        let (next, next_cb) = counter();
        let (every, every_cb) = counter();
        runtime.call("NextTick", vec![next_cb]).unwrap();
        let id = runtime.call("EveryTick", vec![every_cb]).unwrap();

        let now = runtime.context().now();
        for _ in 0..3 {
            runtime.tick(now);
        }
        assert_eq!(next.load(Ordering::SeqCst), 1);
        assert_eq!(every.load(Ordering::SeqCst), 3);

        runtime.call("ClearEveryTick", vec![id]).unwrap();
        runtime.tick(now);
        assert_eq!(every.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clear_timer_is_idempotent() {
        let (_, runtime) = setup();
        let (count, callback) = counter();
        let id = runtime
            .call("SetTimeout", vec![callback, ScriptValue::UInt32(0)])
            .unwrap();

        assert_eq!(runtime.call("ClearTimer", vec![id.clone()]), Ok(ScriptValue::Void));
        assert_eq!(runtime.call("ClearTimeout", vec![id]), Ok(ScriptValue::Void));
        assert_eq!(
            runtime.call("ClearInterval", vec![ScriptValue::UInt32(999)]),
            Ok(ScriptValue::Void)
        );
        assert_eq!(runtime.tick(runtime.context().now()), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_null_callback_is_rejected() {
        let (_, runtime) = setup();
        assert_eq!(
            runtime.call("NextTick", vec![ScriptValue::Null]),
            Err(ScriptError::NullHandle)
        );
    }

    #[test]
    fn test_emit_forwards_present_values() {
        let (host, runtime) = setup();
        runtime
            .call("Emit", vec!["race:finish".into(), 1.into(), "x".into()])
            .unwrap();

        let slots = VariadicArgs::from_slots(
            MAX_VARIADIC_ARGS,
            vec![Some(true.into()), None, Some(2.5f64.into()), None],
        )
        .unwrap();
        runtime
            .call_variadic("Emit", vec!["race:lap".into()], slots)
            .unwrap();

        let events = host.take_local_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "race:finish");
        assert_eq!(
            events[0].args,
            vec![DynamicValue::Int(1), DynamicValue::String("x".into())]
        );
        assert_eq!(events[1].name, "race:lap");
        assert_eq!(
            events[1].args,
            vec![DynamicValue::Bool(true), DynamicValue::Double(2.5)]
        );
    }

    #[test]
    fn test_emit_rejects_too_many_args() {
        let (host, runtime) = setup();
        let mut args = vec![ScriptValue::from("flood")];
        args.extend((0..=MAX_VARIADIC_ARGS as i32).map(ScriptValue::from));
        assert!(matches!(
            runtime.call("Emit", args),
            Err(ScriptError::NoMatchingSignature { .. })
        ));
        assert!(host.take_local_events().is_empty());
    }

    #[test]
    fn test_resource_queries() {
        let (host, runtime) = setup();
        host.add_resource(ResourceInfo {
            name: "idle".into(),
            main: "main.as".into(),
            path: "resources/idle".into(),
            started: false,
        });

        let has = |name: &str| runtime.call("HasResource", vec![name.into()]).unwrap();
        assert_eq!(has("race"), ScriptValue::Bool(true));
        assert_eq!(has("idle"), ScriptValue::Bool(false));
        assert_eq!(has("missing"), ScriptValue::Bool(false));

        assert_eq!(
            runtime.call("GetResourcePath", vec!["race".into()]),
            Ok(ScriptValue::String("resources/race".into()))
        );
        assert_eq!(
            runtime.call("GetResourcePath", vec!["missing".into()]),
            Err(ScriptError::RuntimeError("Resource not found".into()))
        );

        runtime.call("StartResource", vec!["idle".into()]).unwrap();
        assert_eq!(has("idle"), ScriptValue::Bool(true));
        assert!(runtime.call("StopResource", vec!["missing".into()]).is_err());
        assert!(runtime
            .call("GetResourceExports", vec!["race".into()])
            .is_err());
    }

    #[test]
    fn test_files() {
        let (host, runtime) = setup();
        host.add_file("race", "data.txt", "hello");

        assert_eq!(
            runtime.call("ReadFile", vec!["data.txt".into()]),
            Ok(ScriptValue::String("hello".into()))
        );
        assert_eq!(
            runtime.call("FileExists", vec!["data.txt".into()]),
            Ok(ScriptValue::Bool(true))
        );
        assert_eq!(
            runtime.call("FileExists", vec!["nope.txt".into()]),
            Ok(ScriptValue::Bool(false))
        );
        assert_eq!(
            runtime.call("ReadFile", vec!["nope.txt".into()]),
            Err(ScriptError::RuntimeError("File not found".into()))
        );
    }

    #[test]
    fn test_read_file_rejects_invalid_utf8() {
        let (host, runtime) = setup();
        host.add_file("race", "blob.bin", vec![0x66, 0xff, 0xfe, 0x6f]);

        assert_eq!(
            runtime.call("ReadFile", vec!["blob.bin".into()]),
            Err(ScriptError::Conversion {
                from: "bytes".into(),
                to: "string".into(),
            })
        );
        assert_eq!(
            runtime.call("FileExists", vec!["blob.bin".into()]),
            Ok(ScriptValue::Bool(true))
        );
    }

    #[test]
    fn test_conversion_errors_reach_the_caller() {
        let (host, runtime) = setup();
        let entity = host.spawn_player("alice").unwrap();
        let player = players(&runtime).remove(0);
        let (_, callback) = counter();

        assert!(matches!(
            runtime.call("Emit", vec!["race:finish".into(), 1.into(), callback.clone()]),
            Err(ScriptError::Conversion { .. })
        ));
        assert!(host.take_local_events().is_empty());

        assert!(matches!(
            runtime.call_method(&player, "SetMeta", vec!["team".into(), callback]),
            Err(ScriptError::Conversion { .. })
        ));
        assert_eq!(host.get_meta(entity, "team"), Ok(None));
    }

    #[test]
    fn test_globals() {
        let (_, runtime) = setup();
        assert_eq!(
            runtime.get_global("resourceName"),
            Ok(ScriptValue::String("race".into()))
        );
        assert_eq!(
            runtime.get_global("resourceMain"),
            Ok(ScriptValue::String("main.as".into()))
        );
        assert_eq!(runtime.get_global("defaultDimension"), Ok(ScriptValue::Int32(0)));
        assert_eq!(
            runtime.get_global("globalDimension"),
            Ok(ScriptValue::Int32(i32::MIN))
        );
        assert_eq!(
            runtime.call("Hash", vec!["adder".into()]),
            Ok(ScriptValue::UInt32(0xB779_A091))
        );
    }

    #[test]
    fn test_get_all_players_identity() {
        let (host, runtime) = setup();
        let a = host.spawn_player("a").unwrap();
        host.spawn_player("b").unwrap();
        host.spawn_vehicle(0, Vector3f::ZERO).unwrap();

        let first = players(&runtime);
        let second = players(&runtime);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        for (x, y) in first.iter().zip(&second) {
            let (x, y) = (x.as_handle().unwrap(), y.as_handle().unwrap());
            assert!(x.same_instance(y));
        }

        host.destroy(a);
        assert_eq!(players(&runtime).len(), 1);
        match runtime.call("GetAllEntities", vec![]).unwrap() {
            ScriptValue::Array(array) => assert_eq!(array.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_player_properties() {
        let (host, runtime) = setup();
        let entity = host.spawn_player("alice").unwrap();
        let player = players(&runtime).remove(0);

        assert_eq!(
            runtime.get_property(&player, "name"),
            Ok(ScriptValue::String("alice".into()))
        );
        assert_eq!(
            runtime.get_property(&player, "id"),
            Ok(ScriptValue::UInt32(entity.id.get()))
        );
        assert_eq!(runtime.get_property(&player, "type"), Ok(ScriptValue::Int32(0)));

        let pos = runtime
            .construct("Vector3f", vec![1.0f32.into(), 2.0f32.into(), 3.0f32.into()])
            .unwrap();
        runtime.set_property(&player, "pos", pos.clone()).unwrap();
        assert_eq!(host.position(entity).unwrap(), Vector3f::new(1.0, 2.0, 3.0));
        assert_eq!(runtime.get_property(&player, "pos"), Ok(pos));

        runtime
            .set_property(&player, "dimension", ScriptValue::Int32(4))
            .unwrap();
        assert_eq!(host.dimension(entity).unwrap(), 4);
        assert_eq!(
            runtime.set_property(&player, "model", ScriptValue::UInt32(1)),
            Err(ScriptError::ReadOnlyProperty("model".into()))
        );

        runtime
            .call_method(&player, "SetMeta", vec!["team".into(), "red".into()])
            .unwrap();
        assert_eq!(
            runtime.call_method(&player, "HasMeta", vec!["team".into()]),
            Ok(ScriptValue::Bool(true))
        );
        assert_eq!(
            runtime.call_method(&player, "GetMeta", vec!["team".into()]),
            Ok(ScriptValue::Any(Box::new("red".into())))
        );
        runtime
            .call_method(&player, "DeleteMeta", vec!["team".into()])
            .unwrap();
        assert_eq!(
            runtime.call_method(&player, "GetMeta", vec!["team".into()]),
            Ok(ScriptValue::Null)
        );

        host.destroy(entity);
        assert_eq!(runtime.get_property(&player, "valid"), Ok(ScriptValue::Bool(false)));
        assert!(matches!(
            runtime.get_property(&player, "name"),
            Err(ScriptError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_vector_distance() {
        let (_, runtime) = setup();
        let a = runtime
            .construct("Vector3f", vec![0.0f32.into(), 0.0f32.into(), 0.0f32.into()])
            .unwrap();
        let b = runtime
            .construct("Vector3f", vec![3.0f32.into(), 4.0f32.into(), 0.0f32.into()])
            .unwrap();
        assert_eq!(
            runtime.call_method(&a, "DistanceTo", vec![b]),
            Ok(ScriptValue::Float(5.0))
        );
        assert_eq!(runtime.get_property(&a, "x"), Ok(ScriptValue::Float(0.0)));
    }

    #[test]
    fn test_local_and_remote_events() {
        let (host, runtime) = setup();
        let (local, local_cb) = recorder();
        let (remote, remote_cb) = recorder();
        runtime.call("On", vec!["ping".into(), local_cb]).unwrap();
        runtime.call("OnClient", vec!["ping".into(), remote_cb]).unwrap();

        assert_eq!(runtime.dispatch_local_event("ping", &[DynamicValue::from(5)]), 1);
        assert_eq!(runtime.dispatch_local_event("other", &[]), 0);
        {
            let calls = local.lock();
            assert_eq!(calls.len(), 1);
            match &calls[0][0] {
                ScriptValue::Array(array) => {
                    assert_eq!(array.len(), 1);
                    assert_eq!(
                        array.get(0),
                        Some(&ScriptValue::Any(Box::new(ScriptValue::Int64(5))))
                    );
                }
                other => panic!("expected array, got {:?}", other),
            }
        }

        let player = host.spawn_player("p").unwrap();
        assert_eq!(runtime.dispatch_remote_event(player, "ping", &[]), 1);
        let calls = remote.lock();
        assert_eq!(
            calls[0][0].as_handle().map(|handle| handle.entity()),
            Some(player)
        );
    }

    #[test]
    fn test_json_event_payload() {
        let (_, runtime) = setup();
        let (calls, callback) = recorder();
        runtime.call("On", vec!["race:start".into(), callback]).unwrap();

        let payload = DynamicValue::from(serde_json::json!({"laps": 3, "track": "loop"}));
        assert_eq!(runtime.dispatch_local_event("race:start", &[payload]), 1);

        let calls = calls.lock();
        let ScriptValue::Array(args) = &calls[0][0] else {
            panic!("expected array argument");
        };
        let Some(ScriptValue::Any(inner)) = args.get(0) else {
            panic!("expected any");
        };
        let ScriptValue::Dictionary(dict) = inner.as_ref() else {
            panic!("expected dictionary");
        };
        assert_eq!(dict.get("laps"), Some(&ScriptValue::Int64(3)));
        assert_eq!(dict.get("track"), Some(&ScriptValue::String("loop".into())));
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let (_, runtime) = setup();
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = order.clone();
            let handler = ScriptFunction::new(name, move |_| {
                order.lock().push(name);
                Ok(ScriptValue::Void)
            });
            runtime.call("On", vec!["go".into(), handler.into()]).unwrap();
        }
        runtime.dispatch_local_event("go", &[]);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_host_events() {
        let (host, runtime) = setup();
        let (connects, connect_cb) = recorder();
        let (starts, start_cb) = recorder();
        runtime.call("OnPlayerConnect", vec![connect_cb]).unwrap();
        runtime.call("OnResourceStart", vec![start_cb]).unwrap();

        let player = host.spawn_player("p").unwrap();
        assert_eq!(runtime.dispatch_host_event(&HostEvent::PlayerConnect { player }), 1);
        assert_eq!(
            runtime.dispatch_host_event(&HostEvent::ResourceStart {
                resource: "race".into()
            }),
            1
        );
        assert_eq!(
            runtime.dispatch_host_event(&HostEvent::ResourceStop {
                resource: "race".into()
            }),
            0
        );
        assert_eq!(connects.lock().len(), 1);
        assert_eq!(starts.lock()[0], vec![ScriptValue::String("race".into())]);
    }

    #[test]
    fn test_runtimes_are_independent() {
        let (host, first) = setup();
        let mut second = ScriptRuntime::new(host.clone(), "race");
        second.load_module(&alt_module()).unwrap();

        let (count, callback) = counter();
        first.call("EveryTick", vec![callback]).unwrap();
        second.tick(second.context().now());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(second.context().timers().active_count(), 0);
    }

    #[test]
    fn test_export_docs() {
        let (_, runtime) = setup();
        let dir = tempfile::tempdir().unwrap();
        let paths = runtime.export_docs(dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("altDocs.as"));

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(text.contains("    funcdef void TimerCallback();\n"));
        assert!(text.contains("    void Emit(const string&in event, ?&in ...);\n"));
        assert!(text.contains("    void OnPlayerConnect(PlayerConnectCallback@ callback);\n"));

        let class = &text[text.find("class Player").unwrap()..];
        let class = &class[..class.find("};").unwrap()];
        let order: Vec<_> = ["uint id;", "Vector3f pos;", "Vector3f rot;", "string name;"]
            .iter()
            .map(|member| class.find(member).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_export_docs_disabled() {
        let (host, _) = setup();
        let mut runtime = ScriptRuntime::new(host, "race").with_docs(false);
        runtime.load_module(&alt_module()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(runtime.export_docs(dir.path()).unwrap().is_empty());
        assert!(!dir.path().join("altDocs.as").exists());
        assert!(runtime.engine().symbol_count() > 0);
    }
}
