//! asbridge - runs the `alt` script module against an in-memory host
//!
//! Loads `config/bridge.txt`, registers the module, writes its declaration
//! file and then ticks the runtime on a fixed interval, forwarding custom
//! events raised through `Emit` back into script handlers.

mod demo;

use anyhow::Context;
use asbridge_bindings::{alt_module, HostEvent, ScriptRuntime};
use asbridge_config::BridgeConfig;
use asbridge_core::DynamicValue;
use asbridge_host::HostRuntime;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load_default().context("Failed to load config/bridge.txt")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("asbridge starting up");
    config.display();

    let host = Arc::new(demo::host(&config.resource_name)?);
    let mut runtime = ScriptRuntime::new(host.clone(), config.resource_name.clone())
        .with_docs(config.generate_docs);
    runtime
        .load_module(&alt_module())
        .context("Failed to load the alt module")?;
    info!("Registered {} symbols", runtime.engine().symbol_count());

    for path in runtime.export_docs(&config.docs_dir)? {
        info!("Wrote {}", path.display());
    }

    demo::attach(&runtime, host.clone())?;
    runtime.dispatch_host_event(&HostEvent::ResourceStart {
        resource: config.resource_name.clone(),
    });
    for player in host.players() {
        runtime.dispatch_host_event(&HostEvent::PlayerConnect { player });
    }

    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    let mut ticks = 0u64;
    loop {
        tokio::select! {
            now = interval.tick() => {
                runtime.tick(now.into_std());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        for event in host.take_local_events() {
            debug!(
                args = %DynamicValue::List(event.args.clone()).to_json(),
                "Local event {}", event.name
            );
            runtime.dispatch_local_event(&event.name, &event.args);
        }

        ticks += 1;
        if config.ticks > 0 && ticks >= config.ticks {
            break;
        }
    }

    for player in host.players() {
        runtime.dispatch_host_event(&HostEvent::PlayerDisconnect {
            player,
            reason: "Server shutting down".into(),
        });
    }
    runtime.dispatch_host_event(&HostEvent::ResourceStop {
        resource: config.resource_name.clone(),
    });

    info!("asbridge shutting down after {} ticks", ticks);
    Ok(())
}
