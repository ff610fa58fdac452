use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chatroom_sim::config::ChatConfig;
use chatroom_sim::engine::ChatEngine;
use chatroom_sim::event::MessageEvent;
use chatroom_sim::logging;

#[tokio::main]
async fn main() -> Result<(), String> {
    logging::init();

    let mut args = env::args().skip(1);
    let mut config_path = None;
    let mut run_seconds = 30u64;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(
                    args.next()
                        .ok_or_else(|| "usage: feed [--config <path.toml>] [--seconds <n>]".to_string())?,
                );
            }
            "--seconds" => {
                let value = args
                    .next()
                    .ok_or_else(|| "usage: feed [--config <path.toml>] [--seconds <n>]".to_string())?;
                run_seconds = value
                    .parse()
                    .map_err(|_| format!("invalid --seconds value: {value}"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    let config: ChatConfig = match config_path {
        Some(path) => {
            let contents = fs::read_to_string(&path).map_err(|err| err.to_string())?;
            toml::from_str(&contents).map_err(|err| err.to_string())?
        }
        None => ChatConfig::default(),
    };

    let engine = ChatEngine::start(config, "local-user");
    engine.subscribe(Arc::new(|event: &MessageEvent| {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
    }));
    engine.set_visible(true);
    engine.send("hello room!", None, None).map_err(|err| err.to_string())?;

    tokio::time::sleep(Duration::from_secs(run_seconds)).await;

    engine.mark_seen();
    let stats = engine.stats();
    engine.stop();

    let summary = serde_json::json!({
        "stats": stats,
        "feed_len": engine.all().len(),
        "online": engine.online_users().len(),
    });
    let output = serde_json::to_string_pretty(&summary).map_err(|err| err.to_string())?;
    println!("{output}");
    Ok(())
}
