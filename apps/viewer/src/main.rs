use std::{sync::Arc, time::Instant};

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use shared::domain::ModelRef;
use viewer_core::{ViewerEvent, ViewerSession};

mod config;

#[derive(Parser, Debug)]
struct Args {
    /// Backend websocket endpoint; overrides viewer.toml and env.
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    user_name: Option<String>,
    /// Drive the side-by-side comparison pair instead of a single view.
    #[arg(long)]
    dual: bool,
    /// Model to view in single mode.
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    left_model: Option<String>,
    #[arg(long)]
    right_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();

    let backend_url = args.backend_url.unwrap_or(settings.backend_url);
    let user_name = args.user_name.unwrap_or(settings.user_name);
    let session = if args.dual {
        ViewerSession::dual(
            user_name,
            ModelRef::new(args.left_model.unwrap_or(settings.left_model)),
            ModelRef::new(args.right_model.unwrap_or(settings.right_model)),
        )
    } else {
        ViewerSession::single(user_name, ModelRef::new(args.model.unwrap_or(settings.model)))
    };

    session.connect(&backend_url).await?;
    info!(%backend_url, "connected to rendering backend");

    let mut events = session.subscribe_events();
    let printer = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    ViewerEvent::ConnectionChanged(status) => {
                        println!("connection: {status:?}");
                    }
                    ViewerEvent::ViewUpdated { slot } => {
                        if let Some(view) = session.view(slot).await {
                            println!(
                                "view {slot:?}: generation {}, primary image {} bytes",
                                view.generation(),
                                view.primary_image().0.len()
                            );
                        }
                    }
                    ViewerEvent::StepChanged {
                        value,
                        boundary_message,
                    } => {
                        if boundary_message.is_empty() {
                            println!("step: {value}");
                        } else {
                            println!("step: {value} ({boundary_message})");
                        }
                    }
                    ViewerEvent::TelemetryUpdated { elevation, heading } => {
                        println!("telemetry: elevation {elevation:.1}, heading {heading:.1}");
                    }
                }
            }
        })
    };

    println!("type a key name and press enter to send it; /+ and /- adjust the step, /reset resets, /quit exits");
    let started = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/quit" => break,
            "/reset" => session.reset().await,
            "/+" => session.increase_step().await,
            "/-" => session.decrease_step().await,
            key => {
                session
                    .on_key_event(key, started.elapsed().as_millis() as u64)
                    .await
            }
        }
    }

    printer.abort();
    session.disconnect().await;
    Ok(())
}
