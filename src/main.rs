//! voxform main entry point
//!
//! Two modes:
//! 1. the console questionnaire (default): reads lines from stdin, drives
//!    the form shell and narrates through the host speech engine
//! 2. `relay`: serves the same-origin proxy in front of the backend

use log::{debug, error, info};
use std::io::Write;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use voxform::form::FormShell;
use voxform::gateway::{run_relay, Gateway};
use voxform::input::{Console, Flow};
use voxform::speech::Narrator;
use voxform::state::config::Config;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");
    let relay_mode = args.iter().skip(1).any(|arg| arg == "relay");

    if debug_mode {
        // Debug mode: write to voxform.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("voxform.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open voxform.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode, logging to voxform.log)",
            voxform::APP_NAME,
            voxform::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    let result = if relay_mode {
        runtime.block_on(relay())
    } else {
        runtime.block_on(run())
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn relay() -> anyhow::Result<()> {
    let config = Config::load()?;
    info!("Config loaded from {:?}", config.path());
    run_relay(config.relay()).await
}

async fn run() -> anyhow::Result<()> {
    debug!("Initializing voxform");

    let config = Config::load()?;
    info!("Config loaded from {:?}", config.path());

    let gateway = Gateway::new(config.gateway())?;

    // Speech is optional: the form works the same without it
    let mut narrator = if config.speech_enabled() {
        Narrator::with_host(config.voice())
    } else {
        Narrator::silent(config.voice())
    };
    narrator.set_auto_speak(config.auto_speak());
    if !narrator.is_available() {
        println!("Speech is unavailable; continuing without voice.");
    }

    let mut console = Console::new(FormShell::new(gateway, narrator));
    println!("{}", console.start().await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            info!("stdin closed");
            console.shell_mut().stop_speech();
            break;
        };

        let (flow, out) = console.handle_line(&line).await?;
        if !out.is_empty() {
            println!("{}", out);
        }
        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}
