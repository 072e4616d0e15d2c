//! Focus Ambience - ambient sounds for study sessions
use ambience_cli::{
    config::AmbienceConfig,
    error::CliError,
    session::{describe_event, describe_sound, describe_status, lookup},
    SessionCommand,
};
use ambience_desktop::DesktopBackend;
use ambience_playback::{PlaybackEngine, PlaybackEvent, SoundCatalog};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ambience")]
#[command(about = "Ambient sounds for focus sessions", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "AMBIENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available sounds
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play one sound until interrupted
    Play {
        /// Sound name (case-insensitive)
        name: String,
        /// Volume (0-100)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Control playback with commands read from stdin
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr keeps stdout clean for --json)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ambience_cli=info,ambience_playback=info,ambience_desktop=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AmbienceConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let catalog = config.catalog()?;

    match cli.command {
        Commands::List { json } => {
            list_sounds(&catalog, json)?;
        }
        Commands::Play {
            name,
            volume,
            seconds,
        } => {
            play(&config, &catalog, &name, volume, seconds).await?;
        }
        Commands::Session => {
            session(&config, &catalog).await?;
        }
    }

    Ok(())
}

fn build_engine(config: &AmbienceConfig) -> PlaybackEngine {
    tracing::info!("Asset directory: {}", config.audio.asset_dir.display());

    let backend = Arc::new(DesktopBackend::new(config.audio.asset_dir.clone()));
    PlaybackEngine::new(backend, config.engine_config())
}

fn list_sounds(catalog: &SoundCatalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.list_sounds())?);
    } else {
        for sound in catalog.list_sounds() {
            println!("{}", describe_sound(sound));
        }
    }
    Ok(())
}

async fn play(
    config: &AmbienceConfig,
    catalog: &SoundCatalog,
    name: &str,
    volume: Option<u8>,
    seconds: Option<u64>,
) -> anyhow::Result<()> {
    let sound = lookup(catalog, name)
        .ok_or_else(|| CliError::UnknownSound(name.to_string()))?
        .clone();

    let engine = build_engine(config);
    let mut events = engine.subscribe();

    if let Some(volume) = volume {
        engine.set_volume(f32::from(volume) / 100.0).await;
    }
    engine.play(&sound).await;

    // Failures are reported as events, never returned
    while let Ok(event) = events.try_recv() {
        if let PlaybackEvent::Error { message, .. } = event {
            anyhow::bail!("Could not play {}: {}", sound.name, message);
        }
    }

    println!("{}", describe_status(&engine.status()));

    match seconds {
        Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
        None => {
            println!("Press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
        }
    }

    engine.stop().await;
    Ok(())
}

async fn session(config: &AmbienceConfig, catalog: &SoundCatalog) -> anyhow::Result<()> {
    let engine = build_engine(config);

    let mut events = engine.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", describe_event(&event)),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} playback events", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("Commands: play <name>, stop, volume <0-100>, status, list, quit");

    // Every command runs as its own task so a newer one supersedes an
    // older one that is still fading or loading
    let mut running: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            SessionCommand::Play(name) => match lookup(catalog, &name) {
                Some(sound) => {
                    let engine = engine.clone();
                    let sound = sound.clone();
                    running.push(tokio::spawn(async move { engine.play(&sound).await }));
                }
                None => eprintln!("{}", CliError::UnknownSound(name)),
            },
            SessionCommand::Stop => {
                let engine = engine.clone();
                running.push(tokio::spawn(async move { engine.stop().await }));
            }
            SessionCommand::Volume(percent) => {
                let engine = engine.clone();
                running.push(tokio::spawn(async move {
                    engine.set_volume(percent / 100.0).await;
                }));
            }
            SessionCommand::Status => println!("{}", describe_status(&engine.status())),
            SessionCommand::List => {
                for sound in catalog.list_sounds() {
                    println!("{}", describe_sound(sound));
                }
            }
            SessionCommand::Quit => break,
        }

        running.retain(|task| !task.is_finished());
    }

    engine.stop().await;
    for task in running {
        if let Err(e) = task.await {
            tracing::warn!("Session command failed: {}", e);
        }
    }

    // Last sender gone: the printer drains and exits
    drop(engine);
    printer.await?;

    Ok(())
}
