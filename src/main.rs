use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mood_pet::face;
use mood_pet::pet::{
    spawn_mouth_animator, AudioSink, EyeSide, GestureAccumulator, PacedSink, PlaybackController,
};
use mood_pet::{GeminiClient, InteractionPipeline, PetConfig, StateStore, Submission};

/// Talk to a small virtual pet in your terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plain talk-only pet, no petting or eye poking
    #[arg(long)]
    no_gestures: bool,

    /// Never open the audio device
    #[arg(long)]
    mute: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    debug: bool,
}

enum Command {
    Say(String),
    Pet(u32),
    Poke(EyeSide),
    Release(EyeSide),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some("pet"), None) => Ok(Command::Pet(1)),
        (Some("pet"), Some(n)) => n
            .parse()
            .map(Command::Pet)
            .map_err(|_| format!("not a number: {n}")),
        (Some("poke"), Some(side)) => side.parse().map(Command::Poke),
        (Some("release"), Some(side)) => side.parse().map(Command::Release),
        (Some("help"), _) => Ok(Command::Help),
        (Some("quit" | "exit"), _) => Ok(Command::Quit),
        _ => Err(format!("unknown command: {line}")),
    }
}

const HELP: &str = "\
  <text>            say something
  /pet [n]          pet n times
  /poke left|right  press an eye shut
  /release left|right
  /quit";

fn select_sink(mute: bool) -> Arc<dyn AudioSink> {
    #[cfg(feature = "speaker")]
    {
        if !mute {
            return Arc::new(mood_pet::pet::SpeakerSink::new());
        }
    }
    #[cfg(not(feature = "speaker"))]
    let _ = mute;
    Arc::new(PacedSink)
}

fn draw(state: &mood_pet::PetState) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\x1b[2J\x1b[H{}> ", face::render(state))?;
    stdout.flush()
}

/// Out-of-band message for the user, kept off the face on stdout
fn notice(out: &mut impl Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{message}")?;
    out.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else if args.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting mood-pet version {}", env!("CARGO_PKG_VERSION"));

    let mut config = PetConfig::load(args.config.as_deref()).context("loading config")?;
    if args.no_gestures {
        config.gestures.enabled = false;
    }

    let gemini = config.gemini_config().context("configuring Gemini")?;
    if !gemini.has_credential() {
        tracing::warn!("GEMINI_API_KEY not set; the pet will not answer");
    }
    let client = GeminiClient::new(gemini)?;

    let store = StateStore::new();
    let playback = PlaybackController::new(select_sink(args.mute), store.clone());
    let pipeline = InteractionPipeline::new(Arc::new(client), playback, store.clone(), &config);
    let mut gestures = GestureAccumulator::new(pipeline.clone(), &config.gestures, &config.persona);
    let mouth = spawn_mouth_animator(store.clone(), config.mouth_interval());

    let mut state_rx = store.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    draw(&store.snapshot())?;

    let term_signal = tokio::signal::ctrl_c();
    tokio::pin!(term_signal);

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                draw(&state)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Say(text)) => {
                        if let Err(reason) = pipeline.try_start(Submission::text(text)) {
                            tracing::debug!("Submission ignored: {:?}", reason);
                        }
                    }
                    Ok(Command::Pet(times)) => {
                        for _ in 0..times {
                            gestures.record_petting();
                        }
                    }
                    Ok(Command::Poke(side)) => gestures.record_eye_hold_start(side),
                    Ok(Command::Release(side)) => gestures.record_eye_hold_end(side),
                    Ok(Command::Help) => notice(&mut std::io::stderr().lock(), HELP)?,
                    Ok(Command::Quit) => break,
                    Err(message) => notice(&mut std::io::stderr().lock(), &message)?,
                }
            }
            _ = &mut term_signal => break,
        }
    }

    mouth.abort();
    tracing::info!("Goodbye");
    Ok(())
}
