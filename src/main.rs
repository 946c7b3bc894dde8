//! Pianola command line: compile and play scores, inspect devices and frames.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pianola::backend::{create_backend, MidiBackend, NumpadFrame, OutputMode};
use pianola::compile::EventCompiler;
use pianola::config::PianolaConfig;
use pianola::model::KeyEvent;
use pianola::playback::{notification_channel, PlaybackNotification, Player, PlayerControl};
use pianola::score::Score;

#[derive(Parser)]
#[command(name = "pianola", version, about = "Humanized real-time piano playback")]
struct Cli {
    /// Config file (default: ~/.pianola/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a score and play it
    Play {
        /// Score file (YAML)
        score: PathBuf,

        /// Output backend (overrides config)
        #[arg(short, long)]
        output: Option<OutputArg>,

        /// Seed for humanization and mistakes (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Countdown seconds before playback (overrides config)
        #[arg(long)]
        countdown: Option<u32>,
    },
    /// Compile a score and print the event list
    Compile {
        /// Score file (YAML)
        score: PathBuf,

        /// Seed for humanization and mistakes (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// List MIDI output devices
    Devices,
    /// Print the numpad keystrokes for one note
    Frame {
        /// MIDI pitch (0-127)
        pitch: u8,
        /// MIDI velocity (0-127, 0 = note off)
        #[arg(default_value = "0")]
        velocity: u8,
        /// Print the pedal frame for this level instead
        #[arg(long)]
        pedal: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    Numpad,
    Midi,
    DryRun,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Numpad => OutputMode::Numpad,
            OutputArg::Midi => OutputMode::Midi,
            OutputArg::DryRun => OutputMode::DryRun,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PianolaConfig::from_path(path)?,
        None => PianolaConfig::load().unwrap_or_default(),
    };

    match cli.command {
        Commands::Play {
            score,
            output,
            seed,
            countdown,
        } => {
            if let Some(mode) = output {
                config.output.mode = mode.into();
            }
            if let Some(seed) = seed {
                config.compile.seed = seed;
            }
            if let Some(secs) = countdown {
                config.playback.countdown_secs = secs;
            }
            play(&score, config)?;
        }
        Commands::Compile { score, seed } => {
            if let Some(seed) = seed {
                config.compile.seed = seed;
            }
            let score = Score::from_path(&score)?;
            for event in compile_score(&score, &mut config) {
                println!("{event}");
            }
        }
        Commands::Devices => {
            let devices = MidiBackend::list_devices();
            if devices.is_empty() {
                println!("No MIDI output devices found.");
            }
            for (i, name) in devices.iter().enumerate() {
                println!("{i}: {name}");
            }
        }
        Commands::Frame {
            pitch,
            velocity,
            pedal,
        } => {
            let frame = if pedal {
                NumpadFrame::pedal(pitch)
            } else if velocity == 0 {
                NumpadFrame::note_off(pitch)
            } else {
                NumpadFrame::note_on(pitch, velocity)
            };
            println!("{frame}");
        }
    }
    Ok(())
}

/// Compile under the score's own tempo.
fn compile_score(score: &Score, config: &mut PianolaConfig) -> Vec<KeyEvent> {
    config.compile.tempo = score.tempo();
    EventCompiler::new(config.compile.clone()).compile(&score.notes, &score.sections)
}

fn play(path: &Path, mut config: PianolaConfig) -> Result<(), Box<dyn std::error::Error>> {
    let score = Score::from_path(path)?;
    let events = compile_score(&score, &mut config);
    tracing::info!(
        notes = score.notes.len(),
        events = events.len(),
        duration = score.total_duration(),
        "score compiled"
    );

    let backend = create_backend(&config.output)?;
    let (tx, rx) = notification_channel();
    let mut player = Player::new(events, score.total_duration(), config.playback, Some(tx));

    let control = player.control();
    ctrlc::set_handler(move || control.stop())?;
    spawn_command_reader(player.control());

    player.play(backend)?;
    eprintln!("Commands: p = pause/resume, s <secs> = seek, q = quit");

    while let Some(notification) = rx.recv() {
        match notification {
            PlaybackNotification::Status(text) => eprintln!("{text}"),
            PlaybackNotification::AutoPaused => {
                eprintln!("End of score. p replays, q quits.");
            }
            PlaybackNotification::Finished => break,
            PlaybackNotification::Progress(_) | PlaybackNotification::NoteActive { .. } => {}
        }
    }
    player.join();
    Ok(())
}

/// Read pause/seek/quit commands from stdin on a helper thread.
fn spawn_command_reader(control: PlayerControl) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("p") => control.toggle_pause(),
                Some("s") => match parts.next().and_then(|s| s.parse::<f64>().ok()) {
                    Some(secs) => control.seek(secs),
                    None => eprintln!("usage: s <seconds>"),
                },
                Some("q") => {
                    control.stop();
                    break;
                }
                Some(other) => eprintln!("unknown command: {other}"),
                None => {}
            }
        }
    });
}
