use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tonewrap::config::{self, Config};
use tracing::level_filters::LevelFilter;
use tonewrap::{Phrase, Pitch, RandomOptions, Scale};

/// Derive pitches from a tonic and an interval pattern
#[derive(Parser)]
#[command(name = "tonewrap")]
#[command(version)]
struct Cli {
    /// Tonic pitch class, e.g. C, F#, A (default: config, then C)
    #[arg(short, long, global = true)]
    tonic: Option<String>,

    /// Interval pattern name, e.g. major, minorPentatonic (default: config, then major)
    #[arg(short, long, global = true)]
    pattern: Option<String>,

    /// Base octave (default: config, then 4)
    #[arg(short, long, global = true, allow_negative_numbers = true)]
    octave: Option<i32>,

    /// Config file (default: ~/.config/tonewrap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for more
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consecutive degrees from the tonic; a negative count descends
    Notes {
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: Option<i32>,
    },

    /// The pitch at one scale degree
    Note {
        #[arg(allow_negative_numbers = true)]
        degree: i32,
    },

    /// One ascending cycle per octave, inclusive
    Range {
        #[arg(allow_negative_numbers = true)]
        start: i32,
        #[arg(allow_negative_numbers = true)]
        end: i32,
    },

    /// Random degrees from one cycle
    Random {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Seed for a reproducible sequence
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Raw pattern-step label for a degree, without octave
    Name {
        #[arg(allow_negative_numbers = true)]
        degree: i32,
    },

    /// Render a degree phrase such as "0 2 4+ _ -1"
    Phrase { notation: String },

    /// List known interval patterns
    Patterns,

    /// Summary of the scale
    Show,
}

fn join(pitches: &[Pitch]) -> String {
    pitches
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn report(err: &dyn Error) -> String {
    format!("tonewrap: {err}")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(level_for(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    if let Some(tonic) = cli.tonic {
        config.tonic = tonic;
    }
    if let Some(pattern) = cli.pattern {
        config.pattern = pattern;
    }
    if let Some(octave) = cli.octave {
        config.octave = octave;
    }

    if let Commands::Patterns = cli.command {
        for pattern in config.pattern_table().iter() {
            println!("{pattern}");
        }
        return Ok(());
    }

    let scale = config.scale()?;
    run(&cli.command, &scale, &config)
}

fn run(command: &Commands, scale: &Scale, config: &Config) -> Result<(), Box<dyn Error>> {
    let octave = config.octave;
    match command {
        Commands::Notes { count } => {
            let count = count.unwrap_or(scale.len() as i32);
            println!("{}", join(&scale.notes_counted(octave, count)));
        }
        Commands::Note { degree } => println!("{}", scale.note(*degree, octave)),
        Commands::Range { start, end } => {
            println!("{}", join(&scale.notes_in_range(*start, *end)));
        }
        Commands::Random { count, seed } => {
            let pitches: Vec<Pitch> = match seed {
                Some(seed) => {
                    let mut options = RandomOptions::seeded(*seed);
                    (0..*count)
                        .map(|_| scale.random_note_with(octave, &mut options))
                        .collect()
                }
                None => (0..*count).map(|_| scale.random_note(octave)).collect(),
            };
            println!("{}", join(&pitches));
        }
        Commands::Name { degree } => println!("{}", scale.note_name(*degree)),
        Commands::Phrase { notation } => {
            let phrase = Phrase::parse(notation)?;
            let rendered: Vec<String> = phrase
                .render(scale, octave)
                .iter()
                .map(|p| p.map_or("_".to_string(), |p| p.to_string()))
                .collect();
            println!("{}", rendered.join(" "));
        }
        Commands::Show => println!("{scale}"),
        Commands::Patterns => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewrap::ScaleError;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), LevelFilter::WARN);
        assert_eq!(level_for(1), LevelFilter::INFO);
        assert_eq!(level_for(2), LevelFilter::DEBUG);
        assert_eq!(level_for(9), LevelFilter::TRACE);
    }

    #[test]
    fn test_bad_tonic_is_reported_readably() {
        let config = Config {
            tonic: "H".to_string(),
            ..Config::default()
        };
        let err: Box<dyn Error> = config.scale().unwrap_err().into();
        assert_eq!(report(err.as_ref()), "tonewrap: unknown tonic: H");

        let err: Box<dyn Error> = ScaleError::InvalidPattern("bogus".to_string()).into();
        assert_eq!(report(err.as_ref()), "tonewrap: unknown scale pattern: bogus");
    }

    #[test]
    fn test_bad_phrase_fails_the_command() {
        let scale = Scale::new("C", "major").unwrap();
        let cli = Cli::parse_from(["tonewrap", "phrase", "0 x"]);
        assert!(run(&cli.command, &scale, &Config::default()).is_err());
    }
}
