//! stage-replay: headless stage runner for scripted keystroke files.
//!
//! Usage:
//!   stage-replay run --stage normal --script keys.txt --seed 7
//!   stage-replay validate --stage stages/custom.json

use std::path::{Path, PathBuf};
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use typestrike_core::commands::PlayerInput;
use typestrike_core::enums::Difficulty;
use typestrike_sim::stages;
use typestrike_sim::{GameSession, StageDefinition, StageEngine};

/// Upper bound on ticks when `--ticks` is not given (10 minutes at 60 Hz).
const DEFAULT_MAX_TICKS: u64 = 36_000;

/// Script character for a tick with no input.
const IDLE: char = '~';

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "validate" => cmd_validate(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "stage-replay: headless typing-combat stage runner\n\
         \n\
         Commands:\n\
         \n\
         run       Replay a keystroke script against a stage\n\
         \n\
           --stage <file|easy|normal|hard>  Stage JSON file or built-in stage\n\
           --script <path>                  Keystroke script, one character per tick\n\
           --seed <N>                       Session seed (default: 42)\n\
           --difficulty <easy|normal|hard>  Session difficulty (default: the built-in's, or normal)\n\
           --ticks <N>                      Stop after N ticks (default: 36000)\n\
           --player <name>                  Player name carried in the session\n\
           --snapshots                      Print every snapshot as a JSON line\n\
         \n\
         validate  Load and validate a stage definition\n\
         \n\
           --stage <file|easy|normal|hard>\n\
         \n\
         Script format: every character is one tick of input. `~` is an idle tick,\n\
         a tab switches target, line breaks are skipped.\n\
         \n\
         Examples:\n\
         \n\
           stage-replay run --stage hard --script keys.txt --seed 7\n\
           RUST_LOG=typestrike_sim=debug stage-replay run --stage custom.json --script keys.txt\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_or_exit<T>(args: &[String], flag: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match flag_value(args, flag) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            eprintln!("Error: invalid value for {flag}: {e}");
            process::exit(1);
        }),
        None => default,
    }
}

/// A stage argument naming a built-in stage rather than a file.
fn builtin_difficulty(name: &str) -> Option<Difficulty> {
    name.parse::<Difficulty>().ok()
}

/// Load a built-in stage by name or a JSON definition from disk.
fn load_stage(args: &[String]) -> (StageDefinition, Option<Difficulty>) {
    let Some(name) = flag_value(args, "--stage") else {
        eprintln!("Error: --stage <file|easy|normal|hard> is required");
        process::exit(1);
    };

    if let Some(difficulty) = builtin_difficulty(name) {
        return (stages::builtin(difficulty), Some(difficulty));
    }

    match StageDefinition::from_file(Path::new(name)) {
        Ok(stage) => (stage, None),
        Err(e) => {
            eprintln!("Error loading stage: {e}");
            process::exit(1);
        }
    }
}

/// Turn a script into per-tick inputs.
fn parse_script(text: &str) -> Vec<Option<PlayerInput>> {
    text.chars()
        .filter(|&c| c != '\n' && c != '\r')
        .map(|c| match c {
            IDLE => None,
            '\t' => Some(PlayerInput::SwitchTarget),
            c => Some(PlayerInput::key(c)),
        })
        .collect()
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let (stage, builtin) = load_stage(args);

    let script_path = match flag_value(args, "--script") {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Error: --script <path> is required");
            process::exit(1);
        }
    };
    let script = match std::fs::read_to_string(&script_path) {
        Ok(text) => parse_script(&text),
        Err(e) => {
            eprintln!("Error reading script {}: {e}", script_path.display());
            process::exit(1);
        }
    };

    let seed: u64 = parse_or_exit(args, "--seed", GameSession::default().seed);
    let difficulty: Difficulty =
        parse_or_exit(args, "--difficulty", builtin.unwrap_or_default());
    let max_ticks: u64 = parse_or_exit(args, "--ticks", DEFAULT_MAX_TICKS);
    let print_snapshots = has_flag(args, "--snapshots");

    let mut session = GameSession::new(difficulty, seed);
    if let Some(name) = flag_value(args, "--player") {
        session = session.with_player(0, name);
    }
    let mut engine = match StageEngine::new(&stage, &session) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    info!(
        stage = %stage.name,
        ?difficulty,
        seed,
        player = %session.player.name,
        script_ticks = script.len(),
        "replay started"
    );

    let mut inputs = script.into_iter();
    for _ in 0..max_ticks {
        let snapshot = engine.tick(inputs.next().flatten());
        if print_snapshots {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "snapshot not serializable"),
            }
        }
        if engine.phase().is_finished() {
            break;
        }
    }

    if !engine.phase().is_finished() {
        warn!(max_ticks, "tick limit reached, aborting stage");
        engine.tick(Some(PlayerInput::Quit));
    }

    let Some(summary) = engine.summary() else {
        eprintln!("Error: stage produced no summary");
        process::exit(1);
    };
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing summary: {e}");
            process::exit(1);
        }
    }
}

// --- Validate command ---

fn cmd_validate(args: &[String]) {
    let (stage, _) = load_stage(args);
    if let Err(e) = stage.validate() {
        eprintln!("Invalid stage: {e}");
        process::exit(1);
    }
    let units: u32 = stage.waves.iter().map(|w| w.unit_count()).sum();
    eprintln!(
        "Stage \"{}\" OK: {} waves, {} units, concurrency cap {}",
        stage.name,
        stage.waves.len(),
        units,
        stage.concurrency_cap
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let inputs = parse_script("ab~\n\tc\r\n");
        assert_eq!(
            inputs,
            vec![
                Some(PlayerInput::key('a')),
                Some(PlayerInput::key('b')),
                None,
                Some(PlayerInput::SwitchTarget),
                Some(PlayerInput::key('c')),
            ]
        );
    }

    #[test]
    fn test_flag_value() {
        let args: Vec<String> = ["--stage", "hard", "--seed"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(flag_value(&args, "--stage"), Some("hard"));
        assert_eq!(flag_value(&args, "--seed"), None);
        assert_eq!(builtin_difficulty("hard"), Some(Difficulty::Hard));
        assert_eq!(builtin_difficulty("hard.json"), None);
    }
}
