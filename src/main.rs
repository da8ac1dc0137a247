//! Typefall entry point
//!
//! Natively this runs a headless demo: a real-time clock thread drives the
//! session while the autoplay typist presses keys, then the result is logged
//! and offered to the local leaderboard. The browser build uses the bindings
//! in `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, bail};

    use typefall::consts::SIM_DT;
    use typefall::platform::native::{Command, NativeRunner};
    use typefall::sim::{GameEvent, Mode, autoplay};
    use typefall::{HighScores, Session, SessionPhase, Settings};

    const USAGE: &str = "usage: typefall [--mode letter|word|story] [--seed N] \
                         [--seconds N] [--keys-per-sec N] [--settings PATH] [--scores PATH] \
                         [--save-settings]";

    struct Args {
        mode: Option<Mode>,
        seed: Option<u64>,
        seconds: u64,
        keys_per_sec: u32,
        settings: PathBuf,
        scores: PathBuf,
        /// Write the effective settings back after applying flags
        save_settings: bool,
    }

    fn parse_args() -> Result<Args> {
        let mut args = Args {
            mode: None,
            seed: None,
            seconds: 30,
            keys_per_sec: 4,
            settings: PathBuf::from("typefall_settings.json"),
            scores: PathBuf::from("typefall_highscores.json"),
            save_settings: false,
        };

        let mut it = std::env::args().skip(1);
        while let Some(flag) = it.next() {
            let mut value = || it.next().with_context(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--mode" => {
                    let raw = value()?;
                    args.mode = Some(
                        Mode::from_str(&raw).with_context(|| format!("unknown mode {raw:?}"))?,
                    );
                }
                "--seed" => args.seed = Some(value()?.parse().context("--seed")?),
                "--seconds" => args.seconds = value()?.parse().context("--seconds")?,
                "--keys-per-sec" => args.keys_per_sec = value()?.parse().context("--keys-per-sec")?,
                "--settings" => args.settings = PathBuf::from(value()?),
                "--scores" => args.scores = PathBuf::from(value()?),
                "--save-settings" => args.save_settings = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                other => bail!("unexpected argument {other:?}\n{USAGE}"),
            }
        }
        Ok(args)
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = parse_args()?;
        let mut settings = Settings::load_or_default(&args.settings);
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
        if let Some(mode) = args.mode {
            settings.default_mode = mode;
        }
        if args.save_settings {
            settings
                .save_to(&args.settings)
                .with_context(|| format!("saving {}", args.settings.display()))?;
        }
        let mode = settings.default_mode;

        let seed = now_ms() as u64;
        let session = Session::new(&settings, seed);
        let mut runner =
            NativeRunner::new(session, Some(Duration::from_secs_f32(SIM_DT)));
        let keys = runner.sender();
        keys.send(Command::Reset(mode))?;

        let key_every = (1.0 / args.keys_per_sec.max(1) as f32 / SIM_DT).round().max(1.0) as u64;
        let deadline = Instant::now() + Duration::from_secs(args.seconds);
        let mut last_key_tick = 0;

        while Instant::now() < deadline {
            if !runner.pump(Duration::from_millis(50)) {
                break;
            }

            for event in runner.session_mut().drain_events() {
                match event {
                    GameEvent::LevelUp { level } => log::info!("Level {}", level),
                    GameEvent::LifeLost { lives } => log::info!("Life lost, {} left", lives),
                    GameEvent::WordComplete { points } => log::debug!("Word for {} points", points),
                    GameEvent::PowerUpCaught { kind, .. } => log::info!("Caught {:?}", kind),
                    _ => {}
                }
            }

            if runner.session().phase() != SessionPhase::Running {
                break;
            }

            let state = runner.session().state();
            if state.time >= last_key_tick + key_every {
                if let Some(key) = autoplay::next_key(state) {
                    last_key_tick = state.time;
                    keys.send(Command::Key(key))?;
                }
            }
        }
        keys.send(Command::Shutdown)?;
        runner.pump_pending();

        let state = runner.session().state();
        let summary = state.summary();
        log::info!(
            "Finished: mode={} score={} level={} letters={} accuracy={:.1}% time={}s",
            summary.mode.as_str(),
            summary.score,
            summary.level,
            summary.letters_correct,
            summary.accuracy,
            summary.time_played_secs
        );

        let mut board = HighScores::load_from(&args.scores)?;
        if let Some(best) = board.top_score() {
            log::info!("Best on record: {}", best);
        }
        if board.potential_rank(summary.score).is_some() {
            if let Some(rank) = board.submit("autoplay", &summary, now_ms())? {
                log::info!("New high score, rank {}", rank);
                board
                    .save_to(&args.scores)
                    .with_context(|| format!("saving {}", args.scores.display()))?;
            }
        } else {
            log::info!("No high score this time");
        }

        if runner.session().phase() == SessionPhase::GameOver {
            println!("Game over with {} points", summary.score);
        } else {
            println!("Stopped after {}s with {} points", args.seconds, summary.score);
        }
        Ok(())
    }
}
