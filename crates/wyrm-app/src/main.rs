use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wyrm_core::{Engine, EngineConfig, InputEvent, Viewport};
use wyrm_platform::{ImmediateGate, LogNotice, PermissionGate, UserNotice};
use wyrm_ui::{run_ui, UiOptions};

// Simulated display refresh for headless runs.
const HOST_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "wyrm")]
#[command(about = "Serpentine follow-chains that chase the pointer and draw hearts")]
struct Args {
    /// TOML config file, or JSON with a .json extension
    #[arg(long, env = "WYRM_CONFIG")]
    config: Option<PathBuf>,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Window or headless viewport size
    #[arg(long, value_name = "WxH", default_value = "1280x800", value_parser = parse_size)]
    size: [f32; 2],

    /// Tick cap for both profiles, 0 for uncapped
    #[arg(long)]
    fps: Option<f32>,

    /// Run without a window and print one JSON snapshot per tick
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Headless only: feed a constant tilt sample in degrees
    #[arg(long, value_name = "GAMMA,BETA", value_parser = parse_tilt, allow_hyphen_values = true)]
    tilt: Option<(f32, f32)>,

    /// Grant motion sensor access without asking
    #[arg(long)]
    no_prompt: bool,
}

fn main() {
    // Logs go to stderr so headless snapshots own stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args = Args::parse();
    info!("Wyrm starting");
    if let Err(e) = run(args) {
        eprintln!("Wyrm error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> wyrm_platform::Result<()> {
    let config = load_config(&args)?;
    let [width, height] = args.size;
    match args.headless {
        Some(frames) => run_headless(config, Viewport::new(width, height), frames, args.tilt),
        None => run_ui(
            config,
            UiOptions {
                inner_size: args.size,
                prompt_for_sensor: !args.no_prompt,
            },
        ),
    }
}

fn load_config(args: &Args) -> wyrm_platform::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = EngineConfig::from_path(path)?;
            info!(path = %path.display(), "config loaded");
            config
        }
        None => EngineConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(fps) = args.fps {
        let cap = (fps > 0.0).then_some(fps);
        config.compact.frame.fps_cap = cap;
        config.full.frame.fps_cap = cap;
    }
    config.validate()?;
    Ok(config)
}

fn run_headless(
    config: EngineConfig,
    viewport: Viewport,
    frames: u64,
    tilt: Option<(f32, f32)>,
) -> wyrm_platform::Result<()> {
    let mut engine = Engine::new(config, viewport)?;
    let mut notices = LogNotice;

    let tilt = match tilt {
        Some(sample) => match engine.request_orientation() {
            Ok(()) => {
                let ticket = ImmediateGate.request();
                match ticket.poll().map(|outcome| engine.resolve_orientation(outcome)) {
                    Some(Ok(())) => Some(sample),
                    Some(Err(err)) => {
                        notices.notice(&err.to_string());
                        None
                    }
                    None => None,
                }
            }
            Err(err) => {
                notices.notice(&err.to_string());
                None
            }
        },
        None => None,
    };

    info!(frames, "running headless");
    let mut now_ms = 0.0;
    while engine.frames() < frames {
        if let Some((gamma, beta)) = tilt {
            let sample = InputEvent::Orientation {
                gamma: Some(gamma),
                beta: Some(beta),
            };
            engine.handle(&sample, now_ms);
        }
        if engine.frame(now_ms) {
            println!("{}", engine.snapshot().to_json()?);
        }
        now_ms += HOST_FRAME_MS;
    }
    Ok(())
}

fn parse_size(text: &str) -> Result<[f32; 2], String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("{text} is not <W>x<H>"))?;
    let parse = |part: &str| part.trim().parse::<f32>().map_err(|e| format!("{part}: {e}"));
    let (w, h) = (parse(w)?, parse(h)?);
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("{text} must be positive"));
    }
    Ok([w, h])
}

fn parse_tilt(text: &str) -> Result<(f32, f32), String> {
    let (gamma, beta) = text
        .split_once(',')
        .ok_or_else(|| format!("{text} is not <gamma>,<beta>"))?;
    let parse = |part: &str| part.trim().parse::<f32>().map_err(|e| format!("{part}: {e}"));
    Ok((parse(gamma)?, parse(beta)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_every_flag() {
        let args = Args::try_parse_from([
            "wyrm", "--config", "wyrm.toml", "--seed", "7", "--size", "800x600", "--fps", "0",
            "--headless", "20", "--tilt", "-5,3", "--no-prompt",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("wyrm.toml")));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.size, [800.0, 600.0]);
        assert_eq!(args.fps, Some(0.0));
        assert_eq!(args.headless, Some(20));
        assert_eq!(args.tilt, Some((-5.0, 3.0)));
        assert!(args.no_prompt);
    }

    #[test]
    fn size_defaults_to_a_desktop_window() {
        let args = Args::try_parse_from(["wyrm"]).unwrap();
        assert_eq!(args.size, [1280.0, 800.0]);
        assert_eq!(args.headless, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Args::try_parse_from(["wyrm", "--seed"]).is_err());
        assert!(Args::try_parse_from(["wyrm", "--size", "800"]).is_err());
        assert!(Args::try_parse_from(["wyrm", "--size", "0x600"]).is_err());
        assert!(Args::try_parse_from(["wyrm", "--tilt", "5"]).is_err());
        assert!(Args::try_parse_from(["wyrm", "--verbose"]).is_err());
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let args = Args::try_parse_from(["wyrm", "--seed", "3", "--fps", "0"]).unwrap();
        let config = load_config(&Args { config: None, ..args }).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.full.frame.fps_cap, None);
        assert_eq!(config.compact.frame.fps_cap, None);
    }

    #[test]
    fn headless_run_finishes() {
        let config = EngineConfig {
            seed: Some(1),
            ..EngineConfig::default()
        };
        run_headless(config, Viewport::new(400.0, 800.0), 5, Some((10.0, 0.0))).unwrap();
    }
}
