use quad_carve::config::MazeConfig;
use quad_carve::Owner;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use structopt::clap::Shell;
use structopt::StructOpt;
use structopt_flags::QuietVerbose;

fn load_config(s: &str) -> Result<MazeConfig, String> {
    let path = PathBuf::from(s);
    let file = File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| format!("Failed to parse config file: {}", e))?;
    Ok(config)
}

#[derive(Debug)]
pub struct RendererConfig {
    pub cell_size: u32,
    pub fps: u32,
    #[cfg(feature = "visual")]
    pub visual: bool,
    #[cfg(feature = "visual")]
    pub slow: bool,
    #[cfg(feature = "visual")]
    pub vsync: bool,
    #[cfg(feature = "visual")]
    pub fullscreen: bool,
    #[cfg(feature = "visual")]
    pub hold: Option<f32>,
}

impl RendererConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub maze: MazeConfig,
    pub output_path: Option<PathBuf>,
    pub exits: Option<usize>,
    pub sequential: bool,
    pub renderer: RendererConfig,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Quad Carve",
    about = "Grow a maze from four concurrent depth-first carvers"
)]
pub struct Opt {
    #[structopt(flatten)]
    pub verbose: QuietVerbose,

    #[structopt(parse(from_os_str), help = "Output image")]
    output: Option<PathBuf>,

    #[structopt(
        parse(try_from_str = load_config),
        long,
        help = "JSON file with size, center, seed, carver_seeds and step_delay"
    )]
    config: Option<MazeConfig>,

    #[structopt(short, long, help = "Grid width and height in cells")]
    size: Option<usize>,

    #[structopt(short, long, help = "Side of the pre-carved center block")]
    center: Option<usize>,

    #[structopt(long, help = "Random seed")]
    seed: Option<u64>,

    #[structopt(long, help = "Seed for the north carver only")]
    north_seed: Option<u64>,

    #[structopt(long, help = "Seed for the south carver only")]
    south_seed: Option<u64>,

    #[structopt(long, help = "Seed for the east carver only")]
    east_seed: Option<u64>,

    #[structopt(long, help = "Seed for the west carver only")]
    west_seed: Option<u64>,

    #[structopt(long, help = "Pause between steps in milliseconds")]
    step_delay: Option<u64>,

    #[structopt(long, default_value = "8", help = "Pixels per cell in the output")]
    cell_size: u32,

    #[structopt(long, help = "Seal the outer ring and open n exits in it")]
    exits: Option<usize>,

    #[structopt(long, help = "Run the carvers round by round on one thread")]
    sequential: bool,

    #[structopt(long, default_value = "60", help = "Snapshot polls per second")]
    fps: u32,

    #[cfg(feature = "visual")]
    #[structopt(short = "w", long, help = "Open a window to show the generation")]
    visual: bool,

    #[cfg(feature = "visual")]
    #[structopt(long, help = "Draw every polled snapshot during visualisation")]
    slow: bool,

    #[cfg(feature = "visual")]
    #[structopt(long, help = "Turns on vsync")]
    vsync: bool,

    #[cfg(feature = "visual")]
    #[structopt(long, help = "Hold the image for n seconds after finishing")]
    hold: Option<f32>,

    #[cfg(feature = "visual")]
    #[structopt(short, long, help = "Runs the application in full screen")]
    fullscreen: bool,

    #[structopt(long, possible_values = &Shell::variants(), case_insensitive = true, help = "Generate shell completions and exit")]
    pub completions: Option<Shell>,
}

impl Opt {
    /// Flags given on the command line win over the config file.
    pub fn to_app_config(self) -> AppConfig {
        let mut maze = self.config.unwrap_or_default();

        if let Some(size) = self.size {
            maze.size = size;
        }
        if let Some(center) = self.center {
            maze.center = center;
        }
        if self.seed.is_some() {
            maze.seed = self.seed;
        }
        let carver_seeds = [
            (Owner::North, self.north_seed),
            (Owner::South, self.south_seed),
            (Owner::East, self.east_seed),
            (Owner::West, self.west_seed),
        ];
        for (owner, seed) in carver_seeds {
            if let Some(seed) = seed {
                maze.carver_seeds.set(owner, seed);
            }
        }
        if let Some(delay) = self.step_delay {
            maze.step_delay = Some(Duration::from_millis(delay));
        }

        AppConfig {
            maze,
            output_path: self.output,
            exits: self.exits,
            sequential: self.sequential,
            renderer: RendererConfig {
                cell_size: self.cell_size,
                fps: self.fps,
                #[cfg(feature = "visual")]
                visual: self.visual,
                #[cfg(feature = "visual")]
                slow: self.slow,
                #[cfg(feature = "visual")]
                vsync: self.vsync,
                #[cfg(feature = "visual")]
                fullscreen: self.fullscreen,
                #[cfg(feature = "visual")]
                hold: self.hold,
            },
        }
    }
}
