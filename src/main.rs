mod app;
mod cli;

use log::error;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io;
use std::process;
use structopt::StructOpt;
use structopt_flags::LogLevel;

use app::MazeApp;
use cli::Opt;

fn main() {
    let opt: Opt = Opt::from_args();

    if let Some(shell) = opt.completions {
        Opt::clap().gen_completions_to(env!("CARGO_BIN_NAME"), shell, &mut io::stdout());
        return;
    }

    if let Err(e) = TermLogger::init(
        opt.verbose.get_level_filter(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let app = MazeApp::new(opt.to_app_config());

    if let Err(e) = app.run() {
        error!("{}", e);
        process::exit(1);
    }
}
