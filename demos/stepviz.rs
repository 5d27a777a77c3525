//! `stepviz`: step-by-step algorithm visualizations in the terminal.

use stepviz_demos::{Args, DemoError, USAGE};

fn main() {
    env_logger::init();

    let result = Args::parse().and_then(stepviz_demos::run);
    if let Err(err) = result {
        eprintln!("error: {err}");
        if matches!(err, DemoError::Usage(_)) {
            eprintln!();
            eprintln!("{USAGE}");
        }
        std::process::exit(1);
    }
}
