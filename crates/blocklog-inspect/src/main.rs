use std::process;

use blocklog_inspect::cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match cli::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", cli::USAGE);
            process::exit(1);
        }
    };

    match cli::run(&parsed) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}
