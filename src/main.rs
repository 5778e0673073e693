use std::env;
use std::process;

use pyre::{Demo, DemoConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("failed to load config {}: {}", path, e);
                process::exit(1);
            }
        },
        None => DemoConfig::default(),
    };

    if let Err(e) = Demo::with_config(config).run() {
        log::error!("{}", e);
        process::exit(1);
    }
}
