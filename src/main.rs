use env_logger::{Builder, Env};
use log::error;

fn main() {
    // RUST_LOG=debug snapkv batch --path ./kv.json --file cmds.txt
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = snapkv::cli::run() {
        error!("{:?}", e);
        std::process::exit(snapkv::cli::exit_code(&e));
    }
}

