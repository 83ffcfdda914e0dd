// src/main.rs

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    hallbot::cli::run()?;
    Ok(())
}
