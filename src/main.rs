use anyhow::bail;
use luma_xylophone::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(config_path) = std::env::args().nth(1) else {
        bail!("usage: luma-xylophone <config.json>");
    };

    runtime::start(config_path)
}
