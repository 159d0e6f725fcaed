use anyhow::Result;

use changuide_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, using defaults)", path.display());
    }
    println!("# log file: {}\n", config.log_path().display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
