use anyhow::{Context, Result};

use crm_core::config::CrmConfig;
use crm_infrastructure::{ConfigService, CrmPaths};

pub fn show(paths: &CrmPaths) -> Result<()> {
    let service = ConfigService::new(paths.config_file()?);
    let config = service.get_config();
    let rendered =
        toml::to_string_pretty(&config).context("Failed to render configuration as TOML")?;
    print!("{}", rendered);
    Ok(())
}

pub fn path(paths: &CrmPaths) -> Result<()> {
    println!("{}", paths.config_file()?.display());
    Ok(())
}

pub fn init(paths: &CrmPaths) -> Result<()> {
    let service = ConfigService::new(paths.config_file()?);
    if service.path().exists() {
        println!("Config already exists at {}", service.path().display());
        return Ok(());
    }

    service.save_config(&CrmConfig::default())?;
    println!("Wrote default config to {}", service.path().display());
    Ok(())
}
