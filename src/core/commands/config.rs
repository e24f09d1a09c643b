use crate::utils::{app_config::AppConfig, error::Result};

/// Show the active configuration after all merges.
pub(crate) fn run() -> Result<()> {
    let config = AppConfig::fetch()?;
    println!("{:#?}", config);

    Ok(())
}
