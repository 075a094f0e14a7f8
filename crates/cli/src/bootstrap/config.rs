use zonequery_domain::Config;

/// Loads the config file (or defaults), lets the caller layer command-line
/// values on top, then validates the merged result.
pub fn load_config(
    config_path: Option<&str>,
    overrides: impl FnOnce(&mut Config),
) -> anyhow::Result<Config> {
    let mut config = Config::load(config_path)?;
    overrides(&mut config);
    config.validate()?;
    Ok(config)
}
