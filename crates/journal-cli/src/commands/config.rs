use crate::cli::{ConfigCommands, GlobalArgs};
use crate::config_profiles::{default_config_path, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global: &GlobalArgs) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { no_activate } => run_config_init(global, no_activate),
        ConfigCommands::Show => run_config_show(global),
    }
}

pub fn run_config_init(global: &GlobalArgs, no_activate: bool) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = update_profile(&mut config, global, no_activate)?;
    let saved = config.save().map_err(CliError::Config)?;
    println!("Saved profile '{profile_name}' to {}", saved.display());
    Ok(())
}

/// Apply `config init` to `config`, returning the profile name it touched.
pub fn update_profile(
    config: &mut CliProfilesConfig,
    global: &GlobalArgs,
    no_activate: bool,
) -> Result<String, CliError> {
    let api_url = global
        .api_url
        .as_deref()
        .ok_or_else(|| CliError::Config("`journal config init` requires --api-url".to_string()))?;
    let profile_name = config.resolve_profile_name(global.profile.as_deref());

    config
        .profile_mut_or_default(&profile_name)
        .set_api_base_url(api_url)?;
    if !no_activate || config.active_profile.is_none() {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

pub fn run_config_show(global: &GlobalArgs) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global.profile.as_deref());
    let client = config.client_config(&profile_name, global.api_url.clone())?;

    println!("config file:  {}", default_config_path().map_err(CliError::Config)?.display());
    println!("profile:      {profile_name}");
    println!("api url:      {}", client.api_base_url);
    println!("timeout:      {}s", client.timeout.as_secs());
    println!("page size:    {}", client.page_size);
    Ok(())
}
