//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use meshwatch_config::{Config, NetworkEntry, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, active_profile_name};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token(network_id: &str) -> Result<String, CliError> {
    let token = rpassword::prompt_password(format!("User token for network {network_id}: "))
        .map_err(prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Ask for one network; the token goes to the keyring or the config file.
fn prompt_network(profile_name: &str) -> Result<NetworkEntry, CliError> {
    let id: String = Input::new()
        .with_prompt("Network id")
        .interact_text()
        .map_err(prompt_err)?;
    let name: String = Input::new()
        .with_prompt("Display name")
        .default(id.clone())
        .interact_text()
        .map_err(prompt_err)?;
    let token = prompt_token(&id)?;

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let token = if store_selection == 0 {
        meshwatch_config::store_token(profile_name, &id, &token)?;
        eprintln!("   ✓ Token stored in system keyring");
        None
    } else {
        Some(token)
    };

    Ok(NetworkEntry {
        id,
        name: Some(name),
        token,
        token_env: None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("meshwatch configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_host: String = Input::new()
                .with_prompt("API host")
                .default(meshwatch_config::DEFAULT_API_HOST.into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut networks = vec![prompt_network(&profile_name)?];
            while Confirm::new()
                .with_prompt("Add another network?")
                .default(false)
                .interact()
                .map_err(prompt_err)?
            {
                networks.push(prompt_network(&profile_name)?);
            }

            let profile = Profile {
                api_host: (api_host != meshwatch_config::DEFAULT_API_HOST).then_some(api_host),
                networks,
                ..Profile::default()
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = meshwatch_config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: meshwatch status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml_or_debug(c),
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { network, profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| active_profile_name(global, &cfg));

            let known = cfg
                .profiles
                .get(&profile_name)
                .is_some_and(|p| p.networks.iter().any(|n| n.id == network));
            if !known {
                return Err(CliError::NotFound {
                    resource_type: "network".into(),
                    identifier: format!("{network} (profile '{profile_name}')"),
                    list_command: "config show".into(),
                });
            }

            let token = prompt_token(&network)?;
            meshwatch_config::store_token(&profile_name, &network, &token)?;
            eprintln!("✓ Token stored in system keyring for {profile_name}/{network}");
            Ok(())
        }
    }
}

/// Hide plaintext tokens before display.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        for network in &mut profile.networks {
            if network.token.is_some() {
                network.token = Some("********".into());
            }
        }
    }
    cfg
}

fn toml_or_debug(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|_| format!("{cfg:#?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_never_prints_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                networks: vec![NetworkEntry {
                    id: "n1".into(),
                    token: Some("hunter2".into()),
                    ..NetworkEntry::default()
                }],
                ..Profile::default()
            },
        );
        let shown = toml_or_debug(&redacted(cfg));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("********"));
    }
}
