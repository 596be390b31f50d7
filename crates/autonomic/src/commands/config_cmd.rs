//! Config subcommand handlers.

use autonomic_config::{example_config, save_config, to_toml};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{config_file, load_with_overrides};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_file(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let path = config_file(global);
            if !path.exists() && global.base_url.is_none() {
                return Err(CliError::NoConfig {
                    path: path.display().to_string(),
                });
            }

            let cfg = load_with_overrides(global)?;
            let toml = to_toml(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| toml.trim_end().to_owned(),
                |c| c.zones.iter().map(|z| z.name.as_str()).collect::<Vec<_>>().join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = example_config();
            if let Some(ref url) = global.base_url {
                cfg.remote.base_url.clone_from(url);
            }
            if let Some(timeout) = global.timeout {
                cfg.remote.timeout = timeout;
            }
            cfg.validate()?;
            save_config(&cfg, &path)?;

            output::print_output(
                &format!("Wrote starter config to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
