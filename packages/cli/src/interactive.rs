//! Interactive mode: choose what to do from a menu.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use snow_map_pipeline::config::DEFAULT_CONFIG_FILE;
use snow_map_server::ServeOptions;

/// Top-level actions.
enum Action {
    Render,
    Serve,
    Stats,
}

impl Action {
    const ALL: &[Self] = &[Self::Render, Self::Serve, Self::Stats];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Render => "Render map to a folder",
            Self::Serve => "Start server",
            Self::Stats => "Show statistics",
        }
    }
}

/// Prompts for an action and its config file, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Cholera Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let config: String = Input::new()
        .with_prompt("Config file")
        .default(DEFAULT_CONFIG_FILE.to_string())
        .interact_text()?;
    let config = PathBuf::from(config);

    match Action::ALL[idx] {
        Action::Render => {
            let out: String = Input::new()
                .with_prompt("Output directory")
                .default("site".to_string())
                .interact_text()?;
            crate::render(&config, &PathBuf::from(out))?;
        }
        Action::Serve => {
            let config = crate::load_config(&config)?;
            actix_web::rt::System::new().block_on(snow_map_server::interactive::run(
                ServeOptions {
                    config,
                    ..ServeOptions::default()
                },
            ))?;
        }
        Action::Stats => crate::stats(&config)?,
    }

    Ok(())
}
