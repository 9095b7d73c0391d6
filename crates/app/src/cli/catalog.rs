use std::io;

use washday_app::{config::AppConfig, render};

pub(crate) fn run(config: &AppConfig) -> Result<(), String> {
    let catalog = super::load_catalog(config)?;

    render::write_catalog(io::stdout(), &catalog)
        .map_err(|error| format!("failed to write catalog: {error}"))
}
