use std::io;

use clap::Args;
use washday::orders::OrderTracker;
use washday_app::{api::ApiClient, auth::AuthSession, config::AppConfig, render};

#[derive(Debug, Args)]
pub(crate) struct TrackArgs {
    /// Order number, e.g. ORD1716563400123
    order_number: String,
}

pub(crate) async fn run(config: &AppConfig, args: TrackArgs) -> Result<(), String> {
    let token = match &config.auth_file {
        Some(path) => {
            let auth = AuthSession::load(path).map_err(|error| error.to_string())?;

            Some(auth.token().clone())
        }
        None => None,
    };

    let client = ApiClient::new(&config.api, token)
        .map_err(|error| format!("failed to create api client: {error}"))?;

    let order = client
        .track(args.order_number.trim())
        .await
        .map_err(|error| error.to_string())?;

    render::write_tracking(io::stdout(), &order)
        .map_err(|error| format!("failed to write order: {error}"))
}
