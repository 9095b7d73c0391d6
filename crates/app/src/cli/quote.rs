use std::{io, sync::Arc};

use clap::Args;
use washday::{
    customer::{CustomerContext, CustomerId},
    location::GeolocationProvider,
    session::BookingSession,
};
use washday_app::{
    config::AppConfig,
    geocoding::{FixedPosition, NoGeocoder},
    render,
};

use super::SelectionArgs;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    #[command(flatten)]
    pub(super) selection: SelectionArgs,
}

pub(crate) fn run(config: &AppConfig, args: QuoteArgs) -> Result<(), String> {
    let catalog = super::load_catalog(config)?;

    let mut session = BookingSession::new(
        catalog,
        CustomerContext::new(CustomerId::new("guest"), "Guest"),
        GeolocationProvider::new(Arc::new(FixedPosition::default()), Arc::new(NoGeocoder)),
    );

    args.selection
        .apply(&mut session)
        .map_err(|error| error.to_string())?;

    render::write_quote(io::stdout(), &session.quote())
        .map_err(|error| format!("failed to write quote: {error}"))
}
