use std::{io, sync::Arc};

use clap::Args;
use jiff::Timestamp;
use washday::{
    address::{CustomAddress, PickupAddressChoice},
    checkout::Checkout,
    errors::BookingError,
    location::{Coordinates, GeolocationProvider, ReverseGeocoder},
    session::BookingSession,
};
use washday_app::{
    api::{ApiClient, requests::CreateOrderRequest},
    auth::{AuthSession, SessionAddressSource},
    config::AppConfig,
    geocoding::{FixedPosition, NoGeocoder, NominatimGeocoder},
    render,
};

use super::SelectionArgs;

#[derive(Debug, Args)]
pub(crate) struct BookArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Device latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lng: Option<f64>,

    /// Skip reverse geocoding and describe the location by its coordinates
    #[arg(long)]
    no_geocode: bool,

    /// Pickup address to use instead of the registered one
    #[arg(long)]
    address: Option<String>,

    /// Landmark near the pickup address
    #[arg(long, requires = "address")]
    landmark: Option<String>,

    /// Pickup time, e.g. 2026-05-25T04:30:00Z
    #[arg(long)]
    pickup_at: Option<Timestamp>,

    /// Notes for the pickup crew
    #[arg(long)]
    instructions: Option<String>,

    /// Print the request that would be sent instead of submitting it
    #[arg(long)]
    dry_run: bool,
}

impl BookArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    fn geocoder(&self, config: &AppConfig) -> Result<Arc<dyn ReverseGeocoder>, String> {
        if self.no_geocode {
            return Ok(Arc::new(NoGeocoder));
        }

        let geocoder = NominatimGeocoder::new(&config.geocoder)
            .map_err(|error| format!("failed to create geocoder: {error}"))?;

        Ok(Arc::new(geocoder))
    }
}

pub(crate) async fn run(config: &AppConfig, args: BookArgs) -> Result<(), String> {
    let auth_file = config
        .auth_file
        .as_ref()
        .ok_or("--auth-file or WASHDAY_AUTH_FILE is required to book")?;

    let auth = AuthSession::load(auth_file).map_err(|error| error.to_string())?;
    let catalog = super::load_catalog(config)?;

    let provider = GeolocationProvider::new(
        Arc::new(FixedPosition::new(args.coordinates())),
        args.geocoder(config)?,
    )
    .with_geocode_timeout(config.geocoder.geocode_timeout());

    let mut session = BookingSession::new(catalog, auth.customer(), provider);

    args.selection
        .apply(&mut session)
        .map_err(|error| error.to_string())?;

    if let Some(address) = args.address {
        session.set_address_choice(PickupAddressChoice::Custom(CustomAddress::new(
            address,
            args.landmark,
        )));
    }

    if let Some(pickup_at) = args.pickup_at {
        session
            .set_schedule(pickup_at)
            .map_err(|error| error.to_string())?;
    }

    session.set_instructions(args.instructions);

    match session.capture_location().await {
        Ok(outcome) => println!("location: {}", outcome.capture().resolved_address()),
        Err(error) => eprintln!("location unavailable: {error}"),
    }

    render::write_quote(io::stdout(), &session.quote())
        .map_err(|error| format!("failed to write quote: {error}"))?;

    if args.dry_run {
        return preview(&session, &auth);
    }

    let orders = ApiClient::new(&config.api, Some(auth.token().clone()))
        .map_err(|error| format!("failed to create api client: {error}"))?;

    let checkout = Checkout::new(
        Arc::new(SessionAddressSource::new(&auth)),
        Arc::new(orders),
    );

    match checkout.submit(session).await {
        Ok(order) => {
            println!("order_number: {}", order.order_number);
            println!("status: {}", order.status.as_str());
            println!("created_at: {}", order.created_at);

            Ok(())
        }
        Err(rejected) => Err(describe(&rejected.error)),
    }
}

fn preview(session: &BookingSession, auth: &AuthSession) -> Result<(), String> {
    let payload = session
        .build_submission_payload(auth.registered_address())
        .map_err(|error| describe(&error))?;

    let body = serde_json::to_string_pretty(&CreateOrderRequest::from(&payload))
        .map_err(|error| format!("failed to encode request: {error}"))?;

    println!("{body}");

    Ok(())
}

fn describe(error: &BookingError) -> String {
    let BookingError::IncompleteSession(violations) = error else {
        return format!("booking not submitted: {error}");
    };

    let mut out = Vec::new();

    if render::write_violations(&mut out, violations).is_err() {
        return format!("booking not submitted: {error}");
    }

    format!(
        "booking is incomplete:\n{}",
        String::from_utf8_lossy(&out).trim_end()
    )
}
