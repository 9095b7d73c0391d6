use std::{str::FromStr, sync::Arc};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use washday::{
    catalog::Catalog,
    errors::BookingError,
    pricing::{PricingMode, tariff::ServiceType},
    session::BookingSession,
};
use washday_app::{config::AppConfig, observability};

mod book;
mod catalog;
mod quote;
mod track;

#[derive(Debug, Parser)]
#[command(name = "washday", about = "Laundry pickup booking", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the price list and per-kg rates
    Catalog,

    /// Price a selection without booking
    Quote(quote::QuoteArgs),

    /// Book a pickup for the signed-in customer
    Book(book::BookArgs),

    /// Show an order's progress
    Track(track::TrackArgs),
}

impl Cli {
    /// Read `.env`, then parse the command line.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        let _env = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_logging(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Catalog => catalog::run(&self.config),
            Commands::Quote(args) => quote::run(&self.config, args),
            Commands::Book(args) => book::run(&self.config, args).await,
            Commands::Track(args) => track::run(&self.config, args).await,
        }
    }
}

fn load_catalog(config: &AppConfig) -> Result<Arc<Catalog>, String> {
    config
        .load_catalog()
        .map(Arc::new)
        .map_err(|error| format!("failed to load catalog: {error}"))
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ModeArg {
    #[default]
    PerKg,
    PerPiece,
}

impl From<ModeArg> for PricingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerKg => Self::PerWeight,
            ModeArg::PerPiece => Self::PerPiece,
        }
    }
}

/// A catalog item and how many pieces of it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ItemArg {
    name: String,
    quantity: u32,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, quantity) = match value.rsplit_once('=') {
            Some((name, quantity)) => {
                let quantity = quantity
                    .trim()
                    .parse::<u32>()
                    .map_err(|error| format!("invalid quantity {quantity:?}: {error}"))?;

                (name, quantity)
            }
            None => (value, 1),
        };

        let name = name.trim();

        if name.is_empty() {
            return Err("item name cannot be empty".to_string());
        }

        if quantity == 0 {
            return Err(format!("quantity for {name:?} must be at least 1"));
        }

        Ok(Self {
            name: name.to_string(),
            quantity,
        })
    }
}

/// What is being washed: per-kg weight or per-piece items.
#[derive(Debug, Args)]
pub(crate) struct SelectionArgs {
    /// Pricing mode
    #[arg(long, value_enum, default_value_t)]
    mode: ModeArg,

    /// Catalog item as NAME or NAME=QUANTITY; repeatable
    #[arg(long = "item", value_name = "NAME[=QTY]")]
    items: Vec<ItemArg>,

    /// Laundry weight in kg
    #[arg(long)]
    weight: Option<Decimal>,

    /// Per-kg service
    #[arg(long, default_value = "wash-iron")]
    service: ServiceType,
}

impl SelectionArgs {
    /// Put the selection into `session`.
    fn apply(&self, session: &mut BookingSession) -> Result<(), BookingError> {
        session.set_mode(self.mode.into());

        for item in &self.items {
            session.add_item(&item.name)?;

            if item.quantity > 1 {
                session.change_quantity(&item.name, i64::from(item.quantity - 1))?;
            }
        }

        if let Some(weight) = self.weight {
            session.set_weight(self.service, weight)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use washday::{
        customer::{CustomerContext, CustomerId},
        location::GeolocationProvider,
        money::rupees,
    };
    use washday_app::geocoding::{FixedPosition, NoGeocoder};

    use super::*;

    fn session() -> TestResult<BookingSession> {
        Ok(BookingSession::new(
            Arc::new(Catalog::standard()?),
            CustomerContext::new(CustomerId::new("guest"), "Guest"),
            GeolocationProvider::new(Arc::new(FixedPosition::default()), Arc::new(NoGeocoder)),
        ))
    }

    #[test]
    fn item_arg_defaults_to_one_piece() -> TestResult {
        assert_eq!(
            "Shirt (Ironed)".parse::<ItemArg>()?,
            ItemArg {
                name: "Shirt (Ironed)".to_string(),
                quantity: 1
            }
        );

        Ok(())
    }

    #[test]
    fn item_arg_reads_quantity() -> TestResult {
        assert_eq!(
            "Pant (Ironed) = 3".parse::<ItemArg>()?,
            ItemArg {
                name: "Pant (Ironed)".to_string(),
                quantity: 3
            }
        );

        Ok(())
    }

    #[test]
    fn item_arg_rejects_zero_and_blank() {
        assert!("Shirt (Ironed)=0".parse::<ItemArg>().is_err());
        assert!("=2".parse::<ItemArg>().is_err());
        assert!("Shirt (Ironed)=two".parse::<ItemArg>().is_err());
    }

    #[test]
    fn per_piece_selection_fills_cart() -> TestResult {
        let cli = Cli::try_parse_from([
            "washday",
            "quote",
            "--mode",
            "per-piece",
            "--item",
            "Shirt (Ironed)=2",
            "--item",
            "Normal Cleaning",
        ])?;

        let Commands::Quote(args) = cli.command else {
            panic!("Expected quote command");
        };

        let mut session = session()?;
        args.selection.apply(&mut session)?;

        assert_eq!(session.mode(), PricingMode::PerPiece);
        assert_eq!(session.compute_price(), rupees(307));

        Ok(())
    }

    #[test]
    fn per_kg_selection_sets_weight() -> TestResult {
        let cli = Cli::try_parse_from([
            "washday", "quote", "--weight", "3", "--service", "wash-dry",
        ])?;

        let Commands::Quote(args) = cli.command else {
            panic!("Expected quote command");
        };

        let mut session = session()?;
        args.selection.apply(&mut session)?;

        assert_eq!(session.mode(), PricingMode::PerWeight);
        assert_eq!(session.compute_price(), rupees(297));

        Ok(())
    }

    #[test]
    fn unknown_item_is_reported() -> TestResult {
        let cli = Cli::try_parse_from([
            "washday", "quote", "--mode", "per-piece", "--item", "Tuxedo",
        ])?;

        let Commands::Quote(args) = cli.command else {
            panic!("Expected quote command");
        };

        let mut session = session()?;
        let result = args.selection.apply(&mut session);

        assert!(matches!(result, Err(BookingError::UnknownItem(name)) if name == "Tuxedo"));

        Ok(())
    }
}
