//! Terminal rendering of catalogs, quotes and tracked orders.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use washday::{
    catalog::{Catalog, Category},
    orders::TrackedOrder,
    pricing::{PricingMode, Quote, tariff::ServiceType},
    session::Violations,
    tracking::{StepState, Timeline},
};

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Option<Columns<std::ops::Range<usize>>>,
) -> io::Result<()> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());

    if let Some(columns) = numeric {
        table.modify(columns, Alignment::right());
    }

    writeln!(out, "{table}")
}

/// Write the per-piece price list and per-kg rates.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_catalog(mut out: impl io::Write, catalog: &Catalog) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Category", "Item", "Price", "Unit"]);

    for category in Category::ALL {
        for item in catalog.in_category(category) {
            builder.push_record([
                category.label().to_string(),
                item.name().to_string(),
                item.unit_price().to_string(),
                item.unit().unwrap_or("piece").to_string(),
            ]);
        }
    }

    write_table(&mut out, builder, Some(Columns::new(2..3)))?;

    let mut rates = Builder::default();
    rates.push_record(["Service", "Per kg"]);

    for service_type in ServiceType::ALL {
        rates.push_record([
            format!("{} ({service_type})", service_type.label()),
            catalog.tariff().rate_per_kg(service_type).to_string(),
        ]);
    }

    write_table(&mut out, rates, Some(Columns::new(1..2)))
}

/// Write a price breakdown.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_quote(mut out: impl io::Write, quote: &Quote) -> io::Result<()> {
    if quote.is_empty() {
        let hint = match quote.mode() {
            PricingMode::PerPiece => "no items selected",
            PricingMode::PerWeight => "no weight entered",
        };

        return writeln!(out, "{} quote: {hint}, total {}", quote.mode(), quote.total());
    }

    let quantity_header = match quote.mode() {
        PricingMode::PerPiece => "Qty",
        PricingMode::PerWeight => "Kg",
    };

    let mut builder = Builder::default();
    builder.push_record(["Item", "Rate", quantity_header, "Subtotal"]);

    for line in quote.lines() {
        builder.push_record([
            line.label.clone(),
            line.unit_price.to_string(),
            line.quantity.normalize().to_string(),
            line.subtotal.to_string(),
        ]);
    }

    builder.push_record([
        "Total".to_string(),
        String::new(),
        String::new(),
        quote.total().to_string(),
    ]);

    write_table(&mut out, builder, Some(Columns::new(1..4)))
}

/// Write the reasons a booking cannot be submitted yet.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_violations(mut out: impl io::Write, violations: &Violations) -> io::Result<()> {
    for violation in violations.iter() {
        writeln!(out, "  - {} ({})", violation.message(), violation.code())?;
    }

    Ok(())
}

fn step_marker(state: StepState) -> &'static str {
    match state {
        StepState::Completed => "done",
        StepState::Current => "now",
        StepState::Upcoming => "",
    }
}

/// Write an order's details and progress timeline.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_tracking(mut out: impl io::Write, order: &TrackedOrder) -> io::Result<()> {
    let mut details = Builder::default();
    details.push_record(["Order", order.order_number.as_str()]);
    details.push_record(["Service", order.service_type.as_str()]);

    if let Some(weight) = order.total_weight {
        details.push_record(["Weight".to_string(), format!("{} kg", weight.normalize())]);
    }

    details.push_record(["Total".to_string(), order.total_price.to_string()]);
    details.push_record(["Status", order.status.as_str()]);

    if let Some(pickup) = order.pickup_date {
        details.push_record(["Pickup".to_string(), pickup.to_string()]);
    }

    if let Some(delivery) = order.delivery_date {
        details.push_record(["Delivery".to_string(), delivery.to_string()]);
    }

    if let Some(instructions) = &order.special_instructions {
        details.push_record(["Instructions", instructions.as_str()]);
    }

    write_table(&mut out, details, None)?;

    let timeline = Timeline::for_status(order.status);

    if timeline.is_cancelled() {
        return writeln!(out, "This order was cancelled.");
    }

    let mut steps = Builder::default();
    steps.push_record(["Step", "Progress"]);

    for step in timeline.steps() {
        steps.push_record([step.label, step_marker(step.state)]);
    }

    write_table(&mut out, steps, None)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;
    use washday::{
        cart::Cart,
        money::rupees,
        orders::OrderStatus,
        pricing::{WeightKg, WeightSelection},
    };

    use super::*;

    fn rendered(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> TestResult<String> {
        let mut out = Vec::new();
        write(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn catalog_lists_every_item_and_rate() -> TestResult {
        let catalog = Catalog::standard()?;

        let text = rendered(|out| write_catalog(out, &catalog))?;

        for item in catalog.items() {
            assert!(text.contains(item.name()), "missing {}", item.name());
        }
        assert!(text.contains("Wash + Iron (wash-iron)"));

        Ok(())
    }

    #[test]
    fn quote_shows_total_row() -> TestResult {
        let catalog = Catalog::standard()?;
        let selection =
            WeightSelection::new(ServiceType::WashIron, WeightKg::new(Decimal::from(5))?);
        let quote = Quote::new(
            PricingMode::PerWeight,
            &Cart::new(),
            Some(&selection),
            catalog.tariff(),
        );

        let text = rendered(|out| write_quote(out, &quote))?;

        assert!(text.contains("Wash + Iron"));
        assert!(text.contains("Total"));
        assert!(text.contains(&rupees(745).to_string()));

        Ok(())
    }

    #[test]
    fn empty_quote_is_one_line() -> TestResult {
        let catalog = Catalog::standard()?;
        let quote = Quote::new(PricingMode::PerPiece, &Cart::new(), None, catalog.tariff());

        let text = rendered(|out| write_quote(out, &quote))?;

        assert!(text.starts_with("per-piece quote: no items selected"));

        Ok(())
    }

    #[test]
    fn cancelled_order_has_no_progress_table() -> TestResult {
        let order = TrackedOrder {
            order_number: "ORD1".to_string(),
            service_type: "wash-dry".to_string(),
            total_weight: Some(Decimal::from(3)),
            total_price: rupees(297),
            status: OrderStatus::Cancelled,
            pickup_date: None,
            delivery_date: None,
            special_instructions: None,
        };

        let text = rendered(|out| write_tracking(out, &order))?;

        assert!(text.contains("This order was cancelled."));
        assert!(!text.contains("Order Placed"));

        Ok(())
    }

    #[test]
    fn active_order_marks_current_step() -> TestResult {
        let order = TrackedOrder {
            order_number: "ORD2".to_string(),
            service_type: "per-piece".to_string(),
            total_weight: None,
            total_price: rupees(58),
            status: OrderStatus::Processing,
            pickup_date: None,
            delivery_date: None,
            special_instructions: Some("Light starch".to_string()),
        };

        let text = rendered(|out| write_tracking(out, &order))?;

        assert!(text.contains("Processing"));
        assert!(text.contains("now"));
        assert!(text.contains("Light starch"));
        assert!(!text.contains("Weight"));

        Ok(())
    }
}
