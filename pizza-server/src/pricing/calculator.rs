//! Pizza Price Calculator
//!
//! Turns (base price, size, crust, toppings) into a deterministic price
//! breakdown. Pure functions: no I/O, never fail. Prices are clamped to
//! `[0, MAX_PRICE]` before any arithmetic; the server paths reject
//! out-of-range prices earlier, in [`validate_cart`](super::validate_cart).
//!
//! Rounding happens twice, on the size-adjusted base and on the final total,
//! so a base of 1003 on a medium yields 1203.6 rather than a value rounded
//! only at the end.

use super::money::{MAX_PRICE, bounded, round2, to_decimal, to_f64};
use rust_decimal::prelude::*;
use shared::models::{CartLine, CartQuote, Crust, LinePrice, PriceBreakdown, PriceInput, Size, Topping};

/// Number of toppings per pizza that carry no charge (first N by input order)
pub const FREE_TOPPINGS: usize = 3;

/// Price of a charged topping that has no explicit price
pub const DEFAULT_TOPPING_PRICE: f64 = 150.0;

fn size_multiplier(size: Size) -> Decimal {
    match size {
        Size::Small => Decimal::ONE,
        Size::Medium => Decimal::new(12, 1),
        Size::Large => Decimal::new(14, 1),
    }
}

fn crust_surcharge(crust: Crust) -> Decimal {
    match crust {
        Crust::Traditional | Crust::Classic | Crust::Other => Decimal::ZERO,
        Crust::Thin => Decimal::from(150),
        Crust::Stuffed => Decimal::from(350),
    }
}

/// Charge for one topping beyond the free allowance
fn topping_charge(topping: &Topping) -> Decimal {
    match topping.price {
        Some(price) if price.is_finite() => bounded(price, MAX_PRICE),
        _ => to_decimal(DEFAULT_TOPPING_PRICE),
    }
}

fn breakdown(base_price: f64, size: Size, crust: Crust, toppings: &[Topping]) -> PriceBreakdown {
    // Negative or non-finite reference prices degrade to zero, huge ones to MAX_PRICE
    let base = bounded(base_price, MAX_PRICE);
    let adjusted_base = round2(base * size_multiplier(size));
    let crust_price = crust_surcharge(crust);
    let topping_price = round2(
        toppings
            .iter()
            .skip(FREE_TOPPINGS)
            .map(topping_charge)
            .sum::<Decimal>(),
    );

    let total = adjusted_base + crust_price + topping_price;

    PriceBreakdown {
        base_price: to_f64(adjusted_base),
        crust_price: to_f64(crust_price),
        topping_price: to_f64(topping_price),
        free_toppings: toppings.len().min(FREE_TOPPINGS) as u32,
        charged_toppings: toppings.len().saturating_sub(FREE_TOPPINGS) as u32,
        total: to_f64(total),
    }
}

/// Line-item breakdown for one pizza
///
/// `size` and `crust` are free-form strings; unknown sizes price as small and
/// unknown crusts carry no surcharge.
pub fn get_price_breakdown(
    base_price: f64,
    size: &str,
    crust: &str,
    toppings: &[Topping],
) -> PriceBreakdown {
    breakdown(base_price, Size::parse(size), Crust::parse(crust), toppings)
}

/// Total price for one pizza
pub fn calculate_price(base_price: f64, size: &str, crust: &str, toppings: &[Topping]) -> f64 {
    get_price_breakdown(base_price, size, crust, toppings).total
}

/// Breakdown for an already-parsed quote request
pub fn quote(input: &PriceInput) -> PriceBreakdown {
    breakdown(input.base_price, input.size, input.crust, &input.toppings)
}

/// Price one cart line: unit breakdown times quantity
pub fn price_line(line: &CartLine) -> LinePrice {
    let unit = breakdown(line.base_price, line.size, line.crust, &line.toppings);
    let line_total = to_f64(to_decimal(unit.total) * Decimal::from(line.quantity));

    LinePrice {
        name: line.name.clone(),
        size: line.size,
        crust: line.crust,
        toppings: line.toppings.clone(),
        quantity: line.quantity,
        unit,
        line_total,
    }
}

/// Price every line and sum the line totals
pub fn price_cart(lines: &[CartLine]) -> CartQuote {
    let lines: Vec<LinePrice> = lines.iter().map(price_line).collect();
    let subtotal = lines
        .iter()
        .map(|l| to_decimal(l.line_total))
        .sum::<Decimal>();

    CartQuote {
        lines,
        subtotal: to_f64(subtotal),
    }
}
