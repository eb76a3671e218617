//! Recurring-billing discount derived from a line's list and promo prices.

use crate::types::ProductLine;

/// `(ceil(price × 100) − ceil(promo × 100)) / 100`.
///
/// Each price is rounded up to whole cents independently before subtracting,
/// which keeps float drift out of the result (19.99 / 9.99 gives exactly 10.00).
#[must_use]
pub fn rebill_discount(price: f64, promo_price: f64) -> f64 {
    ((price * 100.0).ceil() - (promo_price * 100.0).ceil()) / 100.0
}

/// Derives `rebillDiscount` for a line that has a promo price, a list price
/// and no discount of its own.
///
/// The promo price is dropped from the derived line and `discountCycleCount`
/// defaults to 1. Lines that do not qualify are returned unchanged.
#[must_use]
pub fn apply_rebill_discount(line: &ProductLine) -> ProductLine {
    let promo_price = line.promo_price.filter(|p| *p != 0.0);
    let has_discount = line.rebill_discount.is_some_and(|d| d != 0.0);

    match (promo_price, line.price) {
        (Some(promo), Some(price)) if !has_discount => ProductLine {
            promo_price: None,
            rebill_discount: Some(rebill_discount(price, promo)),
            discount_cycle_count: Some(line.discount_cycle_count.filter(|c| *c != 0).unwrap_or(1)),
            ..line.clone()
        },
        _ => line.clone(),
    }
}
