//! Line items and money arithmetic shared by estimates, invoices and
//! purchase orders. Amounts are rounded half away from zero to cents.

use crate::errors::ServiceError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    /// `None` when the product does not fit in a `Decimal`
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseLineItem {
    /// Stock item replenished when the order is received
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

impl PurchaseLineItem {
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn check_line(index: usize, description: &str, quantity: Decimal, price: Decimal) -> Result<(), ServiceError> {
    if description.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "line_items[{}].description must not be empty",
            index
        )));
    }
    if quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "line_items[{}].quantity must be greater than zero",
            index
        )));
    }
    if price.is_sign_negative() {
        return Err(ServiceError::ValidationError(format!(
            "line_items[{}] price must not be negative",
            index
        )));
    }
    Ok(())
}

fn out_of_range(index: usize) -> ServiceError {
    ServiceError::ValidationError(format!("line_items[{}] amount out of range", index))
}

fn sum_amounts<I>(amounts: I) -> Result<Decimal, ServiceError>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    amounts
        .into_iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |acc, (index, amount)| {
            amount
                .and_then(|amount| acc.checked_add(amount))
                .ok_or_else(|| out_of_range(index))
        })
}

pub fn validate_tax_rate(rate: Decimal) -> Result<(), ServiceError> {
    if rate.is_sign_negative() || rate > Decimal::ONE {
        return Err(ServiceError::ValidationError(
            "tax_rate must be between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates the items and computes subtotal, tax and total
pub fn compute_totals(items: &[LineItem], tax_rate: Decimal) -> Result<Totals, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one line item is required".to_string(),
        ));
    }
    validate_tax_rate(tax_rate)?;
    for (index, item) in items.iter().enumerate() {
        check_line(index, &item.description, item.quantity, item.unit_price)?;
    }

    let subtotal = round2(sum_amounts(items.iter().map(LineItem::amount))?);
    let tax_amount = subtotal
        .checked_mul(tax_rate)
        .map(round2)
        .ok_or_else(|| ServiceError::ValidationError("tax amount out of range".to_string()))?;
    let total = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| ServiceError::ValidationError("invoice total out of range".to_string()))?;
    Ok(Totals {
        subtotal,
        tax_rate,
        tax_amount,
        total,
    })
}

/// Validates purchase lines and returns the order total
pub fn purchase_total(items: &[PurchaseLineItem]) -> Result<Decimal, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one line item is required".to_string(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        check_line(index, &item.description, item.quantity, item.unit_cost)?;
    }
    Ok(round2(sum_amounts(items.iter().map(PurchaseLineItem::amount))?))
}

pub fn to_json<T: Serialize>(items: &[T]) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(items)
        .map_err(|e| ServiceError::InternalError(format!("failed to encode line items: {}", e)))
}

pub fn from_json<T: for<'de> Deserialize<'de>>(value: &serde_json::Value) -> Result<Vec<T>, ServiceError> {
    serde_json::from_value(value.clone())
        .map_err(|e| ServiceError::InternalError(format!("stored line items are corrupt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal) -> LineItem {
        LineItem {
            description: "Architectural shingles".into(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn totals_apply_tax_to_subtotal() {
        let totals = compute_totals(
            &[item(dec!(10), dec!(95.00)), item(dec!(2), dec!(37.50))],
            dec!(0.0825),
        )
        .unwrap();
        assert_eq!(totals.subtotal, dec!(1025.00));
        assert_eq!(totals.tax_amount, dec!(84.56));
        assert_eq!(totals.total, dec!(1109.56));
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 10.10 * 0.05 = 0.505
        let totals = compute_totals(&[item(dec!(1), dec!(10.10))], dec!(0.05)).unwrap();
        assert_eq!(totals.tax_amount, dec!(0.51));
        assert_eq!(round2(dec!(-0.505)), dec!(-0.51));
    }

    #[test]
    fn zero_tax_rate_keeps_total_equal_to_subtotal() {
        let totals = compute_totals(&[item(dec!(3), dec!(19.99))], Decimal::ZERO).unwrap();
        assert_eq!(totals.total, dec!(59.97));
        assert_eq!(totals.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(compute_totals(&[], dec!(0.1)).is_err());
        assert!(compute_totals(&[item(dec!(0), dec!(1))], dec!(0.1)).is_err());
        assert!(compute_totals(&[item(dec!(1), dec!(-1))], dec!(0.1)).is_err());
        assert!(compute_totals(&[item(dec!(1), dec!(1))], dec!(1.5)).is_err());

        let mut blank = item(dec!(1), dec!(1));
        blank.description = "  ".into();
        assert!(compute_totals(&[blank], dec!(0.1)).is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let huge = Decimal::MAX;
        let err = compute_totals(&[item(huge, dec!(2))], dec!(0.1)).unwrap_err();
        assert!(err.to_string().contains("line_items[0] amount out of range"));

        // Each line fits, the sum does not
        let err = compute_totals(&[item(huge, dec!(1)), item(huge, dec!(1))], Decimal::ZERO)
            .unwrap_err();
        assert!(err.to_string().contains("line_items[1]"));

        let line = PurchaseLineItem {
            inventory_item_id: None,
            description: "Ridge cap".into(),
            quantity: huge,
            unit_cost: dec!(3),
        };
        assert!(matches!(
            purchase_total(&[line]),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn purchase_total_sums_lines() {
        let lines = vec![
            PurchaseLineItem {
                inventory_item_id: None,
                description: "Ice and water shield".into(),
                quantity: dec!(4),
                unit_cost: dec!(62.25),
            },
            PurchaseLineItem {
                inventory_item_id: Some(Uuid::new_v4()),
                description: "Drip edge".into(),
                quantity: dec!(20),
                unit_cost: dec!(7.10),
            },
        ];
        assert_eq!(purchase_total(&lines).unwrap(), dec!(391.00));
    }
}
