//! Cart validation
//!
//! Pricing itself never fails; lines that cannot be sold are rejected here,
//! before pricing, by both the quote and checkout paths.

use shared::error::{AppError, ErrorCode};
use shared::models::{CartLine, PriceInput, Topping};
use thiserror::Error;

use super::money::MAX_PRICE;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error("Cart has no items")]
    Empty,

    #[error("Line {index}: quantity must be between 1 and 99, got {quantity}")]
    InvalidQuantity { index: usize, quantity: u32 },

    #[error("Line {index}: base price must be a finite amount up to 1000000")]
    InvalidPrice { index: usize },

    #[error("Line {index}: topping {topping} price must be a finite amount up to 1000000")]
    InvalidToppingPrice { index: usize, topping: usize },
}

fn price_in_range(price: f64) -> bool {
    price.is_finite() && price <= MAX_PRICE
}

fn check_prices(index: usize, base_price: f64, toppings: &[Topping]) -> Result<(), CartError> {
    if !price_in_range(base_price) {
        return Err(CartError::InvalidPrice { index });
    }
    if let Some(topping) = toppings
        .iter()
        .position(|t| t.price.is_some_and(|p| !price_in_range(p)))
    {
        return Err(CartError::InvalidToppingPrice { index, topping });
    }
    Ok(())
}

/// Validate a single-pizza quote request
pub fn validate_price_input(input: &PriceInput) -> Result<(), CartError> {
    check_prices(0, input.base_price, &input.toppings)
}

/// Validate every line of a cart
pub fn validate_cart(lines: &[CartLine]) -> Result<(), CartError> {
    if lines.is_empty() {
        return Err(CartError::Empty);
    }
    for (index, line) in lines.iter().enumerate() {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&line.quantity) {
            return Err(CartError::InvalidQuantity {
                index,
                quantity: line.quantity,
            });
        }
        check_prices(index, line.base_price, &line.toppings)?;
    }
    Ok(())
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let message = err.to_string();
        match err {
            CartError::Empty => AppError::with_message(ErrorCode::OrderEmpty, message),
            CartError::InvalidQuantity { index, quantity } => {
                AppError::with_message(ErrorCode::OrderInvalidQuantity, message)
                    .with_detail("line", index)
                    .with_detail("quantity", quantity)
            }
            CartError::InvalidPrice { index } => {
                AppError::with_message(ErrorCode::ValueOutOfRange, message)
                    .with_detail("line", index)
            }
            CartError::InvalidToppingPrice { index, topping } => {
                AppError::with_message(ErrorCode::ValueOutOfRange, message)
                    .with_detail("line", index)
                    .with_detail("topping", topping)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Crust, Size};

    fn line(quantity: u32, base_price: f64) -> CartLine {
        CartLine {
            name: "Pepperoni".into(),
            base_price,
            size: Size::Medium,
            crust: Crust::Classic,
            toppings: vec![],
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(validate_cart(&[]), Err(CartError::Empty));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_cart(&[line(1, 10.0), line(99, 10.0)]).is_ok());
        assert_eq!(
            validate_cart(&[line(1, 10.0), line(0, 10.0)]),
            Err(CartError::InvalidQuantity {
                index: 1,
                quantity: 0
            })
        );
        assert!(matches!(
            validate_cart(&[line(100, 10.0)]),
            Err(CartError::InvalidQuantity { quantity: 100, .. })
        ));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        assert_eq!(
            validate_cart(&[line(1, f64::INFINITY)]),
            Err(CartError::InvalidPrice { index: 0 })
        );
    }

    #[test]
    fn test_price_upper_bound() {
        assert!(validate_cart(&[line(1, MAX_PRICE)]).is_ok());
        assert_eq!(
            validate_cart(&[line(1, MAX_PRICE + 1.0)]),
            Err(CartError::InvalidPrice { index: 0 })
        );
        assert_eq!(
            validate_cart(&[line(1, 7e28)]),
            Err(CartError::InvalidPrice { index: 0 })
        );
    }

    #[test]
    fn test_huge_topping_price_rejected() {
        let mut pizza = line(2, 1000.0);
        pizza.toppings = vec![
            Topping::priced("a", 1.0),
            Topping::new("b"),
            Topping::priced("c", MAX_PRICE),
            Topping::priced("d", 7e28),
            Topping::priced("e", 7e28),
        ];
        let err = validate_cart(&[line(1, 10.0), pizza]).unwrap_err();
        assert_eq!(err, CartError::InvalidToppingPrice { index: 1, topping: 3 });
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_quote_input_bounds() {
        let mut input = PriceInput {
            base_price: 1003.0,
            size: Size::Medium,
            crust: Crust::Thin,
            toppings: vec![Topping::priced("olives", 80.0)],
        };
        assert!(validate_price_input(&input).is_ok());
        input.toppings.push(Topping::priced("gold", f64::INFINITY));
        assert!(matches!(
            validate_price_input(&input),
            Err(CartError::InvalidToppingPrice { topping: 1, .. })
        ));
        input.base_price = 7e28;
        assert_eq!(
            validate_price_input(&input),
            Err(CartError::InvalidPrice { index: 0 })
        );
    }

    #[test]
    fn test_error_codes() {
        let err: AppError = CartError::Empty.into();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
        let err: AppError = CartError::InvalidQuantity {
            index: 0,
            quantity: 0,
        }
        .into();
        assert_eq!(err.code, ErrorCode::OrderInvalidQuantity);
    }
}
