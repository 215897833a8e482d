//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Offer (coupon) errors
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Offer ====================
    /// Coupon code or cart total missing/invalid
    OfferInputInvalid = 3001,
    /// No active offer with that code
    OfferInvalidOrInactive = 3002,
    /// Offer validity window has ended
    OfferExpired = 3003,
    /// Offer validity window has not started
    OfferNotYetValid = 3004,
    /// Cart total below the offer minimum
    OfferBelowMinimumOrder = 3005,
    /// Offer redeemed as many times as allowed overall
    OfferGlobalLimitReached = 3006,
    /// Offer redeemed as many times as allowed for this user
    OfferPerUserLimitReached = 3007,
    /// Offer restricted to a customer's first order
    OfferFirstOrderOnly = 3008,
    /// Offer tracks per-user usage, guests cannot redeem it
    OfferLoginRequired = 3009,
    /// Offer code already taken
    OfferCodeExists = 3010,
    /// Offer not found (admin lookup)
    OfferNotFound = 3011,
    /// Offer definition violates an invariant
    OfferDefinitionInvalid = 3012,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no lines
    OrderEmpty = 4002,
    /// Order is delivered or cancelled
    OrderAlreadyTerminal = 4003,
    /// Stage value outside -1..=4
    OrderInvalidStage = 4004,
    /// Stage would move backwards
    OrderBackwardTransition = 4005,
    /// Stage skipped while strict stepping is on
    OrderStageSkipped = 4006,
    /// Customer cancel after preparation started
    OrderCannotCancel = 4007,
    /// Order already at the requested stage
    OrderAlreadyAtStage = 4008,
    /// Line quantity out of range
    OrderInvalidQuantity = 4009,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Offer
            ErrorCode::OfferInputInvalid => "Coupon code and a valid cart total are required",
            ErrorCode::OfferInvalidOrInactive => "Invalid or inactive coupon",
            ErrorCode::OfferExpired => "This coupon has expired",
            ErrorCode::OfferNotYetValid => "This coupon is not valid yet",
            ErrorCode::OfferBelowMinimumOrder => "Order total is below the coupon minimum",
            ErrorCode::OfferGlobalLimitReached => "This coupon has reached its usage limit",
            ErrorCode::OfferPerUserLimitReached => "You have already used this coupon",
            ErrorCode::OfferFirstOrderOnly => "This coupon is only valid on your first order",
            ErrorCode::OfferLoginRequired => "Please log in to use this coupon",
            ErrorCode::OfferCodeExists => "Coupon code already exists",
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferDefinitionInvalid => "Offer definition is invalid",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderAlreadyTerminal => "Order is already delivered or cancelled",
            ErrorCode::OrderInvalidStage => "Invalid order stage",
            ErrorCode::OrderBackwardTransition => "Order stage cannot move backwards",
            ErrorCode::OrderStageSkipped => "Order stages must advance one step at a time",
            ErrorCode::OrderCannotCancel => "Order can no longer be cancelled",
            ErrorCode::OrderAlreadyAtStage => "Order is already at that stage",
            ErrorCode::OrderInvalidQuantity => "Invalid item quantity",

            // System
            ErrorCode::InternalError => "Something went wrong, please try again",
            ErrorCode::DatabaseError => "Service temporarily unavailable, please try again",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Offer
            3001 => Ok(ErrorCode::OfferInputInvalid),
            3002 => Ok(ErrorCode::OfferInvalidOrInactive),
            3003 => Ok(ErrorCode::OfferExpired),
            3004 => Ok(ErrorCode::OfferNotYetValid),
            3005 => Ok(ErrorCode::OfferBelowMinimumOrder),
            3006 => Ok(ErrorCode::OfferGlobalLimitReached),
            3007 => Ok(ErrorCode::OfferPerUserLimitReached),
            3008 => Ok(ErrorCode::OfferFirstOrderOnly),
            3009 => Ok(ErrorCode::OfferLoginRequired),
            3010 => Ok(ErrorCode::OfferCodeExists),
            3011 => Ok(ErrorCode::OfferNotFound),
            3012 => Ok(ErrorCode::OfferDefinitionInvalid),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::OrderAlreadyTerminal),
            4004 => Ok(ErrorCode::OrderInvalidStage),
            4005 => Ok(ErrorCode::OrderBackwardTransition),
            4006 => Ok(ErrorCode::OrderStageSkipped),
            4007 => Ok(ErrorCode::OrderCannotCancel),
            4008 => Ok(ErrorCode::OrderAlreadyAtStage),
            4009 => Ok(ErrorCode::OrderInvalidQuantity),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::OfferBelowMinimumOrder,
            ErrorCode::OrderCannotCancel,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::OfferLoginRequired).unwrap();
        assert_eq!(json, "3009");
        let back: ErrorCode = serde_json::from_str("4007").unwrap();
        assert_eq!(back, ErrorCode::OrderCannotCancel);
    }
}
