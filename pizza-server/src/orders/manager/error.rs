use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::offers::{OfferError, OfferRejection};
use crate::orders::lifecycle::LifecycleError;
use crate::pricing::CartError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Offer(#[from] OfferRejection),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Invalid customer details: {0}")]
    InvalidCustomer(String),

    #[error("Not allowed to access order {0}")]
    Forbidden(String),

    #[error("Login required")]
    NotAuthenticated,
}

impl From<StorageError> for ManagerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(id) => Self::OrderNotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<OfferError> for ManagerError {
    fn from(err: OfferError) -> Self {
        match err {
            OfferError::Rejected(r) => Self::Offer(r),
            OfferError::Storage(e) => e.into(),
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                AppError::database(e.to_string())
            }
            ManagerError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", id)
            }
            ManagerError::Cart(e) => e.into(),
            ManagerError::Offer(r) => r.into(),
            ManagerError::Lifecycle(e) => e.into(),
            ManagerError::InvalidCustomer(msg) => {
                AppError::with_message(ErrorCode::RequiredField, msg)
            }
            ManagerError::Forbidden(id) => {
                AppError::permission_denied(format!("Not allowed to access order {id}"))
            }
            ManagerError::NotAuthenticated => AppError::not_authenticated(),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
