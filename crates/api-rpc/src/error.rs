//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use surveyor_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_READY: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::NotReady(msg) => ErrorObjectOwned::owned(code::NOT_READY, msg, None::<()>),
        AppError::Parse(e) => {
            ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>)
        }
        AppError::Io(e) => ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>),
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}
