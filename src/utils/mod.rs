//! Utility modules
//!
//! Error types and result types shared by the renderer, the lesson contract
//! and the credential provider.

pub mod error;

pub use error::{ContractError, CredentialError, EngineError, EngineResult, FormError};
