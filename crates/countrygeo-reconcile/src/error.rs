use countrygeo_core::models::CountryCode;
use thiserror::Error;

/// Errors that abort a whole reconciliation run
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The override table or the requested codes cannot be processed as configured
    #[error("Misconfiguration for {code}: {reason}")]
    Misconfiguration { code: CountryCode, reason: String },

    #[error("No country codes requested")]
    EmptySelection,
}
