//! Error types for reference data

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The nutrition table could not be parsed
    #[error("Invalid nutrition table: {message}")]
    InvalidTable { message: String },

    /// The same species appears twice in the nutrition table
    #[error("Duplicate species in nutrition table: {species}")]
    DuplicateSpecies { species: String },
}

impl CatalogError {
    pub fn invalid_table(message: impl Into<String>) -> Self {
        CatalogError::InvalidTable {
            message: message.into(),
        }
    }
}
