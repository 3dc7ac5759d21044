//! Fatal error taxonomy.
//!
//! Only the truly fatal kinds live here. `Infeasible`, `ResidualCollisions`
//! and `DepotExhaustion` are not exceptions in this design: they are reported
//! as plain data on the success path (see [`crate::PlanStatus`],
//! [`crate::collision::CollisionReport`], [`crate::depot::DepotAssignment`])
//! because callers must branch on them, not unwind from them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("failed to read catalog file: {0}")]
    CatalogIo(#[from] std::io::Error),
}

impl PlanError {
    /// Exit code for the batch CLI entry point.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
