//! PostgreSQL implementations of the fieldproof storage traits.

mod proof_store;

pub use proof_store::PgProofStore;
