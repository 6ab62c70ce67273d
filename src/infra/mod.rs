//! Infrastructure layer for fieldproof.
//!
//! Contains trait definitions and implementations for:
//! - Proof verification (the authoritative gate pipeline)
//! - Proof record storage (PostgreSQL)
//! - Media storage (filesystem)
//! - Graceful shutdown

mod error;
mod media;
pub mod postgres;
mod shutdown;
mod traits;
mod verification;

pub use error::{ProofError, Result};
pub use media::FsMediaStore;
pub use postgres::PgProofStore;
pub use shutdown::shutdown_signal;
pub use traits::{MediaStore, ProofStore, StoredMedia};
pub use verification::{ProofSubmission, VerificationService};

#[cfg(test)]
pub use traits::{MockMediaStore, MockProofStore};
