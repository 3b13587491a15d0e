// Verification adapters consumed by step enrichment

pub mod balance;
pub mod relocate;

pub use balance::{BalanceError, BalanceSource, EvmBalanceSource, TokenAmount};
pub use relocate::{DocumentRelocator, DriveRelocator, PublicFile, RelocateError};
