pub mod model;
pub mod store;

pub use model::LedgerEntry;
pub use store::SwapLedger;
pub use store::sqlite_store::SqliteSwapLedger;
