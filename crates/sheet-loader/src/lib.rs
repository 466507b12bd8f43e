//! Snapshot ingestion: the sectioned flat-file format, scalar coercion,
//! embedded structured fields, the secondary JSON documents, and the
//! TTL-gated snapshot cache.

pub mod cache;
pub mod embedded;
pub mod snapshot;
pub mod table;
pub mod value;

pub use cache::SheetCache;
pub use embedded::Embedded;
pub use table::{RawTable, Record, SheetSet};

/// Table names produced by the upstream data collectors. Opaque identifiers;
/// renaming any of them breaks snapshot compatibility.
pub mod sheet {
    pub const MARKETS: &str = "morpho_markets";
    pub const PT_MATCHES: &str = "pendle_pt_matches";
    pub const PT_MARKET_DATA: &str = "pendle_market_data";
    pub const PT_MARKET_HISTORY: &str = "pendle_market_history";
    pub const PT_USER_POSITIONS: &str = "pendle_user_positions";
    pub const VAULTS: &str = "morpho_vaults";
    pub const CURATORS: &str = "morpho_curators";
    pub const TOP_BORROWERS: &str = "morpho_top_borrowers";
    pub const USER_TRANSACTIONS: &str = "morpho_user_transactions";
    pub const VAULT_DEPOSITORS: &str = "morpho_vault_top_depositors";
}
