//! Financial estimation models: leverage and looping PnL, AUM
//! reconciliation, and pure-fold series over transaction histories.
//!
//! Everything here is a stateless calculation over plain slices; the
//! figures are best-effort estimators for comparison, not ledger values.

pub mod aum;
pub mod leverage;
pub mod pnl;
pub mod series;

pub use aum::effective_aum;
pub use leverage::{estimated_annual_profit_usd, leverage, FlowTotals};
pub use pnl::estimated_pnl_usd;
pub use series::{
    cumulative_net_position, cumulative_sum, daily_counts, volume_stats, SeriesPoint, VolumeStats,
};
