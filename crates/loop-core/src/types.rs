use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative looping-opportunity status derived from the APY spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    High,
    Moderate,
    Unprofitable,
    Neutral,
}

impl PoolStatus {
    /// Classify a spread (comparison APY minus borrow APY, in percent).
    /// `None` means no comparison yield source exists for the pool.
    pub fn from_spread(spread_pct: Option<f64>) -> Self {
        match spread_pct {
            None => PoolStatus::Neutral,
            Some(s) if s > 5.0 => PoolStatus::High,
            Some(s) if s > 0.0 => PoolStatus::Moderate,
            Some(_) => PoolStatus::Unprofitable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PoolStatus::High => "High Opportunity",
            PoolStatus::Moderate => "Moderate Opportunity",
            PoolStatus::Unprofitable => "Unprofitable",
            PoolStatus::Neutral => "Neutral",
        }
    }
}

/// A lending market pairing one collateral asset and one loan asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolView {
    /// Opaque market key, lowercased.
    pub unique_key: String,
    pub collateral_symbol: String,
    pub loan_symbol: String,
    /// "COLLATERAL / LOAN" display pairing.
    pub label: String,
    pub supply_usd: f64,
    pub borrow_usd: f64,
    /// max(supply − borrow, 0)
    pub available_borrow_usd: f64,
    pub borrow_apy_pct: f64,
    pub utilization_pct: f64,
    /// Liquidation LTV cap in percent (raw 18-decimal value / 1e16).
    pub lltv_pct: f64,
    /// Collateral is a Pendle principal token.
    pub is_fixed_yield: bool,
    /// Pendle implied APY for PT collateral, else a static per-symbol
    /// estimate. Absent when no data source exists — never zero-filled.
    pub comparison_apy_pct: Option<f64>,
    /// comparison − borrow, only when a comparison yield exists.
    pub spread_pct: Option<f64>,
    pub status: PoolStatus,
    pub market_link: String,
    pub pendle_link: Option<String>,
}

/// A pooled-deposit vault allocating funds across markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultView {
    /// Vault address, lowercased.
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub asset_symbol: String,
    pub tvl_usd: f64,
    pub apy_pct: f64,
    pub fee_pct: f64,
    /// Legacy single-curator address field from the snapshot.
    pub curator_address: String,
    /// Names parsed from the embedded curator list; empty for sub-threshold
    /// vaults or when the embedded field fails to parse.
    pub curator_names: Vec<String>,
    pub whitelisted: bool,
    pub app_link: String,
}

/// A vault as attributed to a managing curator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedVault {
    pub name: String,
    pub address: String,
    pub tvl_usd: f64,
    pub apy_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratorSocials {
    pub forum: Option<String>,
    pub twitter: Option<String>,
    pub url: Option<String>,
}

/// An entity managing one or more vaults' allocation strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorView {
    /// Primary identity; address is a secondary fallback key.
    pub name: String,
    pub address: String,
    pub reported_aum_usd: f64,
    /// Sum of distinct managed vaults' TVL.
    pub computed_aum_usd: f64,
    /// max(reported, computed)
    pub effective_aum_usd: f64,
    pub vaults: Vec<ManagedVault>,
    pub socials: CuratorSocials,
    pub app_link: String,
}

/// A borrower's point-in-time position in one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerPosition {
    pub user_address: String,
    pub market_key: String,
    pub collateral_usd: f64,
    pub borrow_usd: f64,
    /// Absent when the source omits it; never conflated with zero.
    pub health_factor: Option<f64>,
    /// PnL figures as reported by the platform, surfaced beside our own
    /// estimate — never merged with it.
    pub reported_pnl_usd: f64,
    pub reported_margin_pnl_usd: f64,
}

/// One on-chain interaction with a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub user_address: String,
    pub market_key: String,
    /// Open-ended type tag (supply, borrow, repay, withdraw, deposit and
    /// protocol-specific variants); matched by substring downstream.
    pub kind: String,
    pub amount_usd: f64,
    pub amount_assets: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A transaction embedded in a depositor record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultTransaction {
    pub hash: String,
    pub kind: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub amount_usd: f64,
}

/// A depositor's position in one vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositorPosition {
    pub user_address: String,
    pub vault_address: String,
    /// Assets USD as reported by the snapshot.
    pub reported_usd: f64,
    /// Deposit volume recomputed from the embedded transaction list.
    pub calculated_usd: f64,
    /// Reconciled figure: the calculated sum when the reported one is
    /// small and the calculation exceeds it, else the reported one.
    pub effective_usd: f64,
    pub transactions: Vec<VaultTransaction>,
}

/// A depositor row rolled up across all vaults a curator manages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorDepositor {
    pub user_address: String,
    pub vault_address: String,
    pub vault_name: String,
    pub assets_usd: f64,
}

/// One open Pendle position, split by leg valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedYieldPositionDetail {
    pub market_id: String,
    pub pt_usd: f64,
    pub yt_usd: f64,
    pub lp_usd: f64,
    pub total_usd: f64,
}

/// Aggregated open Pendle positions for one (user, market) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedYieldBreakdown {
    pub pt_usd: f64,
    pub yt_usd: f64,
    pub lp_usd: f64,
    pub open_total_usd: f64,
    pub position_count: usize,
    pub positions: Vec<FixedYieldPositionDetail>,
}

impl FixedYieldBreakdown {
    pub fn is_empty(&self) -> bool {
        self.position_count == 0
    }
}

/// One point of a historical APY series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApyPoint {
    pub timestamp: DateTime<Utc>,
    pub apy_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_spread() {
        assert_eq!(PoolStatus::from_spread(Some(6.0)), PoolStatus::High);
        assert_eq!(PoolStatus::from_spread(Some(5.0)), PoolStatus::Moderate);
        assert_eq!(PoolStatus::from_spread(Some(0.5)), PoolStatus::Moderate);
        assert_eq!(PoolStatus::from_spread(Some(0.0)), PoolStatus::Unprofitable);
        assert_eq!(PoolStatus::from_spread(Some(-3.0)), PoolStatus::Unprofitable);
        assert_eq!(PoolStatus::from_spread(None), PoolStatus::Neutral);
    }
}
