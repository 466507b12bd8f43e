//! View payloads returned by the session read path. Everything is
//! serializable; the presentation layer renders these as-is.

use chrono::NaiveDate;
use flow_graph::FlowGraph;
use loop_core::{
    ApyPoint, BorrowerPosition, CuratorDepositor, CuratorView, DepositorPosition,
    FixedYieldBreakdown, PoolView, VaultView,
};
use serde::{Deserialize, Serialize};
use yield_metrics::{FlowTotals, SeriesPoint, VolumeStats};

/// Entity views plus the detail selected by the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutput {
    pub pools: Vec<PoolView>,
    pub vaults: Vec<VaultView>,
    pub curators: Vec<CuratorView>,
    pub detail: Option<RouteDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDetail {
    Pool(Box<PoolDetail>),
    Borrower(Box<BorrowerDetail>),
    Curator(Box<CuratorDetail>),
    Vault(Box<VaultDetail>),
    Depositor(Box<DepositorDetail>),
}

/// A top borrower with our estimates beside the platform-reported figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerSummary {
    pub position: BorrowerPosition,
    pub leverage: Option<f64>,
    pub effective_apy_pct: Option<f64>,
    pub estimated_annual_profit_usd: Option<f64>,
    /// Looping-model estimate; the reported PnL stays on `position`.
    pub estimated_pnl_usd: Option<f64>,
    pub address_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDetail {
    pub pool: PoolView,
    pub top_borrowers: Vec<BorrowerSummary>,
    pub volume: Option<VolumeStats>,
    pub cumulative_net_position: Vec<SeriesPoint>,
    pub daily_counts: Vec<(NaiveDate, usize)>,
    pub borrow_apy_history: Vec<ApyPoint>,
    pub fixed_yield_history: Vec<ApyPoint>,
    pub flow: Option<FlowGraph>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerDetail {
    pub pool: PoolView,
    pub user_address: String,
    pub totals: FlowTotals,
    /// supplied − borrowed + repaid
    pub net_position_usd: f64,
    pub leverage: Option<f64>,
    pub estimated_pnl_usd: Option<f64>,
    pub fixed_yield: Option<FixedYieldBreakdown>,
    pub cumulative_net_position: Vec<SeriesPoint>,
    pub daily_counts: Vec<(NaiveDate, usize)>,
    pub flow: Option<FlowGraph>,
    pub address_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorDetail {
    pub curator: CuratorView,
    pub depositors: Vec<CuratorDepositor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultDetail {
    pub vault: VaultView,
    pub depositors: Vec<DepositorPosition>,
    pub total_deposited_usd: f64,
    pub mean_deposit_usd: f64,
    pub largest_deposit_usd: f64,
    pub flow: Option<FlowGraph>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositorDetail {
    pub vault: VaultView,
    pub depositor: DepositorPosition,
    pub cumulative_deposits: Vec<SeriesPoint>,
    pub flow: Option<FlowGraph>,
    pub address_link: String,
}
