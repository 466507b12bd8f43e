//! The analytic read path: `(snapshot, route) → (entity views, metrics)`.
//!
//! Every session rebuilds all entity views from the flat file, gated by the
//! snapshot cache. No state survives between calls besides the cache; each
//! build produces an independent, immutable result set.

pub mod views;

use std::path::Path;

use entity_builder::positions::{
    curator_vault_depositors, fixed_yield_positions, market_transactions, top_borrowers,
    vault_depositors,
};
use entity_builder::{build_curators, build_pools, build_vaults, history, FixedYieldIndex};
use flow_graph::{depositor_flow, pool_flow, FlowConfig};
use loop_core::{links, LoopError, PoolView, Route, Transaction};
use sheet_loader::value::normalize_key;
use sheet_loader::{SheetCache, SheetSet};
use yield_metrics::{
    cumulative_net_position, cumulative_sum, daily_counts, estimated_pnl_usd, leverage,
    volume_stats, FlowTotals,
};

pub use views::{
    BorrowerDetail, BorrowerSummary, CuratorDetail, DepositorDetail, PoolDetail, RouteDetail,
    SessionOutput, VaultDetail,
};

/// Session engine owning the snapshot cache and the flow-graph tunables.
pub struct SessionEngine {
    cache: SheetCache,
    flow_config: FlowConfig,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self { cache: SheetCache::new(), flow_config: FlowConfig::default() }
    }

    pub fn with_cache_ttl(ttl_secs: i64) -> Self {
        Self { cache: SheetCache::with_ttl(ttl_secs), flow_config: FlowConfig::default() }
    }

    pub fn with_flow_config(mut self, flow_config: FlowConfig) -> Self {
        self.flow_config = flow_config;
        self
    }

    /// Load (or reuse) the snapshot at `path` and resolve `route` against it.
    pub fn run(&self, path: &Path, route: &Route) -> Result<SessionOutput, LoopError> {
        let sheets = self.cache.load(path)?;
        self.build(&sheets, route)
    }

    /// Resolve a route against an already-parsed snapshot.
    pub fn build(&self, sheets: &SheetSet, route: &Route) -> Result<SessionOutput, LoopError> {
        let mut pools = build_pools(sheets)?;
        pools.sort_by(|a, b| {
            b.supply_usd
                .partial_cmp(&a.supply_usd)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let vaults = build_vaults(sheets);
        let curators = build_curators(sheets, &vaults);
        tracing::debug!(
            pools = pools.len(),
            vaults = vaults.len(),
            curators = curators.len(),
            "entity views built"
        );

        let detail = match route {
            Route::List { filters } => {
                pools.retain(|p| filters.matches(p));
                None
            }
            Route::Pool { key } => self.pool_detail(sheets, &pools, key),
            Route::Borrower { key, address } => self.borrower_detail(sheets, &pools, key, address),
            Route::Curator { name } => curators
                .iter()
                .find(|c| &c.name == name)
                .map(|curator| {
                    RouteDetail::Curator(Box::new(CuratorDetail {
                        curator: curator.clone(),
                        depositors: curator_vault_depositors(sheets, &vaults, name),
                    }))
                }),
            Route::Vault { address } => self.vault_detail(sheets, &vaults, address),
            Route::Depositor { vault_address, address } => {
                self.depositor_detail(sheets, &vaults, vault_address, address)
            }
        };

        Ok(SessionOutput { pools, vaults, curators, detail })
    }

    fn pool_detail(
        &self,
        sheets: &SheetSet,
        pools: &[PoolView],
        key: &str,
    ) -> Option<RouteDetail> {
        let pool = find_pool(pools, key)?;
        let transactions = market_transactions(sheets, &pool.unique_key, None);
        let index = FixedYieldIndex::from_sheets(sheets);

        let top_borrowers = top_borrowers(sheets, &pool.unique_key)
            .into_iter()
            .map(|position| {
                let user_txs: Vec<Transaction> = transactions
                    .iter()
                    .filter(|tx| tx.user_address == position.user_address)
                    .cloned()
                    .collect();
                summarize_borrower(&user_txs, position, &pool)
            })
            .collect();

        Some(RouteDetail::Pool(Box::new(PoolDetail {
            top_borrowers,
            volume: volume_stats(&transactions),
            cumulative_net_position: cumulative_net_position(&transactions),
            daily_counts: daily_counts(&transactions),
            borrow_apy_history: history::market_borrow_history(sheets, &pool.unique_key),
            fixed_yield_history: history::fixed_yield_history(sheets, &index, &pool.unique_key),
            flow: pool_flow(&transactions, &pool, None, &self.flow_config),
            pool,
        })))
    }

    fn borrower_detail(
        &self,
        sheets: &SheetSet,
        pools: &[PoolView],
        key: &str,
        address: &str,
    ) -> Option<RouteDetail> {
        let pool = find_pool(pools, key)?;
        let address = normalize_key(address);
        let transactions = market_transactions(sheets, &pool.unique_key, Some(&address));
        let totals = FlowTotals::from_transactions(&transactions);

        let breakdown = fixed_yield_positions(sheets, &address, &pool.unique_key);
        Some(RouteDetail::Borrower(Box::new(BorrowerDetail {
            totals,
            net_position_usd: totals.net_position_usd(),
            leverage: leverage(totals.net_supplied_usd(), totals.net_borrowed_usd()),
            estimated_pnl_usd: estimated_pnl_usd(
                &totals,
                pool.comparison_apy_pct,
                pool.borrow_apy_pct,
            ),
            fixed_yield: (!breakdown.is_empty()).then_some(breakdown),
            cumulative_net_position: cumulative_net_position(&transactions),
            daily_counts: daily_counts(&transactions),
            flow: pool_flow(&transactions, &pool, Some(&address), &self.flow_config),
            address_link: links::address_url(&address),
            user_address: address,
            pool,
        })))
    }

    fn vault_detail(
        &self,
        sheets: &SheetSet,
        vaults: &[loop_core::VaultView],
        address: &str,
    ) -> Option<RouteDetail> {
        let address = normalize_key(address);
        let vault = vaults.iter().find(|v| v.address == address)?.clone();
        let depositors = vault_depositors(sheets, &address);

        let total_deposited_usd: f64 = depositors.iter().map(|d| d.effective_usd).sum();
        let largest_deposit_usd = depositors
            .iter()
            .map(|d| d.effective_usd)
            .fold(0.0_f64, f64::max);
        let mean_deposit_usd = if depositors.is_empty() {
            0.0
        } else {
            total_deposited_usd / depositors.len() as f64
        };

        Some(RouteDetail::Vault(Box::new(VaultDetail {
            flow: depositor_flow(&depositors, &vault, &self.flow_config),
            depositors,
            total_deposited_usd,
            mean_deposit_usd,
            largest_deposit_usd,
            vault,
        })))
    }

    fn depositor_detail(
        &self,
        sheets: &SheetSet,
        vaults: &[loop_core::VaultView],
        vault_address: &str,
        address: &str,
    ) -> Option<RouteDetail> {
        let vault_address = normalize_key(vault_address);
        let vault = vaults.iter().find(|v| v.address == vault_address)?.clone();
        let address = normalize_key(address);
        let depositor = vault_depositors(sheets, &vault_address)
            .into_iter()
            .find(|d| d.user_address == address)?;

        let cumulative_deposits = cumulative_sum(
            depositor
                .transactions
                .iter()
                .filter_map(|tx| tx.timestamp.map(|ts| (ts, tx.amount_usd)))
                .collect(),
        );

        Some(RouteDetail::Depositor(Box::new(DepositorDetail {
            flow: depositor_flow(std::slice::from_ref(&depositor), &vault, &self.flow_config),
            cumulative_deposits,
            address_link: links::address_url(&depositor.user_address),
            depositor,
            vault,
        })))
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn find_pool(pools: &[PoolView], key: &str) -> Option<PoolView> {
    let key = normalize_key(key);
    let pool = pools.iter().find(|p| p.unique_key == key).cloned();
    if pool.is_none() {
        tracing::warn!(%key, "route references an unknown pool");
    }
    pool
}

fn summarize_borrower(
    user_txs: &[Transaction],
    position: loop_core::BorrowerPosition,
    pool: &PoolView,
) -> BorrowerSummary {
    let totals = FlowTotals::from_transactions(user_txs);
    let lev = leverage(totals.net_supplied_usd(), totals.net_borrowed_usd());

    let effective_apy_pct = match (lev, pool.spread_pct) {
        (Some(l), Some(spread)) => Some(yield_metrics::leverage::effective_apy_pct(l, spread)),
        _ => None,
    };
    let estimated_annual_profit_usd = effective_apy_pct.map(|apy| {
        yield_metrics::estimated_annual_profit_usd(position.collateral_usd, apy)
    });

    BorrowerSummary {
        leverage: lev,
        effective_apy_pct,
        estimated_annual_profit_usd,
        estimated_pnl_usd: estimated_pnl_usd(
            &totals,
            pool.comparison_apy_pct,
            pool.borrow_apy_pct,
        ),
        address_link: links::address_url(&position.user_address),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loop_core::PoolFilters;
    use sheet_loader::RawTable;

    /// A small but fully cross-referenced snapshot: one PT pool with a
    /// Pendle match, one plain pool, a vault with curators, a curator row,
    /// borrowers, transactions, and a depositor.
    fn fixture() -> SheetSet {
        let mut sheets = SheetSet::default();
        sheets.insert(RawTable {
            name: sheet_loader::sheet::MARKETS.into(),
            headers: vec![
                "uniqueKey".into(),
                "collateralAsset.symbol".into(),
                "loanAsset.symbol".into(),
                "state.dailyBorrowApy".into(),
                "state.supplyAssetsUsd".into(),
                "state.borrowAssetsUsd".into(),
                "state.utilization".into(),
                "lltv".into(),
                "historicalState.dailyNetBorrowApy".into(),
            ],
            rows: vec![
                vec![
                    "0xPT".into(),
                    "PT-sUSDe-26DEC2024".into(),
                    "USDC".into(),
                    "0.04".into(),
                    "5000000".into(),
                    "2000000".into(),
                    "0.4".into(),
                    "915000000000000000".into(),
                    r#"[{"x": 1700000000, "y": 0.04}, {"x": 1700086400, "y": 0.05}]"#.into(),
                ],
                vec![
                    "0xWETH".into(),
                    "WETH".into(),
                    "USDC".into(),
                    "0.02".into(),
                    "9000000".into(),
                    "1000000".into(),
                    "0.11".into(),
                    "860000000000000000".into(),
                    String::new(),
                ],
            ],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::PT_MATCHES.into(),
            headers: vec!["marketUniqueKey".into(), "pendleMarketAddress".into()],
            rows: vec![vec!["0xPT".into(), "0xPendle".into()]],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::PT_MARKET_DATA.into(),
            headers: vec!["pendleMarketAddress".into(), "marketData.impliedApy".into()],
            rows: vec![vec!["0xPendle".into(), "0.10".into()]],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::TOP_BORROWERS.into(),
            headers: vec![
                "marketUniqueKey".into(),
                "userAddress".into(),
                "state.collateralUsd".into(),
                "state.borrowAssetsUsd".into(),
                "healthFactor".into(),
                "state.pnlUsd".into(),
                "state.marginPnlUsd".into(),
            ],
            rows: vec![vec![
                "0xPT".into(),
                "0xAlice".into(),
                "300".into(),
                "200".into(),
                "1.4".into(),
                "25".into(),
                "20".into(),
            ]],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::USER_TRANSACTIONS.into(),
            headers: vec![
                "marketUniqueKey".into(),
                "userAddress".into(),
                "hash".into(),
                "type".into(),
                "data.assetsUsd".into(),
                "data.assets".into(),
                "timestamp".into(),
            ],
            rows: vec![
                vec![
                    "0xPT".into(),
                    "0xAlice".into(),
                    "0xh1".into(),
                    "supplyCollateral".into(),
                    "300".into(),
                    "300".into(),
                    "1700000000".into(),
                ],
                vec![
                    "0xPT".into(),
                    "0xAlice".into(),
                    "0xh2".into(),
                    "borrow".into(),
                    "200".into(),
                    "200".into(),
                    "1700000100".into(),
                ],
            ],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::VAULTS.into(),
            headers: vec![
                "address".into(),
                "name".into(),
                "symbol".into(),
                "asset.symbol".into(),
                "state.totalAssetsUsd".into(),
                "state.dailyApy".into(),
                "state.fee".into(),
                "state.curator".into(),
                "state.curators".into(),
                "whitelisted".into(),
            ],
            rows: vec![vec![
                "0xVault".into(),
                "Prime USDC".into(),
                "pUSDC".into(),
                "USDC".into(),
                "2000000".into(),
                "0.05".into(),
                "0.1".into(),
                "0xCur".into(),
                r#"[{"name": "Steakhouse"}]"#.into(),
                "true".into(),
            ]],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::CURATORS.into(),
            headers: vec!["name".into(), "addresses".into(), "aum".into(), "socials".into()],
            rows: vec![vec![
                "Steakhouse".into(),
                "0xCur".into(),
                "1000000".into(),
                "url:https://steakhouse.fi".into(),
            ]],
        });
        sheets.insert(RawTable {
            name: sheet_loader::sheet::VAULT_DEPOSITORS.into(),
            headers: vec![
                "vaultAddress".into(),
                "userAddress".into(),
                "assetsUsd".into(),
                "userTransactions".into(),
            ],
            rows: vec![vec![
                "0xVault".into(),
                "0xDep".into(),
                "5000".into(),
                r#"[{"hash": "0xd", "type": "Deposit", "timestamp": 1700000000, "data": {"assetsUsd": 5000}}]"#
                    .into(),
            ]],
        });
        sheets
    }

    #[test]
    fn test_list_route_builds_and_filters() {
        let engine = SessionEngine::new();
        let out = engine.build(&fixture(), &Route::default()).unwrap();
        assert_eq!(out.pools.len(), 2);
        // Sorted by supply descending.
        assert_eq!(out.pools[0].unique_key, "0xweth");
        assert_eq!(out.vaults.len(), 1);
        assert_eq!(out.curators.len(), 1);
        assert_eq!(out.curators[0].effective_aum_usd, 2_000_000.0);
        assert!(out.detail.is_none());

        let route = Route::List {
            filters: PoolFilters { fixed_yield_only: true, ..Default::default() },
        };
        let filtered = engine.build(&fixture(), &route).unwrap();
        assert_eq!(filtered.pools.len(), 1);
        assert_eq!(filtered.pools[0].unique_key, "0xpt");
    }

    #[test]
    fn test_pool_detail_estimates_beside_reported() {
        let engine = SessionEngine::new();
        let route = Route::Pool { key: "0xPT".into() };
        let out = engine.build(&fixture(), &route).unwrap();
        let Some(RouteDetail::Pool(detail)) = out.detail else {
            panic!("expected pool detail");
        };

        assert_eq!(detail.pool.spread_pct, Some(6.0));
        assert_eq!(detail.top_borrowers.len(), 1);
        let b = &detail.top_borrowers[0];
        // net supplied 300, net borrowed 200 → L = 3; both figures surface.
        assert_eq!(b.leverage, Some(3.0));
        assert_eq!(b.effective_apy_pct, Some(18.0));
        assert_eq!(b.position.reported_pnl_usd, 25.0);
        let est = b.estimated_pnl_usd.unwrap();
        assert!((est - 22.0).abs() < 1e-9);

        assert_eq!(detail.borrow_apy_history.len(), 2);
        assert!(detail.flow.is_some());
        assert_eq!(detail.volume.unwrap().total_usd, 500.0);
    }

    #[test]
    fn test_borrower_detail() {
        let engine = SessionEngine::new();
        let route = Route::Borrower { key: "0xpt".into(), address: "0xALICE".into() };
        let out = engine.build(&fixture(), &route).unwrap();
        let Some(RouteDetail::Borrower(detail)) = out.detail else {
            panic!("expected borrower detail");
        };

        assert_eq!(detail.totals.supplied_usd, 300.0);
        assert_eq!(detail.totals.borrowed_usd, 200.0);
        assert_eq!(detail.leverage, Some(3.0));
        assert_eq!(detail.cumulative_net_position.len(), 2);
        assert_eq!(detail.cumulative_net_position[1].value, 500.0);
        assert!(detail.fixed_yield.is_none());
        assert_eq!(detail.address_link, "https://etherscan.io/address/0xalice");
    }

    #[test]
    fn test_vault_and_depositor_details() {
        let engine = SessionEngine::new();
        let out = engine
            .build(&fixture(), &Route::Vault { address: "0xVAULT".into() })
            .unwrap();
        let Some(RouteDetail::Vault(detail)) = out.detail else {
            panic!("expected vault detail");
        };
        assert_eq!(detail.depositors.len(), 1);
        assert_eq!(detail.total_deposited_usd, 5000.0);
        assert!(detail.flow.is_some());

        let out = engine
            .build(
                &fixture(),
                &Route::Depositor { vault_address: "0xVault".into(), address: "0xdep".into() },
            )
            .unwrap();
        let Some(RouteDetail::Depositor(detail)) = out.detail else {
            panic!("expected depositor detail");
        };
        assert_eq!(detail.cumulative_deposits.len(), 1);
        assert_eq!(detail.cumulative_deposits[0].value, 5000.0);
    }

    #[test]
    fn test_curator_detail() {
        let engine = SessionEngine::new();
        let out = engine
            .build(&fixture(), &Route::Curator { name: "Steakhouse".into() })
            .unwrap();
        let Some(RouteDetail::Curator(detail)) = out.detail else {
            panic!("expected curator detail");
        };
        assert_eq!(detail.curator.socials.url.as_deref(), Some("https://steakhouse.fi"));
        assert_eq!(detail.depositors.len(), 1);
        assert_eq!(detail.depositors[0].vault_name, "Prime USDC");
    }

    #[test]
    fn test_unknown_references_degrade_to_no_detail() {
        let engine = SessionEngine::new();
        for route in [
            Route::Pool { key: "0xmissing".into() },
            Route::Curator { name: "Nobody".into() },
            Route::Vault { address: "0xmissing".into() },
            Route::Depositor { vault_address: "0xVault".into(), address: "0xmissing".into() },
        ] {
            let out = engine.build(&fixture(), &route).unwrap();
            assert!(out.detail.is_none(), "route {route:?} should yield no detail");
        }
    }

    #[test]
    fn test_missing_required_table_fails_build() {
        let engine = SessionEngine::new();
        let err = engine.build(&SheetSet::default(), &Route::default()).unwrap_err();
        assert!(matches!(err, LoopError::MissingTable(_)));
    }

    #[test]
    fn test_missing_optional_tables_degrade() {
        let mut sheets = SheetSet::default();
        // Markets only: every dependent feature is unavailable, not fatal.
        let full = fixture();
        sheets.insert(full.table(sheet_loader::sheet::MARKETS).unwrap().clone());

        let engine = SessionEngine::new();
        let out = engine.build(&sheets, &Route::Pool { key: "0xPT".into() }).unwrap();
        assert_eq!(out.pools.len(), 2);
        assert!(out.vaults.is_empty());
        assert!(out.curators.is_empty());
        let Some(RouteDetail::Pool(detail)) = out.detail else {
            panic!("expected pool detail");
        };
        assert!(detail.top_borrowers.is_empty());
        assert!(detail.flow.is_none());
        assert!(detail.volume.is_none());
        // No match table → the PT pool has no implied rate and no spread.
        assert_eq!(detail.pool.comparison_apy_pct, None);
    }
}
