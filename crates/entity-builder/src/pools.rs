//! Pool views from the markets table, enriched with fixed-yield matches
//! and the spread/status opportunity signal.

use loop_core::{links, LoopError, PoolStatus, PoolView};
use sheet_loader::value::{normalize_key, parse_f64, parse_money};
use sheet_loader::{sheet, SheetSet};

use crate::classify::{external_yield_estimate, is_fixed_yield_symbol};
use crate::resolver::FixedYieldIndex;

/// Raw LLTV is an 18-decimal fixed-point fraction; dividing by 1e16 renders
/// it as a percentage.
pub const LLTV_SCALE: f64 = 1e16;

/// Placeholder for symbols the snapshot omits.
const UNKNOWN_SYMBOL: &str = "—";

/// Build all pool views. The markets table is the single table whose
/// absence blocks the whole session.
pub fn build_pools(sheets: &SheetSet) -> Result<Vec<PoolView>, LoopError> {
    let markets = sheets.require(sheet::MARKETS)?;
    let index = FixedYieldIndex::from_sheets(sheets);

    let mut pools = Vec::with_capacity(markets.len());
    for rec in markets.records() {
        let unique_key = normalize_key(rec.get("uniqueKey"));
        if unique_key.is_empty() {
            tracing::debug!("skipping market record without uniqueKey");
            continue;
        }

        let collateral_symbol = rec
            .get_opt("collateralAsset.symbol")
            .unwrap_or(UNKNOWN_SYMBOL)
            .to_string();
        let loan_symbol = rec
            .get_opt("loanAsset.symbol")
            .unwrap_or(UNKNOWN_SYMBOL)
            .to_string();

        let borrow_apy_pct = parse_f64(rec.get("state.dailyBorrowApy")) * 100.0;
        let supply_usd = parse_money(rec.get("state.supplyAssetsUsd")).max(0.0);
        let borrow_usd = parse_money(rec.get("state.borrowAssetsUsd")).max(0.0);
        let utilization_pct = parse_f64(rec.get("state.utilization")) * 100.0;
        let lltv_pct = parse_f64(rec.get("lltv")) / LLTV_SCALE;

        let is_fixed_yield = is_fixed_yield_symbol(&collateral_symbol);
        let (implied_apy_pct, pendle_link) = if is_fixed_yield {
            (
                index.implied_apy_pct(&unique_key),
                index.pendle_address(&unique_key).map(links::pendle_trade_url),
            )
        } else {
            (None, None)
        };

        // A fixed-yield pool without a resolvable implied rate still gets a
        // chance at the static table (PT symbols simply are not in it).
        let comparison_apy_pct =
            implied_apy_pct.or_else(|| external_yield_estimate(&collateral_symbol));
        let spread_pct = comparison_apy_pct.map(|c| c - borrow_apy_pct);

        pools.push(PoolView {
            label: format!("{collateral_symbol} / {loan_symbol}"),
            market_link: links::market_url(&unique_key),
            unique_key,
            collateral_symbol,
            loan_symbol,
            supply_usd,
            borrow_usd,
            available_borrow_usd: (supply_usd - borrow_usd).max(0.0),
            borrow_apy_pct,
            utilization_pct,
            lltv_pct,
            is_fixed_yield,
            comparison_apy_pct,
            spread_pct,
            status: PoolStatus::from_spread(spread_pct),
            pendle_link,
        });
    }

    Ok(pools)
}
