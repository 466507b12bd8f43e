//! Looping PnL estimator for ranking top borrowers.
//!
//! This is an estimate for side-by-side comparison against the platform's
//! reported PnL figure; the two are never merged.

use crate::leverage::{leverage, FlowTotals};

/// Estimated PnL of a leveraged loop.
///
/// Requires leverage above 1 and a *defined* comparison yield — a pool with
/// no comparison source produces no estimate rather than a zero one.
/// Rates are percentages; net APR = L·Y − (L−1)·B on the fractional rates,
/// applied to the net position size.
pub fn estimated_pnl_usd(
    totals: &FlowTotals,
    comparison_apy_pct: Option<f64>,
    borrow_apy_pct: f64,
) -> Option<f64> {
    let net_supplied = totals.net_supplied_usd();
    let net_borrowed = totals.net_borrowed_usd();
    let l = leverage(net_supplied, net_borrowed)?;
    if l <= 1.0 {
        return None;
    }

    let y = comparison_apy_pct? / 100.0;
    let b = borrow_apy_pct / 100.0;
    let net_apr = l * y - (l - 1.0) * b;
    let position_size = net_supplied - net_borrowed;
    Some(position_size * net_apr)
}
