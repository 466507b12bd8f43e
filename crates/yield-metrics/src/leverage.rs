//! Leverage estimation from a user's transaction history in one pool.

use loop_core::Transaction;
use serde::{Deserialize, Serialize};

/// USD volume grouped by transaction type. Matching is case-insensitive
/// substring matching because the type tag set is open-ended
/// (`supplyCollateral` counts as supply, and so on).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlowTotals {
    pub supplied_usd: f64,
    pub borrowed_usd: f64,
    pub repaid_usd: f64,
    pub withdrawn_usd: f64,
}

impl FlowTotals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut totals = FlowTotals::default();
        for tx in transactions {
            let kind = tx.kind.to_lowercase();
            if kind.contains("supply") {
                totals.supplied_usd += tx.amount_usd;
            }
            if kind.contains("borrow") {
                totals.borrowed_usd += tx.amount_usd;
            }
            if kind.contains("repay") {
                totals.repaid_usd += tx.amount_usd;
            }
            if kind.contains("withdraw") {
                totals.withdrawn_usd += tx.amount_usd;
            }
        }
        totals
    }

    pub fn net_supplied_usd(&self) -> f64 {
        self.supplied_usd - self.withdrawn_usd
    }

    pub fn net_borrowed_usd(&self) -> f64 {
        self.borrowed_usd - self.repaid_usd
    }

    /// Simple activity balance: supplied − borrowed + repaid.
    pub fn net_position_usd(&self) -> f64 {
        self.supplied_usd - self.borrowed_usd + self.repaid_usd
    }
}

/// Looping leverage: net supplied over net principal at risk. Undefined
/// when the user has no net supply or no net debt. The floor of 1 on the
/// denominator avoids division blow-up when net borrowed approaches net
/// supplied.
pub fn leverage(net_supplied_usd: f64, net_borrowed_usd: f64) -> Option<f64> {
    if net_supplied_usd <= 0.0 || net_borrowed_usd <= 0.0 {
        return None;
    }
    Some(net_supplied_usd / (net_supplied_usd - net_borrowed_usd).max(1.0))
}

/// Effective APY of a leveraged position, in percent.
pub fn effective_apy_pct(leverage: f64, spread_pct: f64) -> f64 {
    leverage * spread_pct
}

/// Annualized profit estimate for a position of `collateral_usd`.
pub fn estimated_annual_profit_usd(collateral_usd: f64, effective_apy_pct: f64) -> f64 {
    collateral_usd * effective_apy_pct / 100.0
}
