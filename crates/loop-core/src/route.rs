//! Explicit routing context for the analytic read path.
//!
//! The presentation layer passes one of these values into the session engine
//! instead of holding navigation state of its own; the whole current view is
//! serializable.

use serde::{Deserialize, Serialize};

use crate::types::PoolView;

/// Filters applied to the pool list view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolFilters {
    pub collateral: Option<String>,
    pub loan: Option<String>,
    pub min_supply_usd: f64,
    pub min_available_usd: f64,
    pub fixed_yield_only: bool,
    pub min_spread_pct: Option<f64>,
}

impl PoolFilters {
    pub fn matches(&self, pool: &PoolView) -> bool {
        if let Some(c) = &self.collateral {
            if !pool.collateral_symbol.eq_ignore_ascii_case(c) {
                return false;
            }
        }
        if let Some(l) = &self.loan {
            if !pool.loan_symbol.eq_ignore_ascii_case(l) {
                return false;
            }
        }
        if pool.supply_usd < self.min_supply_usd {
            return false;
        }
        if pool.available_borrow_usd < self.min_available_usd {
            return false;
        }
        if self.fixed_yield_only && !pool.is_fixed_yield {
            return false;
        }
        if let Some(min_spread) = self.min_spread_pct {
            // Pools without a spread never pass an explicit spread filter.
            match pool.spread_pct {
                Some(s) if s >= min_spread => {}
                _ => return false,
            }
        }
        true
    }
}

/// The current view, as selected by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Route {
    List {
        #[serde(default)]
        filters: PoolFilters,
    },
    Pool {
        key: String,
    },
    Borrower {
        key: String,
        address: String,
    },
    Curator {
        name: String,
    },
    Vault {
        address: String,
    },
    Depositor {
        vault_address: String,
        address: String,
    },
}

impl Default for Route {
    fn default() -> Self {
        Route::List { filters: PoolFilters::default() }
    }
}
