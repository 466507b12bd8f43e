//! Pure-fold series derived from transaction histories. Each fold produces
//! a new immutable sequence; nothing mutates rows in place.

use chrono::NaiveDate;
use loop_core::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub value: f64,
}

/// Cumulative net position over time: borrow and supply volume add,
/// repay and withdraw volume subtract, anything else carries the running
/// total unchanged. Transactions without a timestamp cannot be placed on
/// the axis and are dropped.
pub fn cumulative_net_position(transactions: &[Transaction]) -> Vec<SeriesPoint> {
    cumulative_sum(
        transactions
            .iter()
            .filter_map(|tx| tx.timestamp.map(|ts| (ts, signed_amount(tx))))
            .collect(),
    )
}

/// Time-sort deltas and fold them into a running-total series.
pub fn cumulative_sum(mut deltas: Vec<(chrono::DateTime<chrono::Utc>, f64)>) -> Vec<SeriesPoint> {
    deltas.sort_by_key(|(ts, _)| *ts);
    deltas
        .into_iter()
        .scan(0.0_f64, |running, (timestamp, delta)| {
            *running += delta;
            Some(SeriesPoint { timestamp, value: *running })
        })
        .collect()
}

/// First matching keyword decides the sign, mirroring how the type tags
/// nest (`supplyCollateral` is a supply, `withdrawCollateral` a withdraw).
fn signed_amount(tx: &Transaction) -> f64 {
    let kind = tx.kind.to_lowercase();
    if kind.contains("borrow") {
        tx.amount_usd
    } else if kind.contains("repay") {
        -tx.amount_usd
    } else if kind.contains("supply") {
        tx.amount_usd
    } else if kind.contains("withdraw") {
        -tx.amount_usd
    } else {
        0.0
    }
}

/// Transactions per day, ordered by date.
pub fn daily_counts(transactions: &[Transaction]) -> Vec<(NaiveDate, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for tx in transactions {
        if let Some(ts) = tx.timestamp {
            *counts.entry(ts.date_naive()).or_insert(0usize) += 1;
        }
    }
    counts.into_iter().collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeStats {
    pub total_usd: f64,
    pub unique_users: usize,
    pub mean_usd: f64,
}

/// Volume summary over a transaction set; `None` when there is nothing to
/// summarize.
pub fn volume_stats(transactions: &[Transaction]) -> Option<VolumeStats> {
    if transactions.is_empty() {
        return None;
    }
    let total_usd: f64 = transactions.iter().map(|tx| tx.amount_usd).sum();
    let unique_users = transactions
        .iter()
        .map(|tx| tx.user_address.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    Some(VolumeStats {
        total_usd,
        unique_users,
        mean_usd: total_usd / transactions.len() as f64,
    })
}
