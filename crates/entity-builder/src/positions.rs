//! User-level joins: top borrowers, market transactions, vault depositors,
//! and nested fixed-yield position breakdowns.

use loop_core::{
    BorrowerPosition, CuratorDepositor, DepositorPosition, FixedYieldBreakdown,
    FixedYieldPositionDetail, Transaction, VaultTransaction, VaultView,
};
use serde_json::Value;
use sheet_loader::embedded::parse_array;
use sheet_loader::value::{normalize_key, parse_f64, parse_f64_opt, parse_money, parse_unix_ts};
use sheet_loader::{sheet, SheetSet};

use crate::resolver::vaults_for_curator;

pub const TOP_BORROWER_LIMIT: usize = 5;
pub const TOP_DEPOSITOR_LIMIT: usize = 10;
pub const CURATOR_DEPOSITOR_LIMIT: usize = 20;

/// Reported depositor figures under this floor are reconciled against the
/// deposit volume recomputed from the embedded transaction list.
pub const DEPOSIT_RECONCILE_FLOOR_USD: f64 = 1000.0;

/// Top borrower positions for one market, in collector order.
pub fn top_borrowers(sheets: &SheetSet, market_key: &str) -> Vec<BorrowerPosition> {
    let Some(table) = sheets.table(sheet::TOP_BORROWERS) else {
        return Vec::new();
    };
    let market_key = normalize_key(market_key);

    let mut borrowers: Vec<BorrowerPosition> = table
        .records()
        .filter(|rec| normalize_key(rec.get("marketUniqueKey")) == market_key)
        .map(|rec| BorrowerPosition {
            user_address: normalize_key(rec.get("userAddress")),
            market_key: market_key.clone(),
            collateral_usd: parse_money(rec.get("state.collateralUsd")).max(0.0),
            borrow_usd: parse_money(rec.get("state.borrowAssetsUsd")).max(0.0),
            health_factor: parse_f64_opt(rec.get("healthFactor")),
            reported_pnl_usd: parse_money(rec.get("state.pnlUsd")),
            reported_margin_pnl_usd: parse_money(rec.get("state.marginPnlUsd")),
        })
        .collect();
    borrowers.truncate(TOP_BORROWER_LIMIT);
    borrowers
}

/// Transaction history for a market, optionally narrowed to one user.
pub fn market_transactions(
    sheets: &SheetSet,
    market_key: &str,
    user_address: Option<&str>,
) -> Vec<Transaction> {
    let Some(table) = sheets.table(sheet::USER_TRANSACTIONS) else {
        return Vec::new();
    };
    let market_key = normalize_key(market_key);
    let user_address = user_address.map(normalize_key);

    table
        .records()
        .filter(|rec| normalize_key(rec.get("marketUniqueKey")) == market_key)
        .filter(|rec| match &user_address {
            Some(user) => normalize_key(rec.get("userAddress")) == *user,
            None => true,
        })
        .map(|rec| Transaction {
            hash: rec.get("hash").to_string(),
            user_address: normalize_key(rec.get("userAddress")),
            market_key: market_key.clone(),
            kind: rec.get("type").to_string(),
            amount_usd: parse_money(rec.get("data.assetsUsd")),
            amount_assets: parse_f64(rec.get("data.assets")),
            timestamp: parse_unix_ts(rec.get("timestamp")),
        })
        .collect()
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChainPositions {
    open_positions: Vec<OpenPosition>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OpenPosition {
    market_id: String,
    pt: LegValuation,
    yt: LegValuation,
    lp: LegValuation,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LegValuation {
    valuation: f64,
}

/// Aggregate a user's open fixed-yield positions for one market from the
/// nested `raw.positions` cell. Closed positions and valueless entries are
/// ignored; an unparseable cell yields an empty breakdown.
pub fn fixed_yield_positions(
    sheets: &SheetSet,
    user_address: &str,
    market_key: &str,
) -> FixedYieldBreakdown {
    let Some(table) = sheets.table(sheet::PT_USER_POSITIONS) else {
        return FixedYieldBreakdown::default();
    };
    let user_address = normalize_key(user_address);
    let market_key = normalize_key(market_key);

    let Some(rec) = table.records().find(|rec| {
        normalize_key(rec.get("userAddress")) == user_address
            && normalize_key(rec.get("marketUniqueKey")) == market_key
    }) else {
        return FixedYieldBreakdown::default();
    };

    let chains: Vec<ChainPositions> =
        match serde_json::from_str(rec.get("raw.positions")) {
            Ok(chains) => chains,
            Err(e) => {
                tracing::debug!(user = %user_address, error = %e, "unparseable positions cell");
                return FixedYieldBreakdown::default();
            }
        };

    let mut breakdown = FixedYieldBreakdown::default();
    for chain in &chains {
        for pos in &chain.open_positions {
            let total = pos.pt.valuation + pos.yt.valuation + pos.lp.valuation;
            if total <= 0.0 {
                continue;
            }
            breakdown.pt_usd += pos.pt.valuation;
            breakdown.yt_usd += pos.yt.valuation;
            breakdown.lp_usd += pos.lp.valuation;
            breakdown.position_count += 1;
            breakdown.positions.push(FixedYieldPositionDetail {
                market_id: pos.market_id.clone(),
                pt_usd: pos.pt.valuation,
                yt_usd: pos.yt.valuation,
                lp_usd: pos.lp.valuation,
                total_usd: total,
            });
        }
    }
    breakdown.open_total_usd = breakdown.pt_usd + breakdown.yt_usd + breakdown.lp_usd;
    breakdown
}

/// Top depositors of one vault, with the embedded transaction list parsed
/// and the reported amount reconciled against recomputed deposit volume.
pub fn vault_depositors(sheets: &SheetSet, vault_address: &str) -> Vec<DepositorPosition> {
    let Some(table) = sheets.table(sheet::VAULT_DEPOSITORS) else {
        return Vec::new();
    };
    let vault_address = normalize_key(vault_address);

    let mut depositors: Vec<DepositorPosition> = table
        .records()
        .filter(|rec| normalize_key(rec.get("vaultAddress")) == vault_address)
        .map(|rec| {
            let reported_usd = parse_money(rec.get("assetsUsd")).max(0.0);
            let transactions = parse_embedded_transactions(rec.get("userTransactions"));
            let calculated_usd: f64 = transactions
                .iter()
                .filter(|tx| tx.kind.to_lowercase().contains("deposit") || tx.amount_usd > 0.0)
                .map(|tx| tx.amount_usd)
                .sum();
            let effective_usd =
                if reported_usd < DEPOSIT_RECONCILE_FLOOR_USD && calculated_usd > reported_usd {
                    calculated_usd
                } else {
                    reported_usd
                };

            DepositorPosition {
                user_address: normalize_key(rec.get("userAddress")),
                vault_address: vault_address.clone(),
                reported_usd,
                calculated_usd,
                effective_usd,
                transactions,
            }
        })
        .collect();

    depositors.sort_by(|a, b| {
        b.effective_usd
            .partial_cmp(&a.effective_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    depositors.truncate(TOP_DEPOSITOR_LIMIT);
    depositors
}

/// Depositor rows across every vault a curator manages, largest first.
pub fn curator_vault_depositors(
    sheets: &SheetSet,
    vaults: &[VaultView],
    curator_name: &str,
) -> Vec<CuratorDepositor> {
    let Some(table) = sheets.table(sheet::VAULT_DEPOSITORS) else {
        return Vec::new();
    };
    let managed = vaults_for_curator(vaults, curator_name, "");
    if managed.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<CuratorDepositor> = table
        .records()
        .filter_map(|rec| {
            let vault_address = normalize_key(rec.get("vaultAddress"));
            let vault = managed.iter().find(|v| v.address == vault_address)?;
            Some(CuratorDepositor {
                user_address: normalize_key(rec.get("userAddress")),
                vault_name: vault.name.clone(),
                vault_address,
                assets_usd: parse_money(rec.get("assetsUsd")).max(0.0),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.assets_usd
            .partial_cmp(&a.assets_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(CURATOR_DEPOSITOR_LIMIT);
    rows
}

/// The embedded transaction list is a JSON array of
/// `{hash, type, timestamp, data: {assetsUsd}}` objects; malformed entries
/// contribute nothing.
fn parse_embedded_transactions(raw: &str) -> Vec<VaultTransaction> {
    let Some(items) = parse_array(raw) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            Some(VaultTransaction {
                hash: str_field(obj.get("hash")),
                kind: str_field(obj.get("type")),
                timestamp: obj
                    .get("timestamp")
                    .and_then(|v| parse_unix_ts(&value_text(v))),
                amount_usd: obj
                    .get("data")
                    .and_then(|d| d.get("assetsUsd"))
                    .map(money_value)
                    .unwrap_or(0.0),
            })
        })
        .collect()
}

fn str_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or("").to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Money cells inside embedded JSON may be numbers or `$`/`,` strings.
fn money_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_money(s),
        _ => 0.0,
    }
}
