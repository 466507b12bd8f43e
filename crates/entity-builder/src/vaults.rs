//! Vault views from the vaults table.

use loop_core::{links, VaultView};
use sheet_loader::embedded;
use sheet_loader::value::{normalize_key, parse_bool, parse_f64, parse_money};
use sheet_loader::{sheet, SheetSet};

/// Vaults below this TVL are excluded from curator attribution; dust
/// positions only add noise to the AUM roll-up.
pub const MIN_CURATED_TVL_USD: f64 = 50.0;

/// Build all vault views. A missing vaults table means the feature is
/// unavailable, not an error.
pub fn build_vaults(sheets: &SheetSet) -> Vec<VaultView> {
    let Some(table) = sheets.table(sheet::VAULTS) else {
        return Vec::new();
    };

    table
        .records()
        .filter_map(|rec| {
            let address = normalize_key(rec.get("address"));
            if address.is_empty() {
                return None;
            }
            let name = rec.get_opt("name").unwrap_or("Unknown").to_string();
            let tvl_usd = parse_money(rec.get("state.totalAssetsUsd")).max(0.0);

            let curator_names = if tvl_usd >= MIN_CURATED_TVL_USD {
                parse_curator_names(rec.get("state.curators"))
            } else {
                Vec::new()
            };

            Some(VaultView {
                app_link: links::vault_url(&address, &name),
                address,
                symbol: rec.get_opt("symbol").unwrap_or("—").to_string(),
                asset_symbol: rec.get_opt("asset.symbol").unwrap_or("—").to_string(),
                tvl_usd,
                apy_pct: parse_f64(rec.get("state.dailyApy")) * 100.0,
                fee_pct: parse_f64(rec.get("state.fee")) * 100.0,
                curator_address: normalize_key(rec.get("state.curator")),
                curator_names,
                whitelisted: parse_bool(rec.get("whitelisted")),
                name,
            })
        })
        .collect()
}

/// The embedded curator list is a JSON array of objects with a `name`
/// field. There is no fallback encoding for vaults: a cell that fails to
/// parse yields an empty list.
fn parse_curator_names(raw: &str) -> Vec<String> {
    let Some(items) = embedded::parse_array(raw) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.get("name").and_then(|n| n.as_str()))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
