//! Cross-reference resolution between sources that do not share keys.
//!
//! All joins are best-effort left joins: an unresolved reference yields an
//! absent value on the dependent entity, never an error.

use std::collections::{HashMap, HashSet};

use loop_core::VaultView;
use sheet_loader::value::{normalize_key, parse_f64_opt};
use sheet_loader::{sheet, SheetSet};

/// Index over the fixed-yield match and market-data tables: market unique
/// key → Pendle market address → implied APY.
#[derive(Debug, Default)]
pub struct FixedYieldIndex {
    match_by_key: HashMap<String, String>,
    implied_apy_by_address: HashMap<String, f64>,
}

impl FixedYieldIndex {
    pub fn from_sheets(sheets: &SheetSet) -> Self {
        let mut index = FixedYieldIndex::default();

        if let Some(matches) = sheets.table(sheet::PT_MATCHES) {
            for rec in matches.records() {
                let key = normalize_key(rec.get("marketUniqueKey"));
                let address = normalize_key(rec.get("pendleMarketAddress"));
                if key.is_empty() || address.is_empty() {
                    continue;
                }
                // First match wins.
                index.match_by_key.entry(key).or_insert(address);
            }
        }

        if let Some(markets) = sheets.table(sheet::PT_MARKET_DATA) {
            for rec in markets.records() {
                let address = normalize_key(rec.get("pendleMarketAddress"));
                if address.is_empty() {
                    continue;
                }
                if let Some(apy) = parse_f64_opt(rec.get("marketData.impliedApy")) {
                    index
                        .implied_apy_by_address
                        .entry(address)
                        .or_insert(apy * 100.0);
                }
            }
        }

        index
    }

    /// Pendle market address matched to a pool, if any.
    pub fn pendle_address(&self, market_key: &str) -> Option<&str> {
        self.match_by_key
            .get(&normalize_key(market_key))
            .map(String::as_str)
    }

    /// Implied APY (percent) for a pool's matched fixed-yield market.
    pub fn implied_apy_pct(&self, market_key: &str) -> Option<f64> {
        let address = self.pendle_address(market_key)?;
        self.implied_apy_by_address.get(address).copied()
    }
}

/// Vaults managed by a curator: name membership in the vault's curator-name
/// list first, address equality only when no name matches. The result is
/// deduplicated by vault address so repeated attributions cannot
/// double-count TVL.
pub fn vaults_for_curator<'a>(
    vaults: &'a [VaultView],
    curator_name: &str,
    curator_address: &str,
) -> Vec<&'a VaultView> {
    let mut matched: Vec<&VaultView> = vaults
        .iter()
        .filter(|v| v.curator_names.iter().any(|n| n == curator_name))
        .collect();

    if matched.is_empty() && !curator_address.is_empty() {
        let address = normalize_key(curator_address);
        matched = vaults
            .iter()
            .filter(|v| v.curator_address == address)
            .collect();
    }

    let mut seen = HashSet::new();
    matched.retain(|v| seen.insert(v.address.clone()));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_loader::RawTable;

    fn vault(address: &str, names: &[&str], curator_address: &str, tvl: f64) -> VaultView {
        VaultView {
            address: address.to_string(),
            name: format!("Vault {address}"),
            symbol: "vTEST".into(),
            asset_symbol: "USDC".into(),
            tvl_usd: tvl,
            apy_pct: 5.0,
            fee_pct: 1.0,
            curator_address: curator_address.to_string(),
            curator_names: names.iter().map(|n| n.to_string()).collect(),
            whitelisted: true,
            app_link: String::new(),
        }
    }

    #[test]
    fn test_name_match_beats_address_fallback() {
        let vaults = vec![
            vault("0xa", &["Steakhouse"], "0xcur", 100.0),
            vault("0xb", &[], "0xcur", 200.0),
        ];
        let matched = vaults_for_curator(&vaults, "Steakhouse", "0xcur");
        // A name match exists, so the address-matched vault is not pulled in.
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].address, "0xa");
    }

    #[test]
    fn test_address_fallback_when_no_name_match() {
        let vaults = vec![vault("0xb", &["Someone Else"], "0xcur", 200.0)];
        let matched = vaults_for_curator(&vaults, "Steakhouse", "0xCUR");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].address, "0xb");
    }

    #[test]
    fn test_dedup_by_address_is_idempotent() {
        let vaults = vec![
            vault("0xa", &["Steakhouse"], "", 100.0),
            vault("0xa", &["Steakhouse"], "", 100.0),
        ];
        let first: f64 = vaults_for_curator(&vaults, "Steakhouse", "")
            .iter()
            .map(|v| v.tvl_usd)
            .sum();
        let second: f64 = vaults_for_curator(&vaults, "Steakhouse", "")
            .iter()
            .map(|v| v.tvl_usd)
            .sum();
        assert_eq!(first, 100.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_first_match_wins() {
        let mut sheets = SheetSet::default();
        sheets.insert(RawTable {
            name: sheet::PT_MATCHES.into(),
            headers: vec!["marketUniqueKey".into(), "pendleMarketAddress".into()],
            rows: vec![
                vec!["0xAAA".into(), "0xP1".into()],
                vec!["0xAAA".into(), "0xP2".into()],
            ],
        });
        sheets.insert(RawTable {
            name: sheet::PT_MARKET_DATA.into(),
            headers: vec!["pendleMarketAddress".into(), "marketData.impliedApy".into()],
            rows: vec![
                vec!["0xP1".into(), "0.12".into()],
                vec!["0xP2".into(), "0.99".into()],
            ],
        });

        let index = FixedYieldIndex::from_sheets(&sheets);
        assert_eq!(index.pendle_address("0xaaa"), Some("0xp1"));
        assert_eq!(index.implied_apy_pct("0xAAA"), Some(12.0));
    }

    #[test]
    fn test_unresolved_references_are_absent() {
        let index = FixedYieldIndex::from_sheets(&SheetSet::default());
        assert_eq!(index.pendle_address("0xmissing"), None);
        assert_eq!(index.implied_apy_pct("0xmissing"), None);
    }
}
