//! Curator views: socials parsing, managed-vault resolution, and the AUM
//! roll-up.

use loop_core::{links, CuratorSocials, CuratorView, ManagedVault, VaultView};
use sheet_loader::embedded::parse_object_or_pairs;
use sheet_loader::value::{normalize_key, parse_money};
use sheet_loader::{sheet, SheetSet};
use yield_metrics::effective_aum;

use crate::resolver::vaults_for_curator;

/// Build curator views against an already-built vault set. Curators whose
/// effective AUM is zero are excluded; the rest are sorted by AUM
/// descending.
pub fn build_curators(sheets: &SheetSet, vaults: &[VaultView]) -> Vec<CuratorView> {
    let Some(table) = sheets.table(sheet::CURATORS) else {
        return Vec::new();
    };

    let mut curators: Vec<CuratorView> = table
        .records()
        .filter_map(|rec| {
            let name = rec.get_opt("name").unwrap_or("Unknown").to_string();
            let address = normalize_key(rec.get("addresses"));
            let reported_aum_usd = parse_money(rec.get("aum")).max(0.0);

            let managed = vaults_for_curator(vaults, &name, &address);
            let computed_aum_usd: f64 = managed.iter().map(|v| v.tvl_usd).sum();
            let effective_aum_usd = effective_aum(reported_aum_usd, computed_aum_usd);
            if effective_aum_usd <= 0.0 {
                return None;
            }

            let socials = parse_object_or_pairs(rec.get("socials"));
            Some(CuratorView {
                app_link: links::curator_url(&name),
                socials: CuratorSocials {
                    forum: socials.get("forum").map(str::to_string),
                    twitter: socials.get("twitter").map(str::to_string),
                    url: socials.get("url").map(str::to_string),
                },
                vaults: managed
                    .iter()
                    .map(|v| ManagedVault {
                        name: v.name.clone(),
                        address: v.address.clone(),
                        tvl_usd: v.tvl_usd,
                        apy_pct: v.apy_pct,
                    })
                    .collect(),
                name,
                address,
                reported_aum_usd,
                computed_aum_usd,
                effective_aum_usd,
            })
        })
        .collect();

    curators.sort_by(|a, b| {
        b.effective_aum_usd
            .partial_cmp(&a.effective_aum_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    curators
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_loader::RawTable;

    fn curators_table(rows: Vec<Vec<String>>) -> RawTable {
        RawTable {
            name: sheet::CURATORS.into(),
            headers: vec![
                "name".into(),
                "addresses".into(),
                "aum".into(),
                "socials".into(),
            ],
            rows,
        }
    }

    fn vault(address: &str, names: &[&str], tvl: f64) -> VaultView {
        VaultView {
            address: address.to_string(),
            name: format!("Vault {address}"),
            symbol: "vT".into(),
            asset_symbol: "USDC".into(),
            tvl_usd: tvl,
            apy_pct: 4.0,
            fee_pct: 0.0,
            curator_address: String::new(),
            curator_names: names.iter().map(|n| n.to_string()).collect(),
            whitelisted: false,
            app_link: String::new(),
        }
    }

    #[test]
    fn test_effective_aum_takes_the_max() {
        let mut sheets = SheetSet::default();
        sheets.insert(curators_table(vec![
            vec!["Steakhouse".into(), "0xS".into(), "500".into(), String::new()],
            vec!["Gauntlet".into(), "0xG".into(), "9000".into(), String::new()],
        ]));
        let vaults = vec![
            vault("0xa", &["Steakhouse"], 4000.0),
            vault("0xb", &["Gauntlet"], 100.0),
        ];

        let curators = build_curators(&sheets, &vaults);
        assert_eq!(curators.len(), 2);
        // Sorted descending by effective AUM.
        assert_eq!(curators[0].name, "Gauntlet");
        assert_eq!(curators[0].effective_aum_usd, 9000.0);
        assert_eq!(curators[1].name, "Steakhouse");
        assert_eq!(curators[1].reported_aum_usd, 500.0);
        assert_eq!(curators[1].computed_aum_usd, 4000.0);
        assert_eq!(curators[1].effective_aum_usd, 4000.0);
    }

    #[test]
    fn test_zero_aum_curators_excluded() {
        let mut sheets = SheetSet::default();
        sheets.insert(curators_table(vec![vec![
            "Ghost".into(),
            "0xg".into(),
            "0".into(),
            String::new(),
        ]]));
        assert!(build_curators(&sheets, &[]).is_empty());
    }

    #[test]
    fn test_duplicate_vault_rows_counted_once() {
        let mut sheets = SheetSet::default();
        sheets.insert(curators_table(vec![vec![
            "Steakhouse".into(),
            String::new(),
            "0".into(),
            String::new(),
        ]]));
        let vaults = vec![
            vault("0xa", &["Steakhouse"], 100.0),
            vault("0xa", &["Steakhouse"], 100.0),
        ];

        let curators = build_curators(&sheets, &vaults);
        assert_eq!(curators[0].computed_aum_usd, 100.0);
        assert_eq!(curators[0].vaults.len(), 1);

        // Running the aggregation again over the same inputs changes nothing.
        let again = build_curators(&sheets, &vaults);
        assert_eq!(again[0].computed_aum_usd, 100.0);
    }

    #[test]
    fn test_socials_both_encodings() {
        let mut sheets = SheetSet::default();
        sheets.insert(curators_table(vec![
            vec![
                "A".into(),
                String::new(),
                "10".into(),
                r#"{"forum": "https://f", "url": "https://u"}"#.into(),
            ],
            vec![
                "B".into(),
                String::new(),
                "10".into(),
                "twitter:https://x.com/b|url:https://b".into(),
            ],
            vec!["C".into(), String::new(), "10".into(), "not structured".into()],
        ]));

        let curators = build_curators(&sheets, &[]);
        let by_name = |n: &str| curators.iter().find(|c| c.name == n).unwrap();
        assert_eq!(by_name("A").socials.forum.as_deref(), Some("https://f"));
        assert_eq!(by_name("B").socials.twitter.as_deref(), Some("https://x.com/b"));
        assert_eq!(by_name("B").socials.url.as_deref(), Some("https://b"));
        assert!(by_name("C").socials.forum.is_none());
        assert_eq!(
            by_name("A").app_link,
            "https://app.morpho.org/ethereum/curator/A"
        );
    }
}
