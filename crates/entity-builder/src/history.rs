//! Historical APY series: the embedded point list on a market record, and
//! the fixed-yield history table joined through the match index.

use loop_core::ApyPoint;
use serde_json::Value;
use sheet_loader::value::{normalize_key, parse_f64_opt, parse_unix_ts};
use sheet_loader::{sheet, SheetSet};

use crate::resolver::FixedYieldIndex;

/// Parse an embedded `[{x: unix_ts, y: rate}]` series cell. Points that do
/// not carry both coordinates are dropped; rates are scaled to percent.
pub fn parse_point_series(raw: &str) -> Vec<ApyPoint> {
    let Ok(Value::Array(points)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    let mut series: Vec<ApyPoint> = points
        .iter()
        .filter_map(|point| {
            let ts = point.get("x")?.as_f64()?;
            let apy = point.get("y")?.as_f64()?;
            let timestamp = parse_unix_ts(&ts.to_string())?;
            Some(ApyPoint { timestamp, apy_pct: apy * 100.0 })
        })
        .collect();
    series.sort_by_key(|p| p.timestamp);
    series
}

/// Borrow-rate history embedded on a market record.
pub fn market_borrow_history(sheets: &SheetSet, market_key: &str) -> Vec<ApyPoint> {
    let Some(markets) = sheets.table(sheet::MARKETS) else {
        return Vec::new();
    };
    let market_key = normalize_key(market_key);
    markets
        .records()
        .find(|rec| normalize_key(rec.get("uniqueKey")) == market_key)
        .map(|rec| parse_point_series(rec.get("historicalState.dailyNetBorrowApy")))
        .unwrap_or_default()
}

/// Fixed-yield APY history for a pool, joined through the match index into
/// the history table's flattened `point.*` columns.
pub fn fixed_yield_history(
    sheets: &SheetSet,
    index: &FixedYieldIndex,
    market_key: &str,
) -> Vec<ApyPoint> {
    let Some(history) = sheets.table(sheet::PT_MARKET_HISTORY) else {
        return Vec::new();
    };
    let Some(address) = index.pendle_address(market_key) else {
        return Vec::new();
    };

    let mut series: Vec<ApyPoint> = history
        .records()
        .filter(|rec| normalize_key(rec.get("pendleMarketAddress")) == address)
        .filter_map(|rec| {
            let timestamp = parse_unix_ts(rec.get("point.timestamp"))?;
            let apy = parse_f64_opt(rec.get("point.apy"))?;
            Some(ApyPoint { timestamp, apy_pct: apy * 100.0 })
        })
        .collect();
    series.sort_by_key(|p| p.timestamp);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_loader::RawTable;

    #[test]
    fn test_point_series_parses_and_sorts() {
        let series = parse_point_series(
            r#"[{"x": 1700000600, "y": 0.05}, {"x": 1700000000, "y": 0.04}, {"y": 0.9}]"#,
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].apy_pct, 4.0);
        assert_eq!(series[1].apy_pct, 5.0);
        assert!(parse_point_series("not json").is_empty());
    }

    #[test]
    fn test_fixed_yield_history_join() {
        let mut sheets = SheetSet::default();
        sheets.insert(RawTable {
            name: sheet::PT_MATCHES.into(),
            headers: vec!["marketUniqueKey".into(), "pendleMarketAddress".into()],
            rows: vec![vec!["0xKEY".into(), "0xP".into()]],
        });
        sheets.insert(RawTable {
            name: sheet::PT_MARKET_HISTORY.into(),
            headers: vec![
                "pendleMarketAddress".into(),
                "point.timestamp".into(),
                "point.apy".into(),
            ],
            rows: vec![
                vec!["0xP".into(), "1700000600".into(), "0.11".into()],
                vec!["0xP".into(), "1700000000".into(), "0.10".into()],
                vec!["0xP".into(), "bad".into(), "0.12".into()],
                vec!["0xOther".into(), "1700000000".into(), "0.5".into()],
            ],
        });

        let index = FixedYieldIndex::from_sheets(&sheets);
        let series = fixed_yield_history(&sheets, &index, "0xkey");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].apy_pct, 10.0);
        assert_eq!(series[1].apy_pct, 11.0);

        assert!(fixed_yield_history(&sheets, &index, "0xunmatched").is_empty());
    }
}
