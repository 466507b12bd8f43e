//! Secondary JSON ingestion path: the complete-analysis document plus the
//! optional Pendle summary/analysis documents produced by the collectors.
//!
//! Only the skeleton each consumer relies on is typed; nested market and
//! position detail stays as raw JSON values. Optional documents degrade to
//! `None`, never abort.

use std::collections::BTreeMap;
use std::path::Path;

use loop_core::LoopError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisMetadata {
    pub total_markets: Option<u64>,
    pub generated_at: Option<String>,
    pub data_structure: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketEntry {
    pub market: Value,
    pub top_borrowers: Vec<Value>,
}

impl MarketEntry {
    pub fn unique_key(&self) -> Option<&str> {
        self.market.get("uniqueKey").and_then(Value::as_str)
    }
}

/// `{ metadata, data: [{ market, topBorrowers }] }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompleteAnalysis {
    pub metadata: AnalysisMetadata,
    pub data: Vec<MarketEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendleSummary {
    pub pt_markets: Vec<Value>,
    pub top_borrowers_by_market: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendleAnalysisMetadata {
    pub total_pt_markets: Option<u64>,
    pub total_borrowers: Option<u64>,
    pub generated_at: Option<String>,
    pub description: Option<String>,
}

/// Per fixed-yield-market nested detail, keyed by Pendle market address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PtMarketDetail {
    pub morpho_market: Option<Value>,
    pub pendle_market: Option<Value>,
    pub market_details: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendleAnalysis {
    pub metadata: PendleAnalysisMetadata,
    pub pt_markets_data: BTreeMap<String, PtMarketDetail>,
}

/// Load the primary JSON document. Unlike the optional documents, callers
/// get a real error here so they can report what is wrong with the export.
pub fn load_complete_analysis(path: &Path) -> Result<CompleteAnalysis, LoopError> {
    if !path.exists() {
        return Err(LoopError::SnapshotNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| LoopError::MalformedDocument {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load an optional document. Absence and parse failures both degrade to
/// `None` with a warning; the session stays usable either way.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "optional document absent");
        return None;
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "optional document unreadable");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "optional document malformed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_analysis_shape() {
        let doc: CompleteAnalysis = serde_json::from_str(
            r#"{
                "metadata": {"totalMarkets": 2, "generatedAt": "2025-07-01T00:00:00Z"},
                "data": [
                    {"market": {"uniqueKey": "0xAAA"}, "topBorrowers": [{"userAddress": "0x1"}]},
                    {"market": {"uniqueKey": "0xBBB"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.metadata.total_markets, Some(2));
        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.data[0].unique_key(), Some("0xAAA"));
        assert!(doc.data[1].top_borrowers.is_empty());
    }

    #[test]
    fn test_missing_sections_default() {
        let doc: CompleteAnalysis = serde_json::from_str("{}").unwrap();
        assert!(doc.data.is_empty());
        assert!(doc.metadata.total_markets.is_none());
    }

    #[test]
    fn test_pendle_analysis_keyed_by_address() {
        let doc: PendleAnalysis = serde_json::from_str(
            r#"{
                "metadata": {"totalPTMarkets": 1},
                "ptMarketsData": {
                    "0xpendle": {"morphoMarket": {"uniqueKey": "0xAAA"}, "pendleMarket": {}}
                }
            }"#,
        )
        .unwrap();
        let detail = doc.pt_markets_data.get("0xpendle").unwrap();
        assert!(detail.morpho_market.is_some());
        assert!(detail.market_details.is_none());
    }

    #[test]
    fn test_load_optional_absent_is_none() {
        let missing: Option<PendleSummary> =
            load_optional(Path::new("/nonexistent/pendle_summary.json"));
        assert!(missing.is_none());
    }
}
