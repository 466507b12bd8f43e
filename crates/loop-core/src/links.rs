//! Deterministic navigation links into the external app and block explorers.
//!
//! These templates are consumed by the linked viewers verbatim — keep them
//! byte-for-byte stable.

/// Supported chains and their block explorers.
#[derive(Debug, Clone, Copy)]
pub struct ChainInfo {
    pub id: u64,
    pub name: &'static str,
    pub explorer_base: &'static str,
}

pub const CHAINS: &[ChainInfo] = &[
    ChainInfo { id: 1, name: "ethereum", explorer_base: "https://etherscan.io" },
    ChainInfo { id: 8453, name: "base", explorer_base: "https://basescan.org" },
    ChainInfo { id: 137, name: "polygon", explorer_base: "https://polygonscan.com" },
    ChainInfo { id: 42161, name: "arbitrum", explorer_base: "https://arbiscan.io" },
];

pub const DEFAULT_CHAIN_ID: u64 = 1;

pub fn chain_info(chain_id: u64) -> ChainInfo {
    CHAINS
        .iter()
        .copied()
        .find(|c| c.id == chain_id)
        .unwrap_or(CHAINS[0])
}

/// Market page on the Morpho app.
pub fn market_url(unique_key: &str) -> String {
    format!("https://app.morpho.org/ethereum/market/{unique_key}")
}

/// PT swap view for a Pendle market.
pub fn pendle_trade_url(market_address: &str) -> String {
    format!("https://app.pendle.finance/trade/markets/{market_address}/swap?view=pt&chain=ethereum")
}

/// Vault page on the Morpho app. The vault name is slugged with dashes.
pub fn vault_url(address: &str, name: &str) -> String {
    format!("https://app.morpho.org/ethereum/vault/{address}/{}", slug(name))
}

/// Curator page on the Morpho app.
pub fn curator_url(name: &str) -> String {
    format!("https://app.morpho.org/ethereum/curator/{}", slug(name))
}

/// Address page on the default chain's explorer.
pub fn address_url(address: &str) -> String {
    format!("{}/address/{address}", chain_info(DEFAULT_CHAIN_ID).explorer_base)
}

/// Transaction page on the default chain's explorer.
pub fn tx_url(hash: &str) -> String {
    format!("{}/tx/{hash}", chain_info(DEFAULT_CHAIN_ID).explorer_base)
}

fn slug(name: &str) -> String {
    name.replace(' ', "-")
}
