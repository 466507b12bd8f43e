//! String-based classification rules, kept as documented tables and pure
//! functions so they can be unit-tested and swapped without touching the
//! join logic that consumes them.

/// Static per-symbol yield estimates used when a pool's collateral has no
/// fixed-yield market behind it. Unknown symbols yield no estimate — not
/// zero.
pub const EXTERNAL_YIELD_ESTIMATES: &[(&str, f64)] = &[
    ("WETH", 3.5),
    ("ETH", 3.5),
    ("USDC", 4.5),
    ("USDT", 4.2),
    ("DAI", 4.0),
    ("WSTETH", 4.2),
    ("RETH", 4.1),
    ("CBETH", 3.8),
];

/// A collateral symbol marks its pool as fixed-yield-collateral when it
/// carries the Pendle principal-token prefix, or `PT` anywhere in the
/// uppercased symbol.
pub fn is_fixed_yield_symbol(symbol: &str) -> bool {
    let upper = symbol.trim().to_uppercase();
    if upper.is_empty() {
        return false;
    }
    upper.starts_with("PT-") || upper.contains("PT")
}

/// Look up the external yield estimate for a plain collateral symbol.
pub fn external_yield_estimate(symbol: &str) -> Option<f64> {
    let upper = symbol.trim().to_uppercase();
    EXTERNAL_YIELD_ESTIMATES
        .iter()
        .find(|(sym, _)| *sym == upper)
        .map(|(_, apy)| *apy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pt_token_detection() {
        assert!(is_fixed_yield_symbol("PT-sUSDe-26DEC2024"));
        assert!(is_fixed_yield_symbol("pt-weth"));
        assert!(!is_fixed_yield_symbol("USDC"));
        assert!(!is_fixed_yield_symbol("WETH"));
        assert!(!is_fixed_yield_symbol(""));
    }

    #[test]
    fn test_external_yield_estimates() {
        assert_eq!(external_yield_estimate("USDC"), Some(4.5));
        assert_eq!(external_yield_estimate("weth"), Some(3.5));
        assert_eq!(external_yield_estimate("wstETH"), Some(4.2));
        // Unknown symbols have no estimate, which must stay distinct from 0.
        assert_eq!(external_yield_estimate("SHIB"), None);
        assert_eq!(external_yield_estimate("PT-sUSDe-26DEC2024"), None);
    }
}
