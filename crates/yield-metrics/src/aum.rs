/// Reconcile a curator's reported AUM with the figure computed from its
/// managed vaults. The computed sum is a lower bound: the reported figure
/// may be stale, or may include off-platform assets — take the max.
pub fn effective_aum(reported_usd: f64, computed_usd: f64) -> f64 {
    reported_usd.max(computed_usd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_aum_is_monotonic() {
        let cases = [
            (0.0, 0.0),
            (100.0, 50.0),
            (50.0, 100.0),
            (1e9, 1e9),
            (0.0, 42.0),
        ];
        for (reported, computed) in cases {
            let effective = effective_aum(reported, computed);
            assert!(effective >= reported);
            assert!(effective >= computed);
        }
    }
}
