//! Canonical entity views built from raw snapshot tables: pools, vaults,
//! curators, positions, and the cross-reference joins between them.

pub mod classify;
pub mod curators;
pub mod history;
pub mod pools;
pub mod positions;
pub mod resolver;
pub mod vaults;

pub use classify::{external_yield_estimate, is_fixed_yield_symbol};
pub use curators::build_curators;
pub use pools::build_pools;
pub use resolver::FixedYieldIndex;
pub use vaults::build_vaults;
