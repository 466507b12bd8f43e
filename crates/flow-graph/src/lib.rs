//! Flow-conservation graphs over transaction histories.
//!
//! Converts a pool's (or one user's) transactions into a categorized
//! node/edge list for visualization: actors on one side, asset nodes on the
//! other, edge values summed by transaction-type substring match.

use loop_core::{DepositorPosition, PoolView, Transaction, VaultView};
use serde::{Deserialize, Serialize};

/// Tunable allocation constants. The fixed-yield split is a stated
/// heuristic, not a measured figure — callers may override it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Share of supply volume attributed to the fixed-yield leg of a PT
    /// pool.
    pub fixed_yield_allocation: f64,
    /// Share of a vault deposit assumed deployed into its asset pool.
    pub vault_deployment_ratio: f64,
    /// Actor cap for pool-wide graphs.
    pub max_actors: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            fixed_yield_allocation: 0.8,
            vault_deployment_ratio: 0.9,
            max_actors: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Actor,
    LoanAsset,
    CollateralAsset,
    FixedYield,
    Vault,
    AssetPool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub label: String,
    pub kind: NodeKind,
}

/// Directed volume edge between two node indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,
    pub value_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    fn new() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new() }
    }

    fn add_node(&mut self, label: impl Into<String>, kind: NodeKind) -> usize {
        self.nodes.push(FlowNode { label: label.into(), kind });
        self.nodes.len() - 1
    }

    /// Zero-valued edges are omitted entirely.
    fn add_edge(&mut self, source: usize, target: usize, value_usd: f64) {
        if value_usd > 0.0 {
            self.edges.push(FlowEdge { source, target, value_usd: value_usd.abs() });
        }
    }
}

/// Flow graph for one pool, or one user inside it.
///
/// Edges per actor: actor→Loan for borrow volume, Loan→actor for repay,
/// actor→Collateral for supply/collateral volume, Collateral→actor for
/// withdraw. Fixed-yield pools route `fixed_yield_allocation` of each
/// actor's supply volume onward from the collateral node. An empty edge
/// set means there is not enough data for a graph.
pub fn pool_flow(
    transactions: &[Transaction],
    pool: &PoolView,
    user_address: Option<&str>,
    config: &FlowConfig,
) -> Option<FlowGraph> {
    if transactions.is_empty() {
        return None;
    }

    let actors: Vec<String> = match user_address {
        Some(user) => vec![user.to_lowercase()],
        None => {
            let mut unique: Vec<String> = transactions
                .iter()
                .map(|tx| tx.user_address.clone())
                .filter(|a| !a.is_empty())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();
            unique.truncate(config.max_actors);
            unique
        }
    };

    let mut graph = FlowGraph::new();
    let actor_nodes: Vec<usize> = actors
        .iter()
        .map(|a| graph.add_node(a.clone(), NodeKind::Actor))
        .collect();
    let loan_node = graph.add_node(format!("Loan: {}", pool.loan_symbol), NodeKind::LoanAsset);
    let collateral_node = graph.add_node(
        format!("Collateral: {}", pool.collateral_symbol),
        NodeKind::CollateralAsset,
    );
    let fixed_yield_node = pool
        .is_fixed_yield
        .then(|| graph.add_node("Pendle PT", NodeKind::FixedYield));

    for (actor, &actor_node) in actors.iter().zip(&actor_nodes) {
        let mut borrow = 0.0;
        let mut repay = 0.0;
        let mut supply = 0.0;
        let mut withdraw = 0.0;
        for tx in transactions.iter().filter(|tx| &tx.user_address == actor) {
            let kind = tx.kind.to_lowercase();
            let usd = tx.amount_usd.abs();
            if kind.contains("borrow") {
                borrow += usd;
            }
            if kind.contains("repay") {
                repay += usd;
            }
            if kind.contains("supply") || kind.contains("collateral") {
                supply += usd;
            }
            if kind.contains("withdraw") {
                withdraw += usd;
            }
        }

        graph.add_edge(actor_node, loan_node, borrow);
        graph.add_edge(loan_node, actor_node, repay);
        graph.add_edge(actor_node, collateral_node, supply);
        graph.add_edge(collateral_node, actor_node, withdraw);

        if let Some(fy_node) = fixed_yield_node {
            graph.add_edge(collateral_node, fy_node, supply * config.fixed_yield_allocation);
        }
    }

    if graph.edges.is_empty() {
        tracing::debug!(pool = %pool.unique_key, "insufficient data for flow graph");
        return None;
    }
    Some(graph)
}

/// Depositor flow into a vault and onward into its asset pool, at the
/// assumed deployment ratio.
pub fn depositor_flow(
    depositors: &[DepositorPosition],
    vault: &VaultView,
    config: &FlowConfig,
) -> Option<FlowGraph> {
    if depositors.is_empty() {
        return None;
    }

    let mut graph = FlowGraph::new();
    let vault_node = graph.add_node(vault.name.clone(), NodeKind::Vault);
    let pool_node = graph.add_node(format!("{} Pool", vault.asset_symbol), NodeKind::AssetPool);

    for depositor in depositors.iter().take(5) {
        let depositor_node = graph.add_node(depositor.user_address.clone(), NodeKind::Actor);
        graph.add_edge(depositor_node, vault_node, depositor.effective_usd);
        graph.add_edge(
            vault_node,
            pool_node,
            depositor.effective_usd * config.vault_deployment_ratio,
        );
    }

    if graph.edges.is_empty() {
        return None;
    }
    Some(graph)
}
