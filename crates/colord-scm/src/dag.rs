use std::collections::BTreeSet;
use std::fmt::{self, Display};

use colord_core::errors::{ErrorInfo, SweepError};
use colord_core::rng::RngHandle;
use indexmap::IndexMap;
use rand::seq::SliceRandom;

use crate::data::COLUMN_NAMES;

/// Seed of the shuffle behind the `random` strategy.
const RANDOM_ORDER_SEED: u64 = 42;

/// Names accepted in `ordering_strategies`, in listing order.
pub const STRATEGY_NAMES: [&str; 4] = ["original", "topological", "worst", "random"];

/// Causal graph over the declared columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    names: Vec<String>,
    /// `(parent, child)` pairs of column indices.
    edges: Vec<(usize, usize)>,
}

impl Dag {
    pub fn new(names: Vec<String>, edges: Vec<(usize, usize)>) -> Self {
        Self { names, edges }
    }

    /// Graph of the reference SCM.
    pub fn scm() -> Self {
        Self::new(
            COLUMN_NAMES.iter().map(|name| name.to_string()).collect(),
            vec![(2, 0), (2, 1), (0, 3), (1, 3)],
        )
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn parents(&self, node: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(_, child)| *child == node)
            .map(|(parent, _)| *parent)
            .collect()
    }

    /// Kahn's algorithm, always releasing the lowest ready index first.
    pub fn topological_order(&self) -> Result<Vec<usize>, SweepError> {
        let mut in_degree = vec![0usize; self.len()];
        for (_, child) in &self.edges {
            in_degree[*child] += 1;
        }
        let mut ready: BTreeSet<usize> = (0..self.len()).filter(|n| in_degree[*n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for (_, child) in self.edges.iter().filter(|(parent, _)| *parent == node) {
                in_degree[*child] -= 1;
                if in_degree[*child] == 0 {
                    ready.insert(*child);
                }
            }
        }
        if order.len() != self.len() {
            return Err(SweepError::Config(ErrorInfo::new(
                "dag-cycle",
                "causal graph contains a cycle",
            )));
        }
        Ok(order)
    }

    /// Every named strategy mapped to its column order.
    pub fn ordering_strategies(&self) -> Result<IndexMap<String, Vec<usize>>, SweepError> {
        let original: Vec<usize> = (0..self.len()).collect();
        let topological = self.topological_order()?;
        let worst: Vec<usize> = topological.iter().rev().copied().collect();
        let mut random = original.clone();
        random.shuffle(&mut RngHandle::from_seed(RANDOM_ORDER_SEED));

        let mut strategies = IndexMap::new();
        strategies.insert("original".to_string(), original);
        strategies.insert("topological".to_string(), topological);
        strategies.insert("worst".to_string(), worst);
        strategies.insert("random".to_string(), random);
        Ok(strategies)
    }

    /// Column orders for the `requested` strategies, failing on unknown names.
    pub fn resolve_orders(
        &self,
        requested: &[String],
    ) -> Result<IndexMap<String, Vec<usize>>, SweepError> {
        let available = self.ordering_strategies()?;
        let mut resolved = IndexMap::new();
        for name in requested {
            let Some(order) = available.get(name) else {
                return Err(SweepError::Config(
                    ErrorInfo::new(
                        "unknown-ordering-strategy",
                        format!("unknown ordering strategy: {name}"),
                    )
                    .with_context(
                        "available",
                        available.keys().cloned().collect::<Vec<_>>().join(", "),
                    ),
                ));
            };
            resolved.insert(name.clone(), order.clone());
        }
        Ok(resolved)
    }
}

impl Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, name) in self.names.iter().enumerate() {
            let parents: Vec<&str> = self
                .parents(idx)
                .into_iter()
                .map(|parent| self.names[parent].as_str())
                .collect();
            if parents.is_empty() {
                writeln!(f, "  {idx}: {name} (root)")?;
            } else {
                writeln!(f, "  {idx}: {name} <- {}", parents.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topological_order_releases_lowest_index_first() {
        assert_eq!(Dag::scm().topological_order().unwrap(), vec![2, 0, 1, 3]);
    }

    #[test]
    fn strategies_are_fixed_permutations() {
        let dag = Dag::scm();
        let first = dag.ordering_strategies().unwrap();
        let second = dag.ordering_strategies().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.keys().cloned().collect::<Vec<_>>(), STRATEGY_NAMES);
        assert_eq!(first["worst"], vec![3, 1, 0, 2]);
        for order in first.values() {
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn unknown_strategy_lists_available_ones() {
        let err = Dag::scm()
            .resolve_orders(&["original".into(), "alphabetical".into()])
            .unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
        assert!(err.info().context["available"].contains("topological"));
    }

    #[test]
    fn cycle_is_rejected() {
        let dag = Dag::new(vec!["x".into(), "y".into()], vec![(0, 1), (1, 0)]);
        assert!(dag.topological_order().is_err());
    }

    #[test]
    fn display_lists_parents() {
        let text = Dag::scm().to_string();
        assert!(text.contains("C (root)"));
        assert!(text.contains("D <- A, B"));
    }
}
