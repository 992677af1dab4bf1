//! # Basins of Attraction
//!
//! A basin is every state whose trajectory drains into one attractor.
//! Nodes are kept in a dense arena indexed by state, so a basin is a
//! plain value: no pointers between nodes, and cloning or comparing two
//! basins is cheap.
//!
//! Two basins with the same limit cycle are the same basin. Merging them
//! takes the union of their nodes and, for states known to both, the
//! union of their parent sets.

use serde::{Deserialize, Serialize};

use bnet_core::{State, StateSet};

/// How a basin ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// Trace still open
    #[default]
    Unknown,
    /// Single self-mapping state
    Point,
    /// Cycle of two or more states
    Limit,
}

/// One state in the transition graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateNode {
    pub state: State,

    /// Successor under synchronous development
    pub child: State,

    /// Predecessors discovered so far
    pub parents: StateSet,
}

impl StateNode {
    pub fn new(state: State, child: State) -> Self {
        Self {
            state,
            child,
            parents: StateSet::new(),
        }
    }

    /// No known predecessor: a "garden of Eden" state
    #[inline]
    pub fn is_source(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Transient states plus the attractor they drain into
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasinOfAttraction {
    nodes: Vec<Option<StateNode>>,
    members: StateSet,
    endpoint: Endpoint,
    limit_cycle: StateSet,
    cycle_order: Vec<State>,
}

impl BasinOfAttraction {
    /// Create an empty basin over a space of `num_states` states
    pub fn new(num_states: usize) -> Self {
        Self {
            nodes: vec![None; num_states],
            members: StateSet::new(),
            endpoint: Endpoint::Unknown,
            limit_cycle: StateSet::new(),
            cycle_order: Vec::new(),
        }
    }

    /// Record `state -> child`, with `parent` as a predecessor of `state`
    pub fn insert(&mut self, state: State, child: State, parent: Option<State>) {
        let node = self.nodes[state as usize].get_or_insert_with(|| StateNode::new(state, child));
        debug_assert_eq!(node.child, child, "state {:#04x} has two children", state);
        if let Some(p) = parent {
            node.parents.insert(p);
        }
        self.members.insert(state);
    }

    /// Add a predecessor to a state already in the basin
    pub fn add_parent(&mut self, state: State, parent: State) {
        if let Some(node) = self.nodes[state as usize].as_mut() {
            node.parents.insert(parent);
        }
    }

    /// Close the trace: `repeated` was reached again, coming from `last`
    ///
    /// A state reached from itself is a point attractor; otherwise the
    /// cycle is recovered by following child links from `repeated`.
    pub fn classify(&mut self, repeated: State, last: State) {
        self.limit_cycle = StateSet::new();
        self.cycle_order.clear();

        if repeated == last {
            self.endpoint = Endpoint::Point;
            self.limit_cycle.insert(repeated);
            self.cycle_order.push(repeated);
            return;
        }

        self.endpoint = Endpoint::Limit;
        let mut st = repeated;
        while self.limit_cycle.insert(st) {
            self.cycle_order.push(st);
            match self.node(st) {
                Some(node) => st = node.child,
                None => break,
            }
        }

        // Canonical order: start the cycle at its smallest state
        if let Some(&min) = self.cycle_order.iter().min() {
            if let Some(at) = self.cycle_order.iter().position(|&s| s == min) {
                self.cycle_order.rotate_left(at);
            }
        }
    }

    /// Fold another basin with the same attractor into this one
    pub fn merge(&mut self, other: BasinOfAttraction) {
        debug_assert!(
            other.endpoint == Endpoint::Unknown || other.limit_cycle == self.limit_cycle,
            "merging basins with different attractors"
        );
        for node in other.nodes.into_iter().flatten() {
            let at = node.state as usize;
            match self.nodes[at].as_mut() {
                Some(existing) => existing.parents.union_with(&node.parents),
                None => {
                    self.members.insert(node.state);
                    self.nodes[at] = Some(node);
                }
            }
        }
    }

    #[inline]
    pub fn contains(&self, s: State) -> bool {
        self.members.contains(s)
    }

    #[inline]
    pub fn node(&self, s: State) -> Option<&StateNode> {
        self.nodes.get(s as usize).and_then(|n| n.as_ref())
    }

    /// Nodes in ascending state order
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.iter().flatten()
    }

    #[inline]
    pub fn members(&self) -> &StateSet {
        &self.members
    }

    /// Number of states in the basin
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    #[inline]
    pub fn limit_cycle(&self) -> &StateSet {
        &self.limit_cycle
    }

    /// Attractor states in cyclic order, starting at the smallest
    #[inline]
    pub fn cycle_order(&self) -> &[State] {
        &self.cycle_order
    }

    #[inline]
    pub fn attractor_len(&self) -> usize {
        self.limit_cycle.len()
    }

    /// States with no predecessor
    pub fn sources(&self) -> StateSet {
        self.nodes()
            .filter(|n| n.is_source())
            .map(|n| n.state)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_classification() {
        let mut basin = BasinOfAttraction::new(8);
        basin.insert(3, 1, None);
        basin.insert(1, 1, Some(3));
        basin.add_parent(1, 1);
        basin.classify(1, 1);

        assert_eq!(basin.endpoint(), Endpoint::Point);
        assert_eq!(basin.limit_cycle(), &StateSet::single(1));
        assert_eq!(basin.sources(), StateSet::single(3));
        assert_eq!(basin.len(), 2);
    }

    #[test]
    fn test_limit_classification() {
        // 0 -> 5 -> 6 -> 2 -> 5
        let mut basin = BasinOfAttraction::new(8);
        basin.insert(0, 5, None);
        basin.insert(5, 6, Some(0));
        basin.insert(6, 2, Some(5));
        basin.insert(2, 5, Some(6));
        basin.add_parent(5, 2);
        basin.classify(5, 2);

        assert_eq!(basin.endpoint(), Endpoint::Limit);
        assert_eq!(basin.attractor_len(), 3);
        assert_eq!(basin.cycle_order(), &[2, 5, 6]);
        assert!(!basin.limit_cycle().contains(0));
    }

    #[test]
    fn test_merge_unions_parents() {
        let mut a = BasinOfAttraction::new(8);
        a.insert(4, 0, None);
        a.insert(0, 0, Some(4));
        a.add_parent(0, 0);
        a.classify(0, 0);

        let mut b = BasinOfAttraction::new(8);
        b.insert(7, 0, None);
        b.insert(0, 0, Some(7));
        b.add_parent(0, 0);
        b.classify(0, 0);

        a.merge(b);
        assert_eq!(a.len(), 3);
        let parents: Vec<State> = a.node(0).unwrap().parents.iter().collect();
        assert_eq!(parents, vec![0, 4, 7]);
        assert_eq!(a.sources().iter().collect::<Vec<_>>(), vec![4, 7]);
    }

    #[test]
    fn test_merge_adopts_new_nodes() {
        // 0 -> 1 -> 1
        let mut a = BasinOfAttraction::new(8);
        a.insert(0, 1, None);
        a.insert(1, 1, Some(0));
        a.add_parent(1, 1);
        a.classify(1, 1);

        // 6 -> 2 -> 1, handed in before it closes
        let mut b = BasinOfAttraction::new(8);
        b.insert(6, 2, None);
        b.insert(2, 1, Some(6));
        a.add_parent(1, 2);
        a.merge(b);

        assert_eq!(a.members().iter().collect::<Vec<_>>(), vec![0, 1, 2, 6]);
        let adopted = a.node(2).unwrap();
        assert_eq!(adopted.state, 2);
        assert_eq!(adopted.child, 1);
        assert_eq!(adopted.parents, StateSet::single(6));
        assert_eq!(a.node(1).unwrap().parents.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(a.endpoint(), Endpoint::Point);
    }
}
