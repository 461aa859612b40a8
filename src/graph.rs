use parking_lot::Mutex;

use crate::types::VarId;

/// Undirected graph over `{0..p-1}` stored as one ascending neighbor vector
/// per vertex. This is the frozen (read-only) shape: during a level every
/// worker resolves adjacency against an immutable `Graph`, so reads need no
/// synchronization. Concurrent deletion happens on [`SharedGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<VarId>>,
}

impl Graph {
    /// Complete graph on `p` vertices.
    pub fn complete(p: usize) -> Self {
        let adjacency = (0..p)
            .map(|v| {
                (0..p)
                    .filter(|&u| u != v)
                    .map(|u| VarId(u as u32))
                    .collect()
            })
            .collect();
        Self { adjacency }
    }

    /// Graph with exactly the given undirected edges. Duplicate pairs and
    /// self-loops are rejected by the symmetry checks in `verify`.
    pub fn from_edges(p: usize, edges: &[(u32, u32)]) -> Self {
        let mut graph = Self {
            adjacency: vec![Vec::new(); p],
        };
        for &(a, b) in edges {
            graph.adjacency[a as usize].push(VarId(b));
            graph.adjacency[b as usize].push(VarId(a));
        }
        for neighbors in &mut graph.adjacency {
            neighbors.sort_unstable();
        }
        graph.verify();
        graph
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn neighbors(&self, v: VarId) -> &[VarId] {
        &self.adjacency[v.index()]
    }

    #[inline]
    pub fn neighbor_count(&self, v: VarId) -> usize {
        self.adjacency[v.index()].len()
    }

    pub fn has_edge(&self, i: VarId, j: VarId) -> bool {
        self.adjacency[i.index()].binary_search(&j).is_ok()
    }

    /// Removes `{i, j}`. Removing an absent edge is a no-op; a half-present
    /// edge means the symmetry invariant is already broken and is fatal.
    pub fn delete_edge(&mut self, i: VarId, j: VarId) {
        let forward = self.adjacency[i.index()].binary_search(&j);
        let backward = self.adjacency[j.index()].binary_search(&i);
        match (forward, backward) {
            (Ok(fi), Ok(bi)) => {
                self.adjacency[i.index()].remove(fi);
                self.adjacency[j.index()].remove(bi);
            }
            (Err(_), Err(_)) => {}
            _ => panic!("adjacency symmetry violated between {i} and {j}"),
        }
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// All edges `(i, j)` with `i < j`, ascending.
    pub fn edges(&self) -> Vec<(VarId, VarId)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (v, neighbors) in self.adjacency.iter().enumerate() {
            let v = VarId(v as u32);
            for &u in neighbors {
                if v < u {
                    edges.push((v, u));
                }
            }
        }
        edges
    }

    /// Panics unless every adjacency list is strictly ascending, free of
    /// self-loops, and mirrored by the other endpoint. Violations are bugs,
    /// not recoverable conditions.
    pub fn verify(&self) {
        for (v, neighbors) in self.adjacency.iter().enumerate() {
            let v = VarId(v as u32);
            for window in neighbors.windows(2) {
                assert!(
                    window[0] < window[1],
                    "adjacency of {v} is not strictly ascending"
                );
            }
            for &u in neighbors {
                assert!(u != v, "self-loop on {v}");
                assert!(
                    self.adjacency[u.index()].binary_search(&v).is_ok(),
                    "edge {v}-{u} is not mirrored"
                );
            }
        }
    }
}

/// Working copy of the graph for one or more levels: vertices own their
/// neighbor list behind a per-vertex lock, so workers delete edges
/// concurrently without a whole-graph lock. Promoted back into an immutable
/// [`Graph`] at each level barrier via [`SharedGraph::snapshot`].
#[derive(Debug)]
pub struct SharedGraph {
    slots: Vec<Mutex<Vec<VarId>>>,
}

impl SharedGraph {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            slots: graph
                .adjacency
                .iter()
                .map(|neighbors| Mutex::new(neighbors.clone()))
                .collect(),
        }
    }

    /// Whether `{i, j}` is still present. Racing deleters may remove the edge
    /// immediately after this returns; callers only rely on eventual
    /// visibility within the level.
    pub fn contains_edge(&self, i: VarId, j: VarId) -> bool {
        self.slots[i.index()].lock().binary_search(&j).is_ok()
    }

    /// Concurrent idempotent deletion. Both endpoint locks are taken in
    /// ascending vertex order so concurrent deleters cannot deadlock.
    /// Returns whether this call removed the edge.
    pub fn delete_edge(&self, i: VarId, j: VarId) -> bool {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let mut lo_neighbors = self.slots[lo.index()].lock();
        let mut hi_neighbors = self.slots[hi.index()].lock();
        match (
            lo_neighbors.binary_search(&hi),
            hi_neighbors.binary_search(&lo),
        ) {
            (Ok(a), Ok(b)) => {
                lo_neighbors.remove(a);
                hi_neighbors.remove(b);
                true
            }
            (Err(_), Err(_)) => false,
            _ => panic!("adjacency symmetry violated between {lo} and {hi}"),
        }
    }

    /// Immutable copy for promotion at the level barrier. Callers must
    /// guarantee no worker is mutating concurrently (the engine joins the
    /// pool first).
    pub fn snapshot(&self) -> Graph {
        Graph {
            adjacency: self.slots.iter().map(|slot| slot.lock().clone()).collect(),
        }
    }
}
