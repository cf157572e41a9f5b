use bit_set::BitSet;

use crate::dimacs::read_from_file;
use crate::error::InstanceError;
use crate::color::{ColoringInstance, VertexId};

/** models a Graph Coloring instance.  */
#[derive(Debug, Clone)]
pub struct Graph {
    /// nb vertices
    n: usize,
    /// edges of the graph (u < v, self-loops excluded)
    edges: Vec<(VertexId,VertexId)>,
    /// adj_list[i]: list of vertices adjacent to i (sorted, self-loops kept)
    adj_list: Vec<Vec<VertexId>>,
    /// if exists: adj_matrix[i] represents a bitset of its neighbors
    adj_matrix: Option<Vec<BitSet>>,
}

impl ColoringInstance for Graph {
    fn nb_vertices(&self) -> usize { self.n }

    fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.adj_list[u] }

    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool {
        match &self.adj_matrix { // if the matrix representation does not exist, iterate over
            None => { self.adj_list[u].binary_search(&v).is_ok() },
            Some(matrix) => { matrix[u].contains(v) } // otherwise, use it
        }
    }

    fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }
}


impl Graph {

    /// builds the edge list
    fn build_edges(adj_list:&[Vec<VertexId>]) -> Vec<(VertexId,VertexId)> {
        let mut res = Vec::new();
        for (i,l) in adj_list.iter().enumerate() {
            for j in l {
                if i < *j {
                    res.push((i,*j));
                }
            }
        }
        res
    }

    /** constructor using an adjacency list.
    The relation is made symmetric and duplicates are removed.
    Self-loops are kept so that validation can report them.
    # Panics
- if a neighbor is not a vertex of the graph
    */
    pub fn new(adj_list:Vec<Vec<usize>>) -> Self {
        let n = adj_list.len();
        let mut sym = vec![Vec::new() ; n];
        for (u,l) in adj_list.iter().enumerate() {
            for v in l {
                assert!(*v < n, "vertex {} has neighbor {} out of range (n={})", u, v, n);
                sym[u].push(*v);
                if *v != u { sym[*v].push(u); }
            }
        }
        for l in sym.iter_mut() {
            l.sort_unstable();
            l.dedup();
        }
        let edges = Self::build_edges(&sym);
        Self { n, edges, adj_list:sym, adj_matrix:None }
    }

    /// constructor using an edge list
    pub fn from_edges(n:usize, edges:&[(VertexId,VertexId)]) -> Self {
        let mut adj_list = vec![Vec::new() ; n];
        for (u,v) in edges {
            adj_list[*u].push(*v);
        }
        Self::new(adj_list)
    }

    /// creates an instance from a DIMACS file
    pub fn from_file(filename:&str) -> Result<Self, InstanceError> {
        let (_,_,adj_list) = read_from_file(filename)?;
        Ok(Self::new(adj_list))
    }

    /// path 0 - 1 - ... - (n-1)
    pub fn path(n:usize) -> Self {
        let edges:Vec<(VertexId,VertexId)> = (1..n).map(|i| (i-1,i)).collect();
        Self::from_edges(n, &edges)
    }

    /// cycle on n vertices (n >= 3)
    pub fn cycle(n:usize) -> Self {
        let mut edges:Vec<(VertexId,VertexId)> = (1..n).map(|i| (i-1,i)).collect();
        if n >= 3 { edges.push((n-1, 0)); }
        Self::from_edges(n, &edges)
    }

    /// complete graph K_n
    pub fn complete(n:usize) -> Self {
        let adj_list = (0..n).map(|u| (0..n).filter(|v| *v != u).collect()).collect();
        Self::new(adj_list)
    }

    /// complete bipartite graph K_{a,b} (left side: 0..a)
    pub fn complete_bipartite(a:usize, b:usize) -> Self {
        let mut adj_list = vec![Vec::new() ; a+b];
        for l in adj_list.iter_mut().take(a) {
            *l = (a..a+b).collect();
        }
        Self::new(adj_list)
    }

    /// true iff the adjacency matrix has been computed
    pub fn has_adj_matrix(&self) -> bool { self.adj_matrix.is_some() }

    /// if called, populate the adj_matrix
    pub fn populate_adj_matrix(&mut self) {
        let mut res = vec![BitSet::default(); self.n];
        for (a,resa) in res.iter_mut().enumerate() {
            for b in &self.adj_list[a] {
                resa.insert(*b);
            }
        }
        self.adj_matrix = Some(res);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_instance() {
        let inst = Graph::from_file("insts/grid-instances/grid2x2").unwrap();
        assert_eq!(inst.nb_vertices(), 4);
        assert_eq!(inst.nb_edges(), 4);
        assert_eq!(inst.neighbors(0), &[1,2]);
    }

    #[test]
    fn test_symmetrize() {
        let mut inst = Graph::new(vec![vec![1, 1, 2], vec![], vec![2]]);
        assert_eq!(inst.neighbors(1), &[0]);
        assert_eq!(inst.neighbors(2), &[0, 2]);
        assert_eq!(inst.edges(), &[(0,1), (0,2)]);
        assert!(inst.are_adjacent(2, 0));
        inst.populate_adj_matrix();
        assert!(inst.has_adj_matrix());
        assert!(inst.are_adjacent(1, 0));
        assert!(!inst.are_adjacent(1, 2));
    }

    #[test]
    fn test_families() {
        assert_eq!(Graph::complete(5).nb_edges(), 10);
        assert_eq!(Graph::cycle(5).nb_edges(), 5);
        assert_eq!(Graph::path(5).nb_edges(), 4);
        assert_eq!(Graph::complete_bipartite(2, 3).nb_edges(), 6);
        assert_eq!(Graph::complete(4).max_degree(), 3);
        assert_eq!(Graph::new(vec![]).max_degree(), 0);
    }
}
