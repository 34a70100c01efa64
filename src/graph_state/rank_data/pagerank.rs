use std::mem;

use slog::{info, Logger};

use crate::error::{RankError, Result};

pub const DAMPING_FACTOR: f64 = 0.85;
pub const MAX_ERROR: f64 = 1e-3; // L2 distance between successive score vectors
pub const MAX_ITER: usize = 500; // safeguard only; convergence normally takes far fewer

/// Power iteration over the outlink arena.
///
/// Each round every article keeps the uniform teleport mass and receives the
/// damped score of its parents, split evenly over their outlinks. A page
/// with no outlinks passes nothing on; its mass is NOT spread over the
/// graph, so the total dips below one whenever such pages exist. That is
/// intentional and must not be "fixed" with dangling-mass redistribution.
pub struct Graph<'a> {
    outlinks: &'a [Vec<u32>],
    prev: Vec<f64>,
    curr: Vec<f64>,
}

impl<'a> Graph<'a> {
    pub fn new(outlinks: &'a [Vec<u32>]) -> Result<Graph<'a>> {
        let n = outlinks.len();
        if n == 0 {
            // the teleport mass would be 0/0
            return Err(RankError::EmptyGraph);
        }
        let guess = (n as f64).recip(); // start each score at 1/N
        Ok(Graph {
            outlinks,
            prev: vec![guess; n],
            curr: vec![0f64; n],
        })
    }

    pub fn get_ranks(mut self, log: &Logger) -> Result<Vec<f64>> {
        let iter = self.compute_ranks()?;
        info!(
            log,
            "Computed ranks with ε={} after {} iterations", MAX_ERROR, iter
        );
        info!(log, "Final sum is {}", self.sum());
        Ok(self.prev)
    }

    fn sum(&self) -> f64 {
        self.prev.iter().sum()
    }

    /// One refinement round; returns the L2 distance the scores moved.
    /// Afterwards `prev` holds the freshest scores and `curr` the stale
    /// ones, ready to be overwritten by the next round.
    fn iterate(&mut self) -> f64 {
        let teleport = (1.0 - DAMPING_FACTOR) / (self.outlinks.len() as f64);
        for score in self.curr.iter_mut() {
            *score = teleport;
        }
        for (id, targets) in self.outlinks.iter().enumerate() {
            if targets.is_empty() {
                continue;
            }
            let contribution = DAMPING_FACTOR * self.prev[id] / (targets.len() as f64);
            for &target in targets {
                self.curr[target as usize] += contribution;
            }
        }
        mem::swap(&mut self.prev, &mut self.curr);
        self.prev
            .iter()
            .zip(&self.curr)
            .map(|(new, old)| (new - old) * (new - old))
            .sum::<f64>()
            .sqrt()
    }

    fn compute_ranks(&mut self) -> Result<usize> {
        // run self.iterate() until the scores stop moving
        let mut iter = 0;
        loop {
            let delta = self.iterate();
            iter += 1;
            if delta < MAX_ERROR {
                return Ok(iter);
            }
            if iter >= MAX_ITER {
                return Err(RankError::Divergence(MAX_ITER));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::o;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    #[test]
    fn empty_graph_is_rejected() {
        let outlinks: Vec<Vec<u32>> = vec![];
        assert!(matches!(
            Graph::new(&outlinks),
            Err(RankError::EmptyGraph)
        ));
    }

    #[test]
    fn mutual_pair_beats_the_dangling_node() {
        // X <-> Y, Z links nowhere: Z should settle at the teleport floor
        // (1-d)/3 while X and Y share the rest symmetrically
        let outlinks: Vec<Vec<u32>> = vec![vec![1], vec![0], vec![]];
        let ranks = Graph::new(&outlinks).unwrap().get_ranks(&test_logger()).unwrap();

        let floor = (1.0 - DAMPING_FACTOR) / 3.0;
        assert!((ranks[2] - floor).abs() < 1e-9, "Z drifted off the floor");
        assert!((ranks[0] - ranks[1]).abs() < 1e-9, "X and Y lost symmetry");
        // x = floor + d*y at the fixed point, so x -> floor/(1-d) = 1/3
        assert!((ranks[0] - 1.0 / 3.0).abs() < 5e-3);
        assert!(ranks[0] > ranks[2]);
    }

    #[test]
    fn sum_is_conserved_without_dangling_nodes() {
        // a ring: every page has exactly one outlink, no mass leaks
        let outlinks: Vec<Vec<u32>> = vec![vec![1], vec![2], vec![3], vec![0]];
        let mut graph = Graph::new(&outlinks).unwrap();
        for _ in 0..10 {
            graph.iterate();
            assert!((graph.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn dangling_mass_is_deliberately_dropped() {
        let outlinks: Vec<Vec<u32>> = vec![vec![1], vec![]];
        let mut graph = Graph::new(&outlinks).unwrap();
        graph.iterate();
        // page 1 kept nothing flowing, so the total dips below 1
        assert!(graph.sum() < 1.0);
    }

    #[test]
    fn converged_scores_are_a_fixed_point() {
        let outlinks: Vec<Vec<u32>> = vec![vec![1, 2], vec![0], vec![0, 1]];
        let mut graph = Graph::new(&outlinks).unwrap();
        graph.compute_ranks().unwrap();
        // one more round barely moves anything
        assert!(graph.iterate() < MAX_ERROR);
    }

    #[test]
    fn uniform_start_converges_quickly_on_a_ring() {
        // the uniform vector is already stationary for a ring
        let outlinks: Vec<Vec<u32>> = vec![vec![1], vec![2], vec![0]];
        let mut graph = Graph::new(&outlinks).unwrap();
        let iters = graph.compute_ranks().unwrap();
        assert_eq!(iters, 1);
    }

    #[test]
    fn duplicate_outlinks_weigh_double() {
        // page 0 names page 1 twice and page 2 once: 1 gets 2/3 of the flow
        let outlinks: Vec<Vec<u32>> = vec![vec![1, 1, 2], vec![], vec![]];
        let mut graph = Graph::new(&outlinks).unwrap();
        graph.iterate();
        let teleport = (1.0 - DAMPING_FACTOR) / 3.0;
        let flow = DAMPING_FACTOR * (1.0 / 3.0);
        assert!((graph.prev[1] - (teleport + flow * 2.0 / 3.0)).abs() < 1e-12);
        assert!((graph.prev[2] - (teleport + flow / 3.0)).abs() < 1e-12);
    }
}
