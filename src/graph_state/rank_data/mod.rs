use std::cmp::Ordering;
use std::path::Path;

use slog::{info, o, Logger};

use super::block_data::store::BlockStore;
use super::{GraphState, RankData};
use crate::error::{RankError, Result};

mod pagerank;

impl GraphState<RankData> {
    /// Reconstitute the full graph from the store and rank it. Ids are dense
    /// by construction, so the merged maps are laid back out as arenas
    /// indexed by id; a hole in the id range means the store is damaged.
    pub fn load(store: &BlockStore, log: Logger) -> Result<Self> {
        let (mut title_map, mut outlink_map) = store.load_all()?;
        let n = title_map.len();
        if outlink_map.len() != n {
            return Err(RankError::Corrupt(format!(
                "{} titles but {} outlink lists",
                n,
                outlink_map.len()
            )));
        }
        info!(log, "Loaded {} articles from {:?}", n, store.dir());

        let mut titles = Vec::with_capacity(n);
        let mut outlinks = Vec::with_capacity(n);
        for id in 0..n as u32 {
            let title = title_map.remove(&id).ok_or(RankError::MissingId(id))?;
            let links = outlink_map.remove(&id).ok_or(RankError::MissingId(id))?;
            titles.push(title);
            outlinks.push(links);
        }

        let pr_log = log.new(o!(
                "damping" => pagerank::DAMPING_FACTOR,
                "epsilon" => pagerank::MAX_ERROR));
        let ranks = pagerank::Graph::new(&outlinks)?.get_ranks(&pr_log)?;

        Ok(GraphState {
            size: n,
            log,
            state: RankData {
                titles,
                outlinks,
                ranks,
            },
        })
    }

    /// Scores paired with their titles, best first. The sort is stable, so
    /// equal scores keep their id order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut pairs: Vec<(usize, f64)> = self.state.ranks.iter().copied().enumerate().collect();
        pairs.sort_by(|&(a_i, a_r), &(b_i, b_r)| {
            // sort by floats descending, which Ord does not provide
            assert!(!a_r.is_nan(), "Page {} had a NaN rank", a_i);
            assert!(!b_r.is_nan(), "Page {} had a NaN rank", b_i);
            match (a_r > b_r, a_r == b_r) {
                (true, _) => Ordering::Less,
                (_, true) => Ordering::Equal,
                _ => Ordering::Greater,
            }
        });
        pairs
            .into_iter()
            .map(|(id, rank)| (self.state.titles[id].as_str(), rank))
            .collect()
    }

    /// Write one `title<TAB>score` line per article, best-ranked first.
    /// Titles go out verbatim, so the file is a plain TSV, not quoted CSV.
    pub fn write_ranked(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .from_path(path)?;
        for (title, rank) in self.ranked() {
            writer.serialize((title, rank))?;
        }
        writer.flush().map_err(|e| RankError::io(e, path))?;
        Ok(())
    }

    pub fn data(&self) {
        info!(self.log, "State of RankData:");
        info!(self.log, "Number of articles: {}", self.state.titles.len());
        let total_links: usize = self.state.outlinks.iter().map(Vec::len).sum();
        info!(self.log, "Number of outlinks: {}", total_links);
        let rank_sum: f64 = self.state.ranks.iter().sum();
        info!(self.log, "Sum of all ranks:   {}", rank_sum);
    }
}
