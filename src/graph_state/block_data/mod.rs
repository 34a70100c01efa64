use serde::{Deserialize, Serialize};
use slog::{info, o, Logger};

use self::store::BlockStore;
use super::{BlockData, GraphState, TitleIndex};
use crate::error::Result;

pub mod store;

/// One article as the extractor emits it and the store persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedArticle {
    pub id: u32,
    pub title: String,
    pub outlinks: Vec<u32>,
}

impl GraphState<TitleIndex> {
    /// Second corpus pass: re-walk the same cursor, resolve every candidate
    /// link target against the title index, and stream the results into the
    /// store one bounded partition at a time.
    ///
    /// Targets missing from the index are dropped without comment; they
    /// point at redirects, other namespaces, or nothing at all. Duplicate
    /// resolutions are kept in order of appearance.
    pub fn extract_links(
        self,
        store: &BlockStore,
        capacity: usize,
    ) -> Result<GraphState<BlockData>> {
        assert!(capacity > 0, "block capacity must be positive");
        let ex_log = self.log.new(o!("capacity" => capacity));

        let mut buffer: Vec<IndexedArticle> = Vec::new();
        let mut next_id = 0u32;
        let mut block_no = 1u32;

        for page in self.state.corpus.pages() {
            let page = page?;
            if !page.is_eligible() {
                continue;
            }
            let outlinks: Vec<u32> = page
                .targets
                .iter()
                .filter_map(|target| self.state.titles.get(target).copied())
                .collect();
            buffer.push(IndexedArticle {
                id: next_id,
                title: page.title,
                outlinks,
            });
            next_id += 1;
            if next_id as usize % capacity == 0 {
                flush(store, block_no, &mut buffer, capacity, &ex_log)?;
                block_no += 1;
            }
        }
        if !buffer.is_empty() {
            flush(store, block_no, &mut buffer, capacity, &ex_log)?;
            block_no += 1;
        }

        // both passes ran the same cursor and the same eligibility rule, so
        // their id counters must land on the same value
        assert_eq!(
            next_id as usize, self.size,
            "extractor and indexer disagree on the article count"
        );

        let blocks = block_no - 1;
        info!(ex_log, "Wrote {} articles into {} blocks", next_id, blocks);
        Ok(GraphState {
            size: self.size,
            log: self.log,
            state: BlockData { blocks },
        })
    }
}

impl GraphState<BlockData> {
    pub fn blocks(&self) -> u32 {
        self.state.blocks
    }
}

fn flush(
    store: &BlockStore,
    block_no: u32,
    buffer: &mut Vec<IndexedArticle>,
    capacity: usize,
    log: &Logger,
) -> Result<()> {
    // the buffered slice must be exactly the next contiguous id range
    let first = (block_no as usize - 1) * capacity;
    assert_eq!(
        buffer.first().map(|a| a.id as usize),
        Some(first),
        "block {} does not start at id {}",
        block_no,
        first
    );
    assert!(
        buffer.len() <= capacity,
        "block {} overflows its capacity",
        block_no
    );
    store.write(block_no, buffer)?;
    info!(log, "Flushed block {} ({} articles)", block_no, buffer.len());
    buffer.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_state::{Corpus, DuplicatePolicy};
    use slog::Discard;
    use std::fs;
    use tempfile::TempDir;

    fn test_logger() -> Logger {
        Logger::root(Discard, o!())
    }

    fn run_passes(body: &str, capacity: usize) -> (TempDir, GraphState<BlockData>, BlockStore) {
        let dir = TempDir::new().unwrap();
        let dump = dir.path().join("dump-1.txt");
        fs::write(&dump, body).unwrap();
        let corpus = Corpus::new(vec![dump]);
        let store = BlockStore::new(dir.path().join("blocks"));
        let index =
            GraphState::<TitleIndex>::new(corpus, DuplicatePolicy::KeepLast, test_logger())
                .unwrap();
        let data = index.extract_links(&store, capacity).unwrap();
        (dir, data, store)
    }

    fn page(title: &str, body: &str) -> String {
        format!("<title>{}</title>\n{}\n</page>\n", title, body)
    }

    #[test]
    fn resolves_links_against_the_index() {
        let body = [
            page("Apple", "[[banana]] [[Missing]] [[Category:Fruit]]"),
            page("Banana", "[[apple]] [[apple]]"),
            page("Cherry", ""),
        ]
        .concat();
        let (_dir, data, store) = run_passes(&body, 100);
        assert_eq!(data.size(), 3);
        assert_eq!(data.blocks(), 1);

        let (titles, outlinks) = store.load_all().unwrap();
        assert_eq!(titles[&0], "Apple");
        assert_eq!(titles[&1], "Banana");
        assert_eq!(titles[&2], "Cherry");
        // unresolvable and namespaced targets vanish; duplicates stay
        assert_eq!(outlinks[&0], vec![1]);
        assert_eq!(outlinks[&1], vec![0, 0]);
        assert_eq!(outlinks[&2], Vec::<u32>::new());
    }

    #[test]
    fn outlink_ids_stay_in_range() {
        let body = [
            page("A", "[[b]] [[c]]"),
            page("B", "[[c]] [[a]]"),
            page("C", "[[a]]"),
        ]
        .concat();
        let (_dir, data, store) = run_passes(&body, 2);
        let (_, outlinks) = store.load_all().unwrap();
        for links in outlinks.values() {
            for &id in links {
                assert!((id as usize) < data.size());
            }
        }
    }

    #[test]
    fn flushes_at_capacity_with_a_final_partial_block() {
        let body = [
            page("A", ""),
            page("B", ""),
            page("C", ""),
            page("D", ""),
            page("E", ""),
        ]
        .concat();
        let (_dir, data, store) = run_passes(&body, 2);
        assert_eq!(data.blocks(), 3);

        let (titles, outlinks) = store.load_all().unwrap();
        assert_eq!(titles.len(), 5);
        assert_eq!(outlinks.len(), 5);
    }

    #[test]
    fn exact_multiple_writes_no_trailing_block() {
        let body = [page("A", ""), page("B", ""), page("C", ""), page("D", "")].concat();
        let (_dir, data, store) = run_passes(&body, 2);
        assert_eq!(data.blocks(), 2);
        let (titles, _) = store.load_all().unwrap();
        assert_eq!(titles.len(), 4);
    }

    #[test]
    fn ineligible_pages_contribute_nothing() {
        let body = [
            page("A", "[[b]]"),
            "<title>Redir</title>\n<redirect title=\"A\"/>\n[[b]]\n</page>\n".to_string(),
            page("B", ""),
        ]
        .concat();
        let (_dir, data, store) = run_passes(&body, 100);
        assert_eq!(data.size(), 2);
        let (titles, outlinks) = store.load_all().unwrap();
        assert_eq!(titles[&1], "B");
        // the redirect's accumulated links were discarded with it
        assert_eq!(outlinks.values().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn empty_corpus_writes_no_blocks() {
        let (_dir, data, store) = run_passes("", 2);
        assert_eq!(data.blocks(), 0);
        let (titles, outlinks) = store.load_all().unwrap();
        assert!(titles.is_empty());
        assert!(outlinks.is_empty());
    }
}
