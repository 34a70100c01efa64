use fnv::FnvHashMap;
use slog::{info, o, Logger};

use super::{Corpus, DuplicatePolicy, GraphState, TitleIndex};
use crate::error::Result;

impl GraphState<TitleIndex> {
    /// First corpus pass: walk the cursor once and hand the next sequential
    /// id to every eligible page, starting at 0.
    pub fn new(corpus: Corpus, policy: DuplicatePolicy, log: Logger) -> Result<Self> {
        let idx_log = log.new(o!("files" => corpus.len()));
        let mut titles: FnvHashMap<String, u32> = FnvHashMap::default();
        let mut next_id = 0u32;

        for page in corpus.pages() {
            let page = page?;
            if !page.is_eligible() {
                continue;
            }
            match policy {
                DuplicatePolicy::KeepLast => {
                    titles.insert(page.title, next_id);
                }
                DuplicatePolicy::KeepFirst => {
                    titles.entry(page.title).or_insert(next_id);
                }
            }
            next_id += 1;
        }

        info!(idx_log, "Indexed {} titles across {} ids", titles.len(), next_id);
        Ok(GraphState {
            size: next_id as usize,
            log,
            state: TitleIndex { titles, corpus },
        })
    }

    pub fn lookup(&self, title: &str) -> Option<u32> {
        self.state.titles.get(title).copied()
    }
}
