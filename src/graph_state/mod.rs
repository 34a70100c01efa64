use std::sync::Mutex;

use fnv::FnvHashMap;
use slog::{o, Drain, Logger};

pub mod block_data;
pub mod corpus;
pub mod rank_data;
pub mod title_index;

pub use self::block_data::store::BlockStore;
pub use self::block_data::IndexedArticle;
pub use self::corpus::Corpus;

/// Articles per block partition; the extractor's working set never grows
/// past one partition regardless of corpus size.
pub const MAX_SIZE: usize = 100_000;

//  ------STATE--MACHINE------

pub trait State {}
impl State for TitleIndex {}
impl State for BlockData {}
impl State for RankData {}

/// The pipeline, one typed stage at a time: index titles, extract links
/// into the block store, load the store and rank.
pub struct GraphState<S: State> {
    size: usize, // ids assigned so far; dense, no gaps, no reuse
    log: Logger, // root logger that is split off for components
    state: S,
}

impl<S: State> GraphState<S> {
    pub fn size(&self) -> usize {
        self.size
    }
}

pub fn new_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = Mutex::new(drain).fuse();
    Logger::root(drain, o!())
}

//  ----------STATES----------

pub struct TitleIndex {
    /// First-pass output: title -> id over every eligible article,
    /// plus the cursor the second pass must re-walk.
    titles: FnvHashMap<String, u32>,
    corpus: Corpus,
}

pub struct BlockData {
    /// The graph now lives in the store as numbered partitions.
    blocks: u32,
}

pub struct RankData {
    /// The full graph reconstituted into dense arenas indexed by id,
    /// and one converged score per article.
    titles: Vec<String>,
    outlinks: Vec<Vec<u32>>,
    ranks: Vec<f64>,
}

// ------COMMON-OBJECTS------

/// What to do when two eligible pages carry the same title. Either way the
/// later page still consumes an id; only the title lookup differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    KeepFirst,
    KeepLast,
}
