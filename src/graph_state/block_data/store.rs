use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use super::IndexedArticle;
use crate::error::{RankError, Result};

const TITLES_PREFIX: &str = "titles_block_";
const OUTLINKS_PREFIX: &str = "outlinks_block_";

/// On-disk home of the partitioned graph: per block, a CSV of (id, title)
/// rows and a line-delimited JSON file of outlink records. Any reversible
/// encoding would do; these two match the rest of the dump tooling.
pub struct BlockStore {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct OutlinkRecord {
    id: u32,
    outlinks: Vec<u32>,
}

impl BlockStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> BlockStore {
        BlockStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn titles_path(&self, block: u32) -> PathBuf {
        self.dir.join(format!("{}{}.csv", TITLES_PREFIX, block))
    }

    fn outlinks_path(&self, block: u32) -> PathBuf {
        self.dir.join(format!("{}{}.json", OUTLINKS_PREFIX, block))
    }

    /// Persist one partition. The store directory is created on first use.
    pub fn write(&self, block: u32, articles: &[IndexedArticle]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| RankError::io(e, &self.dir))?;

        let titles_path = self.titles_path(block);
        let mut titles = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&titles_path)?;
        for article in articles {
            titles.serialize((article.id, &article.title))?;
        }
        titles.flush().map_err(|e| RankError::io(e, &titles_path))?;

        let outlinks_path = self.outlinks_path(block);
        let file = File::create(&outlinks_path).map_err(|e| RankError::io(e, &outlinks_path))?;
        let mut writer = BufWriter::new(file);
        for article in articles {
            let record = OutlinkRecord {
                id: article.id,
                outlinks: article.outlinks.clone(),
            };
            serde_json::to_writer(&mut writer, &record)?;
            writer
                .write_all(b"\n")
                .map_err(|e| RankError::io(e, &outlinks_path))?;
        }
        writer
            .flush()
            .map_err(|e| RankError::io(e, &outlinks_path))?;
        Ok(())
    }

    /// Merge every persisted block back into full mappings. Block ranges are
    /// disjoint by construction, so numbering gaps and load order cannot
    /// change the result. A store that was never written reads back empty.
    pub fn load_all(&self) -> Result<(FnvHashMap<u32, String>, FnvHashMap<u32, Vec<u32>>)> {
        let mut titles = FnvHashMap::default();
        let mut outlinks = FnvHashMap::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok((titles, outlinks)),
            Err(e) => return Err(RankError::io(e, &self.dir)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| RankError::io(e, &self.dir))?;
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if name.starts_with(TITLES_PREFIX) && name.ends_with(".csv") {
                load_titles(&path, &mut titles)?;
            } else if name.starts_with(OUTLINKS_PREFIX) && name.ends_with(".json") {
                load_outlinks(&path, &mut outlinks)?;
            }
        }
        Ok((titles, outlinks))
    }
}

fn load_titles(path: &Path, into: &mut FnvHashMap<u32, String>) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in reader.deserialize() {
        let (id, title): (u32, String) = row?;
        into.insert(id, title);
    }
    Ok(())
}

fn load_outlinks(path: &Path, into: &mut FnvHashMap<u32, Vec<u32>>) -> Result<()> {
    let file = File::open(path).map_err(|e| RankError::io(e, path))?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| RankError::io(e, path))?;
        let record: OutlinkRecord = serde_json::from_str(&line)?;
        into.insert(record.id, record.outlinks);
    }
    Ok(())
}
