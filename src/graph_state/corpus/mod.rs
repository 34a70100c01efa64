use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::PathBuf;
use std::slice;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{RankError, Result};

mod regexes;

// Parsing Note:
//  Dump lines are not guaranteed to be valid utf8, so we read raw bytes and
//  convert with String::from_utf8_lossy before matching. A line that matches
//  no pattern simply contributes nothing; there is no parse-error case.

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(&regexes::title_regex()).unwrap();
    static ref REDIRECT_RE: Regex = Regex::new(&regexes::redirect_regex()).unwrap();
    static ref PAGE_END_RE: Regex = Regex::new(&regexes::page_end_regex()).unwrap();
    static ref LINK_RE: Regex = Regex::new(&regexes::link_regex()).unwrap();
}

/// Uppercase the first character only. Dump titles always lead with a
/// capital, so link targets need the same fix before they can resolve.
pub fn normalize_title(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything the scan accumulated for one page by the time it closed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub title: String,
    pub redirect: bool,
    /// Normalized candidate link targets, in order of appearance.
    /// Unresolvable ones are dropped later, at lookup time.
    pub targets: Vec<String>,
}

impl RawPage {
    pub fn is_eligible(&self) -> bool {
        self.redirect == false && !self.title.is_empty()
    }
}

/// Line-driven page accumulator. Feed it lines; it hands back a finished
/// RawPage whenever a closing marker goes by.
#[derive(Default)]
struct Scanner {
    open: RawPage,
}

impl Scanner {
    fn feed(&mut self, line: &str) -> Option<RawPage> {
        // the closing marker is handled before anything else on the line, so
        // content sharing a line with `</page>` belongs to the next page
        let closed = if PAGE_END_RE.is_match(line) {
            Some(mem::take(&mut self.open))
        } else {
            None
        };
        if let Some(caps) = TITLE_RE.captures(line) {
            self.open.title = normalize_title(&caps[1]);
        }
        if REDIRECT_RE.is_match(line) {
            self.open.redirect = true;
        }
        for caps in LINK_RE.captures_iter(line) {
            let span = &caps[1];
            let target = span.split('|').next().unwrap_or("");
            if target.is_empty() {
                continue;
            }
            self.open.targets.push(normalize_title(target));
        }
        closed
    }
}

/// The ordered list of dump files making up one corpus.
///
/// The order fixed at construction is the canonical global order. Both
/// build passes walk the same cursor with the same scanner, so they see
/// pages in the same sequence and agree on every id they assign.
#[derive(Debug, Clone)]
pub struct Corpus {
    files: Vec<PathBuf>,
}

impl Corpus {
    pub fn new(files: Vec<PathBuf>) -> Corpus {
        Corpus { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stream every page record in the corpus, in canonical order.
    pub fn pages(&self) -> Pages {
        Pages {
            files: self.files.iter(),
            current: None,
            buffer: Vec::with_capacity(4096),
            scanner: Scanner::default(),
        }
    }
}

/// Iterator over page records; I/O failures surface as errors and any page
/// still open when the last file runs out is discarded, never emitted.
pub struct Pages<'a> {
    files: slice::Iter<'a, PathBuf>,
    current: Option<(PathBuf, BufReader<File>)>,
    buffer: Vec<u8>,
    scanner: Scanner,
}

impl<'a> Iterator for Pages<'a> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let path = self.files.next()?;
                let file = match File::open(path) {
                    Ok(f) => f,
                    Err(e) => return Some(Err(RankError::io(e, path))),
                };
                self.current = Some((path.clone(), BufReader::new(file)));
            }
            // a page can straddle a file boundary; the scanner state carries over
            let (path, reader) = match self.current {
                Some(ref mut c) => (&c.0, &mut c.1),
                None => unreachable!(),
            };
            self.buffer.clear();
            let len = match reader.read_until(b'\n', &mut self.buffer) {
                Ok(len) => len,
                Err(e) => return Some(Err(RankError::io(e, path.clone()))),
            };
            if len == 0 {
                self.current = None;
                continue;
            }
            let line: Cow<str> = String::from_utf8_lossy(&self.buffer);
            if let Some(page) = self.scanner.feed(&line) {
                return Some(Ok(page));
            }
        }
    }
}
