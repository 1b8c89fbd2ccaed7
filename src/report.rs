//! Machine-readable scan results: one report per (pattern, sequence)
//! campaign, writable as JSON or as tab-separated lines.

use crate::pattern::Pattern;
use crate::seq::ApatSeq;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Longest sequence name carried into a report.
pub const MAX_NAME_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Start offset; approximate (possibly negative) for indel scans.
    pub pos: i32,
    /// Edit count.
    pub err: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub name: String,
    pub pattern: String,
    pub maxerr: u32,
    pub has_indel: bool,
    pub seqlen: usize,
    pub circular: bool,
    pub hits: Vec<Hit>,
}

impl ScanReport {
    /// Collects the hits left on `seq` by the last scan of `pat`.
    pub fn from_scan(name: &str, pat: &Pattern, seq: &ApatSeq) -> Self {
        let mut name = name.to_string();
        // cap at the largest char boundary within the limit
        let mut cap = MAX_NAME_LEN.min(name.len());
        while !name.is_char_boundary(cap) {
            cap -= 1;
        }
        name.truncate(cap);
        ScanReport {
            name,
            pattern: pat.cpat.clone(),
            maxerr: pat.maxerr,
            has_indel: pat.has_indel,
            seqlen: seq.seqlen,
            circular: seq.circular > 0,
            hits: seq.hits().map(|(pos, err)| Hit { pos, err }).collect(),
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    /// One line per hit: `name pattern pos err`, tab-separated.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for hit in &self.hits {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                self.name, self.pattern, hit.pos, hit.err
            )?;
        }
        Ok(())
    }
}
