//! Pattern file intake. One pattern per non-comment line, as
//! `<pattern> <whitespace> <signed-int>`: a negative count allows indels
//! with that many errors, a non-negative one allows substitutions only.
//! Lines starting with `/` are comments; blank lines are skipped. Files may
//! be gzip-compressed.

use crate::codes::Encoding;
use crate::error::{ApatError, Result};
use crate::pattern::Pattern;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek};
use std::path::Path;

pub const BUFSIZE: usize = 8 * 1024;

fn is_gzipped(file: &mut File) -> io::Result<bool> {
    let mut buffer = [0; 2];
    let n = file.read(&mut buffer)?;
    file.rewind()?;
    Ok(n == 2 && buffer == [0x1f, 0x8b])
}

fn open_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    File::open(&path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            io::Error::new(e.kind(), format!("File not found: {:?}", path.as_ref()))
        } else {
            e
        }
    })
}

/// Opens a pattern file, transparently decoding gzip (detected by the magic
/// bytes, not the file name).
pub fn open_pattern_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let mut file = open_file(path)?;
    if is_gzipped(&mut file)? {
        Ok(Box::new(BufReader::with_capacity(
            BUFSIZE,
            GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(BUFSIZE, file)))
    }
}

pub struct PatternReader<R: BufRead> {
    reader: R,
    encoding: Encoding,
    line: String,
}

impl<R: BufRead> PatternReader<R> {
    pub fn new(reader: R, encoding: Encoding) -> Self {
        Self {
            reader,
            encoding,
            line: String::new(),
        }
    }

    /// Reads the next pattern line, skipping comments and blanks.
    /// `Ok(None)` at end of input.
    pub fn next_pattern(&mut self) -> Result<Option<Pattern>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim();
            if line.is_empty() || line.starts_with('/') {
                continue;
            }

            let (pat, rest) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| ApatError::PatternSyntax(line.to_string()))?;
            let val: i64 = rest
                .split_whitespace()
                .next()
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(|| ApatError::PatternSyntax(line.to_string()))?;

            let has_indel = val < 0;
            let maxerr = val.unsigned_abs().min(u32::MAX as u64) as u32;
            return Pattern::build(pat, maxerr, has_indel, self.encoding).map(Some);
        }
    }
}

impl PatternReader<Box<dyn BufRead + Send>> {
    pub fn from_path<P: AsRef<Path>>(path: P, encoding: Encoding) -> Result<Self> {
        Ok(Self::new(open_pattern_file(path)?, encoding))
    }
}

impl<R: BufRead> Iterator for PatternReader<R> {
    type Item = Result<Pattern>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_pattern() {
            Ok(Some(pat)) => Some(Ok(pat)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
