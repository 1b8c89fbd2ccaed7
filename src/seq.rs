//! Sequence intake: raw text buffers become indexable arrays of alphabet
//! ordinals that the scan kernels walk directly.

use crate::codes::MAX_PAT_LEN;
use crate::error::{ApatError, Result};
use crate::stacki::Stacki;

/// Maps one input byte to its alphabet ordinal. Case is folded; anything
/// outside `A..=Z` collapses to ordinal 0, whose symbol column is empty for
/// every pattern position that does not explicitly include `A`.
#[inline]
fn encode_byte(byte: u8) -> u8 {
    let up = byte & 0x5f;
    if up.is_ascii_uppercase() {
        up - b'A'
    } else {
        0
    }
}

/// An encoded sequence plus the two hit stacks a scan fills in.
///
/// The buffers are reused across re-encodes, so one `ApatSeq` per thread can
/// serve a whole campaign of input sequences.
#[derive(Debug, Default)]
pub struct ApatSeq {
    /// Input length, without the circular pad.
    pub seqlen: usize,
    /// Circular pad length; 0 for linear sequences.
    pub circular: usize,
    /// `seqlen + circular` alphabet ordinals.
    pub data: Vec<u8>,
    /// Hit start offsets, in scan order.
    pub hitpos: Stacki,
    /// Edit counts, parallel to `hitpos`.
    pub hiterr: Stacki,
}

impl ApatSeq {
    pub fn new(text: &[u8], circular: bool) -> Self {
        let mut seq = ApatSeq::default();
        seq.encode(text, circular);
        seq
    }

    /// (Re-)encodes `text` into this sequence. A circular sequence gets a
    /// wrap-around suffix copy of its prefix so seam windows are reached by
    /// a plain linear scan. Both hit stacks are emptied.
    pub fn encode(&mut self, text: &[u8], circular: bool) {
        let pad = if circular {
            MAX_PAT_LEN.min(text.len())
        } else {
            0
        };
        self.seqlen = text.len();
        self.circular = pad;

        self.data.clear();
        self.data.reserve(text.len() + pad);
        self.data.extend(text.iter().map(|&b| encode_byte(b)));
        self.data.extend(text[..pad].iter().map(|&b| encode_byte(b)));

        self.hitpos.clear();
        self.hiterr.clear();
    }

    /// Encoded length, circular pad included.
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Hits recorded by the last scan, as (start offset, error count).
    pub fn hits(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.hitpos
            .as_slice()
            .iter()
            .copied()
            .zip(self.hiterr.as_slice().iter().copied())
    }
}

/// Extracts `[begin, end)` from a raw sequence text; when `begin >= end`
/// the range wraps around the origin.
pub fn sub_sequence(seq: &[u8], begin: usize, end: usize) -> Result<Vec<u8>> {
    if begin > seq.len() || end > seq.len() {
        return Err(ApatError::RangeInvalid {
            begin: begin.max(end),
            end: seq.len(),
        });
    }
    if begin < end {
        Ok(seq[begin..end].to_vec())
    } else {
        let mut out = Vec::with_capacity(seq.len() - begin + end);
        out.extend_from_slice(&seq[begin..]);
        out.extend_from_slice(&seq[..end]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ordinals() {
        let seq = ApatSeq::new(b"ACGTacgt", false);
        assert_eq!(seq.data, vec![0, 2, 6, 19, 0, 2, 6, 19]);
        assert_eq!(seq.seqlen, 8);
        assert_eq!(seq.circular, 0);
    }

    #[test]
    fn test_non_letters_collapse_to_zero() {
        let seq = ApatSeq::new(b"A-C 9T\n", false);
        assert_eq!(seq.data, vec![0, 0, 2, 0, 0, 19, 0]);
    }

    #[test]
    fn test_circular_pad_copies_prefix() {
        let seq = ApatSeq::new(b"ACGNNTA", true);
        assert_eq!(seq.seqlen, 7);
        assert_eq!(seq.circular, 7);
        assert_eq!(seq.data.len(), 14);
        assert_eq!(&seq.data[7..], &seq.data[..7]);
    }

    #[test]
    fn test_long_circular_pad_is_bounded() {
        let text = vec![b'A'; 200];
        let seq = ApatSeq::new(&text, true);
        assert_eq!(seq.circular, MAX_PAT_LEN);
        assert_eq!(seq.data.len(), 200 + MAX_PAT_LEN);
    }

    #[test]
    fn test_reencode_clears_hits() {
        let mut seq = ApatSeq::new(b"ACGT", false);
        seq.hitpos.push(3);
        seq.hiterr.push(1);
        seq.encode(b"TTTT", false);
        assert!(seq.hitpos.is_empty());
        assert!(seq.hiterr.is_empty());
        assert_eq!(seq.data, vec![19, 19, 19, 19]);
    }

    #[test]
    fn test_sub_sequence() {
        assert_eq!(sub_sequence(b"ACGTACGT", 2, 6).unwrap(), b"GTAC");
        // wrapping extraction
        assert_eq!(sub_sequence(b"ACGTACGT", 6, 2).unwrap(), b"GTAC");
        assert_eq!(sub_sequence(b"ACGT", 0, 4).unwrap(), b"ACGT");
        assert!(sub_sequence(b"ACGT", 0, 5).is_err());
        assert!(sub_sequence(b"ACGT", 9, 2).is_err());
    }
}
