//! Boundary recovery for indel hits: a small Needleman-Wunsch over the
//! window around a hit, reporting every endpoint whose edit distance to the
//! pattern stays within the error budget.

use crate::error::{ApatError, Result};
use crate::pattern::Pattern;
use crate::seq::ApatSeq;

/// Edit-operation tags carried in the top two bits of a 64-bit cell.
pub const OPER_IDT: u64 = 0x0000_0000_0000_0000;
pub const OPER_INS: u64 = 0x4000_0000_0000_0000;
pub const OPER_DEL: u64 = 0x8000_0000_0000_0000;
pub const OPER_SUB: u64 = 0xc000_0000_0000_0000;

/// Mask selecting the operation tag of a cell.
pub const OPER_MASK: u64 = 0xc000_0000_0000_0000;
/// Mask selecting the cost of a cell.
pub const NOPER_MASK: u64 = 0x3fff_ffff_ffff_ffff;

#[inline]
fn cost(cell: u64) -> u64 {
    cell & NOPER_MASK
}

/// Aligns the pattern against the window `[begin, begin + length)` of the
/// encoded sequence with unit edit costs, both edges anchored at the window
/// start. Returns (end offset, error count) for every window prefix whose
/// distance to the pattern is at most `nerr`, rightmost first.
pub fn nws_pat_align(
    seq: &ApatSeq,
    pat: &Pattern,
    nerr: u32,
    begin: usize,
    length: usize,
) -> Result<Vec<(usize, u32)>> {
    if !pat.ok {
        return Err(ApatError::PatternNotReady);
    }
    if begin >= seq.data.len() {
        return Err(ApatError::RangeInvalid {
            begin,
            end: seq.data.len(),
        });
    }

    let lseq = length.min(seq.data.len() - begin);
    let lpat = pat.patlen;
    let width = lseq + 1;
    let mut tab = vec![0u64; (lpat + 1) * width];

    for j in 0..=lpat {
        // bit of pattern position j - 1
        let amask = if j > 0 { 1u64 << (j - 1) } else { 0 };
        for i in 0..=lseq {
            let idx = j * width + i;
            tab[idx] = if i > 0 && j > 0 {
                let ins = cost(tab[idx - 1]) + 1;
                let del = cost(tab[idx - width]) + 1;
                let diag = tab[idx - width - 1];
                let matched = pat.smat[seq.data[begin + i - 1] as usize] & amask != 0;
                let dsub = cost(diag) + u64::from(!matched);
                let dindel = ins.min(del);
                if dsub <= dindel {
                    dsub | if matched { OPER_IDT } else { OPER_SUB }
                } else if ins <= del {
                    dindel | OPER_INS
                } else {
                    dindel | OPER_DEL
                }
            } else if i > 0 {
                (i as u64) | OPER_INS
            } else if j > 0 {
                (j as u64) | OPER_DEL
            } else {
                0
            };
        }
    }

    let mut out = Vec::new();
    let last_row = lpat * width;
    for i in (0..=lseq).rev() {
        let c = cost(tab[last_row + i]);
        if c <= nerr as u64 {
            out.push((begin + i, c as u32));
        }
    }
    Ok(out)
}
