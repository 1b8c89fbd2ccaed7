//! Bit-parallel scan kernels (Baeza-Yates/Gonnet/Manber, the agrep family).
//!
//! The automaton state is one 64-bit register per error level: bit `i` set
//! means "the first `i + 1` pattern positions have been consumed". Each text
//! symbol shifts the register up and re-arms the start state through the
//! injected low bit; a hit fires when bit `patlen - 1` becomes set. The
//! per-symbol transition column is `smat[ordinal]`.

use crate::error::{ApatError, Result};
use crate::pattern::Pattern;
use crate::seq::ApatSeq;

fn scan_checks(seq: &ApatSeq, pat: &Pattern, begin: usize) -> Result<()> {
    if !pat.ok {
        return Err(ApatError::PatternNotReady);
    }
    if begin >= seq.data.len() {
        return Err(ApatError::RangeInvalid {
            begin,
            end: seq.data.len(),
        });
    }
    Ok(())
}

/// Exact scan. Hits are pushed as (start offset, 0).
pub fn manber_no_err(
    seq: &mut ApatSeq,
    pat: &Pattern,
    begin: usize,
    length: usize,
) -> Result<usize> {
    scan_checks(seq, pat, begin)?;
    let end = (begin + length).min(seq.data.len());
    let hibit = 1u64 << (pat.patlen - 1);

    seq.hitpos.clear();
    seq.hiterr.clear();

    let mut r = 0u64;
    for pos in begin..end {
        r = ((r << 1) | 1) & pat.smat[seq.data[pos] as usize];
        if r & hibit != 0 {
            seq.hitpos.push(pos as i32 - pat.patlen as i32 + 1);
            seq.hiterr.push(0);
        }
    }

    Ok(seq.hitpos.len())
}

/// Substitution-only scan with up to `pat.maxerr` errors. Per text position
/// at most one hit is reported, with the smallest achievable error count;
/// obligatory positions never absorb a substitution.
pub fn manber_sub(seq: &mut ApatSeq, pat: &Pattern, begin: usize, length: usize) -> Result<usize> {
    scan_checks(seq, pat, begin)?;
    let end = (begin + length).min(seq.data.len());
    let emax = pat.maxerr as usize;
    let hibit = 1u64 << (pat.patlen - 1);
    let cmask = !pat.omask;

    seq.hitpos.clear();
    seq.hiterr.clear();

    let mut prev = vec![0u64; emax + 1];
    let mut curr = vec![0u64; emax + 1];

    for pos in begin..end {
        let sindx = pat.smat[seq.data[pos] as usize];
        let mut found = false;
        for e in 0..=emax {
            let ident = ((prev[e] << 1) | 1) & sindx;
            curr[e] = if e == 0 {
                ident
            } else {
                ident | (((prev[e - 1] << 1) | 1) & cmask)
            };
            if curr[e] & hibit != 0 && !found {
                seq.hitpos.push(pos as i32 - pat.patlen as i32 + 1);
                seq.hiterr.push(e as i32);
                found = true;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(seq.hitpos.len())
}

/// Substitution + indel scan. Error levels are seeded so the first `e`
/// pattern positions may be consumed before any text is read; because an
/// indel shifts the accepting point, reported start offsets are approximate
/// (possibly negative) and are refined by the boundary aligner. This kernel
/// appends to the hit stacks without clearing them.
pub fn manber_indel(
    seq: &mut ApatSeq,
    pat: &Pattern,
    begin: usize,
    length: usize,
) -> Result<usize> {
    scan_checks(seq, pat, begin)?;
    let end = (begin + length).min(seq.data.len());
    let emax = pat.maxerr as usize;
    let hibit = 1u64 << (pat.patlen - 1);
    let cmask = !pat.omask;

    let mut prev: Vec<u64> = (0..=emax)
        .map(|e| if e >= 64 { u64::MAX } else { (1u64 << e) - 1 })
        .collect();
    let mut curr = vec![0u64; emax + 1];

    for pos in begin..end {
        let sindx = pat.smat[seq.data[pos] as usize];
        let mut found = false;
        for e in 0..=emax {
            let ident = ((prev[e] << 1) | 1) & sindx;
            curr[e] = if e == 0 {
                ident
            } else {
                let ins = prev[e - 1];
                let sub = (prev[e - 1] << 1) | 1;
                // a fresh start only feeds the deletion term once the level
                // below it carries the start state itself
                let del = (curr[e - 1] << 1) | u64::from(e >= 2);
                ident | ((ins | sub | del) & cmask)
            };
            if curr[e] & hibit != 0 && !found {
                seq.hitpos.push(pos as i32 - pat.patlen as i32 + 1);
                seq.hiterr.push(e as i32);
                found = true;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(seq.hitpos.len())
}

/// Kernel dispatch: exact when no error is allowed, indel when the pattern
/// allows them, substitution-only otherwise.
pub fn manber_all(seq: &mut ApatSeq, pat: &Pattern, begin: usize, length: usize) -> Result<usize> {
    if pat.maxerr == 0 {
        manber_no_err(seq, pat, begin, length)
    } else if pat.has_indel {
        manber_indel(seq, pat, begin, length)
    } else {
        manber_sub(seq, pat, begin, length)
    }
}
