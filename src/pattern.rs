//! Pattern mini-language compiler.
//!
//! A pattern is a run of positions, each a letter or a `[..]` class,
//! optionally negated with a `!` prefix and made obligatory with a `#`
//! suffix. Compilation checks the syntax, encodes each position as a 26-bit
//! symbol set, then folds the positions into the per-symbol table `smat`
//! used by the scan kernels: bit `i` of `smat[c]` is set iff symbol `c` may
//! occupy position `i` (bit 0 = first position). `omask` carries the
//! obligatory bits in the same layout.

use crate::codes::{Encoding, ALPHA_LEN, MAX_PAT_ERR, MAX_PAT_LEN, OBLIBIT, PATMASK};
use crate::complement::complement_pattern;
use crate::error::{ApatError, Result};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Pattern {
    /// Number of positions.
    pub patlen: usize,
    /// Maximum number of edits a scan may spend.
    pub maxerr: u32,
    /// Uppercased textual form the pattern was compiled from.
    pub cpat: String,
    /// Per-position 26-bit symbol sets, OBLIBIT tagged.
    pub patcode: Vec<u32>,
    /// Per-symbol position masks.
    pub smat: [u64; ALPHA_LEN],
    /// Obligatory position mask.
    pub omask: u64,
    /// Whether edits may be indels or only substitutions.
    pub has_indel: bool,
    /// Set only once every compilation pass has succeeded.
    pub ok: bool,
    encoding: Encoding,
}

impl Pattern {
    /// Compiles `pat` with at most `maxerr` edits (`maxerr` is clamped to
    /// the engine limit). Whitespace is stripped and letters uppercased
    /// before compilation.
    pub fn build(pat: &str, maxerr: u32, has_indel: bool, encoding: Encoding) -> Result<Self> {
        let cpat: String = pat
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let mut pattern = Pattern {
            patlen: 0,
            maxerr: maxerr.min(MAX_PAT_ERR as u32),
            cpat,
            patcode: Vec::new(),
            smat: [0; ALPHA_LEN],
            omask: 0,
            has_indel,
            ok: false,
            encoding,
        };

        check_pattern(&pattern.cpat)?;
        pattern.patcode = encode_pattern(&pattern.cpat, encoding)?;
        pattern.patlen = pattern.patcode.len();
        let (smat, omask) = create_s(&pattern.patcode);
        pattern.smat = smat;
        pattern.omask = omask;
        pattern.ok = true;
        Ok(pattern)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Reverse-complement pattern, recompiled from the complemented text
    /// with the same error budget and encoding.
    pub fn complement(&self) -> Result<Pattern> {
        let cpat = complement_pattern(&self.cpat)?;
        Pattern::build(&cpat, self.maxerr, self.has_indel, self.encoding)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pattern  : {} (length : {})", self.cpat, self.patlen)?;
        write!(f, "Encoding :")?;
        for (i, code) in self.patcode.iter().enumerate() {
            if i % 4 == 0 {
                write!(f, "\n\t")?;
            }
            write!(f, "0x{:08x} ", code)?;
        }
        Ok(())
    }
}

/// Syntactic pass: single-level brackets, nonempty classes, `!` always
/// prefixing a set, `#` always suffixing one.
fn check_pattern(pat: &str) -> Result<()> {
    let bad = || ApatError::PatternSyntax(pat.to_string());
    let bytes = pat.as_bytes();

    if bytes.first() == Some(&b'#') {
        return Err(bad());
    }

    let mut lev = 0i32;
    for (i, &c) in bytes.iter().enumerate() {
        match c {
            b'[' => {
                if lev != 0 || bytes.get(i + 1) == Some(&b']') {
                    return Err(bad());
                }
                lev += 1;
            }
            b']' => {
                lev -= 1;
                if lev != 0 {
                    return Err(bad());
                }
            }
            b'!' => {
                if lev != 0 || i + 1 >= bytes.len() || bytes[i + 1] == b']' {
                    return Err(bad());
                }
            }
            b'#' => {
                if lev != 0 || bytes[i - 1] == b'[' {
                    return Err(bad());
                }
            }
            c if c.is_ascii_uppercase() => {}
            _ => return Err(bad()),
        }
    }

    if lev != 0 {
        return Err(bad());
    }
    Ok(())
}

/// Index of the last byte of the position starting at `i`, including a
/// trailing `#`. `None` on an unterminated class.
fn split_pattern(pat: &[u8], i: usize) -> Option<usize> {
    match pat.get(i)? {
        b'[' => {
            let close = i + pat[i..].iter().position(|&c| c == b']')?;
            Some(skip_oblig(pat, close))
        }
        b'!' => split_pattern(pat, i + 1),
        _ => Some(skip_oblig(pat, i)),
    }
}

fn skip_oblig(pat: &[u8], i: usize) -> usize {
    if pat.get(i + 1) == Some(&b'#') {
        i + 1
    } else {
        i
    }
}

/// Symbol set of one position slice, honoring `[`-grouping and `!`.
fn val_pattern(pat: &[u8], code: &[u32; ALPHA_LEN]) -> u32 {
    match pat.first() {
        Some(b'[') => val_pattern(&pat[1..], code),
        Some(b'!') => !val_pattern(&pat[1..], code) & PATMASK,
        _ => {
            let mut val = 0;
            for &c in pat {
                if !c.is_ascii_uppercase() {
                    break;
                }
                val |= code[(c - b'A') as usize];
            }
            val
        }
    }
}

fn encode_pattern(pat: &str, encoding: Encoding) -> Result<Vec<u32>> {
    let bytes = pat.as_bytes();
    let code = encoding.code();
    let mut patcode = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let end = split_pattern(bytes, i).ok_or_else(|| ApatError::PatternSyntax(pat.to_string()))?;
        let slice = &bytes[i..=end];
        let oblig = if slice.last() == Some(&b'#') { OBLIBIT } else { 0 };
        patcode.push(val_pattern(slice, code) | oblig);
        i = end + 1;
    }

    if patcode.is_empty() {
        return Err(ApatError::EmptyPattern);
    }
    if patcode.len() > MAX_PAT_LEN {
        return Err(ApatError::PatternTooLong(patcode.len(), MAX_PAT_LEN));
    }
    Ok(patcode)
}

/// Folds position codes into the per-symbol table and the obligatory mask.
fn create_s(patcode: &[u32]) -> ([u64; ALPHA_LEN], u64) {
    let mut smat = [0u64; ALPHA_LEN];
    let mut omask = 0u64;

    for (i, &code) in patcode.iter().enumerate() {
        let amask = 1u64 << i;
        if code & OBLIBIT != 0 {
            omask |= amask;
        }
        for (c, entry) in smat.iter_mut().enumerate() {
            if code & (1 << c) != 0 {
                *entry |= amask;
            }
        }
    }

    (smat, omask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "dual"))]
    fn bit(c: u8) -> u32 {
        1 << (c - b'A')
    }

    #[test]
    fn test_syntax_accepts() {
        for pat in ["ACGT", "A#CGT", "[ACG]T", "![AT]CG", "AC[GT]#", "!A#"] {
            assert!(check_pattern(pat).is_ok(), "{}", pat);
        }
    }

    #[test]
    fn test_syntax_rejects() {
        for pat in [
            "#ACG",   // obligatory marker with nothing before it
            "[AC",    // unbalanced
            "A]CG",   // stray close
            "[]",     // empty class
            "[[A]]",  // nested
            "[#A]",   // marker right after open
            "A!",     // negation with nothing after it
            "[A!]",   // negation inside class
            "A[C#]",  // marker inside class
            "acgt",   // lowercase reaches the checker only via raw calls
            "AC-GT",  // non-alphabet char
        ] {
            assert!(check_pattern(pat).is_err(), "{}", pat);
        }
    }

    #[test]
    fn test_build_uppercases_and_strips_blanks() {
        let pat = Pattern::build("ac gt", 0, false, Encoding::Dna).unwrap();
        assert_eq!(pat.cpat, "ACGT");
        assert_eq!(pat.patlen, 4);
        assert!(pat.ok);
    }

    #[test]
    fn test_position_count() {
        for (pat, len) in [
            ("ACGT", 4),
            ("[ACG]T", 2),
            ("![AT]CG", 3),
            ("A#C[GT]#", 3),
            ("!A", 1),
        ] {
            let p = Pattern::build(pat, 0, false, Encoding::Dna).unwrap();
            assert_eq!(p.patlen, len, "{}", pat);
        }
    }

    #[test]
    fn test_empty_and_too_long() {
        assert!(matches!(
            Pattern::build("", 0, false, Encoding::Dna),
            Err(ApatError::EmptyPattern)
        ));
        let long = "A".repeat(MAX_PAT_LEN + 1);
        assert!(matches!(
            Pattern::build(&long, 0, false, Encoding::Dna),
            Err(ApatError::PatternTooLong(65, 64))
        ));
        let just_fits = "A".repeat(MAX_PAT_LEN);
        assert!(Pattern::build(&just_fits, 0, false, Encoding::Dna).is_ok());
    }

    #[cfg(not(feature = "dual"))]
    #[test]
    fn test_position_codes() {
        let p = Pattern::build("A[CG]!TN#", 0, false, Encoding::Dna).unwrap();
        assert_eq!(p.patcode.len(), 4);
        assert_eq!(p.patcode[0], bit(b'A'));
        assert_eq!(p.patcode[1], bit(b'C') | bit(b'G'));
        // negation complements within the 26-bit universe
        assert_eq!(p.patcode[2], !bit(b'T') & PATMASK);
        // N covers A, C, G, T and carries the obligatory flag
        let n = bit(b'A') | bit(b'C') | bit(b'G') | bit(b'T');
        assert_eq!(p.patcode[3], n | OBLIBIT);
    }

    #[test]
    fn test_smat_layout() {
        let p = Pattern::build("ACGA", 0, false, Encoding::Dna).unwrap();
        // bit i of smat[c] <=> c may occupy position i, bit 0 first
        assert_eq!(p.smat[(b'A' - b'A') as usize], 0b1001);
        assert_eq!(p.smat[(b'C' - b'A') as usize], 0b0010);
        assert_eq!(p.smat[(b'G' - b'A') as usize], 0b0100);
        assert_eq!(p.smat[(b'T' - b'A') as usize], 0);
        assert_eq!(p.omask, 0);
    }

    #[test]
    fn test_omask_layout() {
        let p = Pattern::build("A#CG#T", 0, false, Encoding::Dna).unwrap();
        assert_eq!(p.patlen, 4);
        assert_eq!(p.omask, 0b0101);
    }

    #[test]
    fn test_maxerr_clamped() {
        let p = Pattern::build("ACGT", 1000, false, Encoding::Dna).unwrap();
        assert_eq!(p.maxerr, MAX_PAT_ERR as u32);
    }

    #[test]
    fn test_complement_build() {
        let p = Pattern::build("A#CGT", 1, false, Encoding::Dna).unwrap();
        let c = p.complement().unwrap();
        assert_eq!(c.cpat, "ACGT#");
        assert_eq!(c.patlen, 4);
        assert_eq!(c.omask, 0b1000);
        assert_eq!(c.maxerr, 1);
        let back = c.complement().unwrap();
        assert_eq!(back.cpat, p.cpat);
    }

    #[test]
    fn test_display_dump() {
        let p = Pattern::build("ACGT", 0, false, Encoding::Dna).unwrap();
        let dump = format!("{}", p);
        assert!(dump.contains("ACGT (length : 4)"));
        assert!(dump.contains(&format!("0x{:08x}", p.patcode[0])));
    }
}
