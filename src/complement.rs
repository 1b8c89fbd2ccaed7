//! Reverse-complement of nucleic acid sequences and of pattern strings.

use crate::error::{ApatError, Result};

/// IUPAC DNA alphabet, extended with the pattern operators.
const NUC_ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ#![]";

/// Complementary alphabet, paired entry by entry with `NUC_ALPHA`.
const CNUC_ALPHA: &[u8] = b"TVGHEFCDIJMLKNOPQYSAABWXRZ#!][";

/// Complement of a single base; unknown characters pass through unchanged.
pub fn complement_base(base: u8) -> u8 {
    match NUC_ALPHA.iter().position(|&c| c == base) {
        Some(i) => CNUC_ALPHA[i],
        None => base,
    }
}

/// Reverse-complement of a plain sequence. An involution on the canonical
/// alphabet subset (U complements to A, which complements back to T).
pub fn complement_sequence(seq: &str) -> String {
    let out: Vec<u8> = seq.bytes().rev().map(complement_base).collect();
    // input was ASCII, the paired alphabets keep it so
    String::from_utf8(out).unwrap_or_default()
}

/// One position of a parsed pattern: an optional `!` prefix, a letter or a
/// `[..]` class, an optional trailing `#`.
struct PatPosition {
    negated: bool,
    class: bool,
    letters: Vec<u8>,
    oblig: bool,
}

fn parse_positions(pat: &[u8]) -> Result<Vec<PatPosition>> {
    let syntax = || ApatError::PatternSyntax(String::from_utf8_lossy(pat).into_owned());
    let mut out = Vec::new();
    let mut i = 0;
    while i < pat.len() {
        let negated = pat[i] == b'!';
        if negated {
            i += 1;
        }
        let (class, letters) = match pat.get(i) {
            Some(b'[') => {
                let close = pat[i..]
                    .iter()
                    .position(|&c| c == b']')
                    .ok_or_else(syntax)?;
                let letters = pat[i + 1..i + close].to_vec();
                i += close + 1;
                (true, letters)
            }
            Some(&c) if c.is_ascii_uppercase() => {
                i += 1;
                (false, vec![c])
            }
            _ => return Err(syntax()),
        };
        let oblig = pat.get(i) == Some(&b'#');
        if oblig {
            i += 1;
        }
        out.push(PatPosition {
            negated,
            class,
            letters,
            oblig,
        });
    }
    Ok(out)
}

/// Reverse-complement of a pattern string: positions are complemented one by
/// one and re-emitted in reverse order, so `!` stays a prefix and `#` stays
/// a suffix of its position. The input must be a validated pattern.
pub fn complement_pattern(pat: &str) -> Result<String> {
    let positions = parse_positions(pat.as_bytes())?;
    let mut out = Vec::with_capacity(pat.len());
    for pos in positions.iter().rev() {
        if pos.negated {
            out.push(b'!');
        }
        if pos.class {
            out.push(b'[');
        }
        for &c in &pos.letters {
            out.push(complement_base(c));
        }
        if pos.class {
            out.push(b']');
        }
        if pos.oblig {
            out.push(b'#');
        }
    }
    String::from_utf8(out).map_err(|_| ApatError::PatternSyntax(pat.to_string()))
}
