//! # Legal Outline Numbering
//!
//! Section labels depend only on position, never on text:
//!
//! ```text
//! depth % 4 == 0   I.  II.  III.
//! depth % 4 == 1   A.  B.   C.
//! depth % 4 == 2   1.  2.   3.
//! depth % 4 == 3   a.  b.   c.
//! ```
//!
//! ## Known limitation
//!
//! The letter styles stop at the 26th sibling. Past that the label is
//! undefined and [`label`] returns `None` instead of wrapping to `AA.` or
//! back to `A.`; callers choose how to render the gap.

use crate::structure::{DocumentStructure, SectionId};
use std::collections::HashMap;

const ROMAN_TABLE: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Outline label for the `index`-th sibling (0-based) at `depth` (0-based)
pub fn label(depth: usize, index: usize) -> Option<String> {
    let n = index.checked_add(1)?;
    let body = match depth % 4 {
        0 => to_roman(n),
        1 => letter(b'A', n)?,
        2 => n.to_string(),
        _ => letter(b'a', n)?,
    };
    Some(format!("{}.", body))
}

/// Label of every section reachable from the roots, keyed by section ID
pub fn outline_labels(structure: &DocumentStructure) -> HashMap<SectionId, Option<String>> {
    let mut labels = HashMap::with_capacity(structure.section_count());
    let mut stack: Vec<(&SectionId, usize, usize)> = structure
        .root_section_ids()
        .iter()
        .enumerate()
        .map(|(index, id)| (id, 0, index))
        .collect();

    while let Some((id, depth, index)) = stack.pop() {
        labels.insert(id.clone(), label(depth, index));
        if let Some(section) = structure.section(id) {
            stack.extend(
                section
                    .child_section_ids
                    .iter()
                    .enumerate()
                    .map(|(index, child)| (child, depth + 1, index)),
            );
        }
    }

    labels
}

fn to_roman(mut n: usize) -> String {
    let mut out = String::new();
    for (value, numeral) in ROMAN_TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

fn letter(base: u8, n: usize) -> Option<String> {
    if n > 26 {
        return None;
    }
    Some(char::from(base + (n as u8 - 1)).to_string())
}
