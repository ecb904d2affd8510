//! Deterministic member color themes.

use crate::model::ColorTheme;

const PALETTE: [(&str, &str); 16] = [
    ("#11998e", "#38ef7d"),
    ("#43e97b", "#38f9d7"),
    ("#84fab0", "#8fd3f4"),
    ("#56ab2f", "#a8e063"),
    ("#00b894", "#00cec9"),
    ("#134e5e", "#71b280"),
    ("#a8edea", "#fed6e3"),
    ("#c3ec52", "#0ba360"),
    ("#0fd850", "#f9f047"),
    ("#2ecc71", "#27ae60"),
    ("#55efc4", "#81ecec"),
    ("#1e3c72", "#2a5298"),
    ("#00b894", "#00cec9"),
    ("#16a085", "#1abc9c"),
    ("#52c234", "#61b15a"),
    ("#06beb6", "#48b1bf"),
];

/// 32-bit string hash over UTF-16 code units (`h * 31 + c`, wrapping).
fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

/// Picks a palette entry for a member.
///
/// The same id, name and roster position always give the same theme.
#[must_use]
pub fn derive_theme(member_id: &str, name: &str, position: usize) -> ColorTheme {
    let hash = string_hash(&format!("{member_id}{name}"));
    let spread = u64::try_from(position).unwrap_or(0).wrapping_mul(7);
    let slot = u64::from(hash.unsigned_abs()).wrapping_add(spread) % 16;
    let slot = usize::try_from(slot).unwrap_or(0);
    let (start, end) = PALETTE[slot];
    ColorTheme { start: start.to_string(), end: end.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        // wraps like a 32-bit integer
        assert_eq!(string_hash("hello world, this wraps"), {
            let mut h: i32 = 0;
            for c in "hello world, this wraps".bytes() {
                h = h.wrapping_mul(31).wrapping_add(i32::from(c));
            }
            h
        });
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_theme("m-1", "Ada", 0);
        let b = derive_theme("m-1", "Ada", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn position_perturbs_slot() {
        let base = derive_theme("m-1", "Ada", 0);
        let shifted = derive_theme("m-1", "Ada", 1);
        let slot = |t: &ColorTheme| PALETTE.iter().position(|(s, e)| *s == t.start && *e == t.end);
        assert_ne!(slot(&base), slot(&shifted));
    }

    #[test]
    fn known_slot() {
        // "ab" hashes to 3105; 3105 % 16 == 1
        assert_eq!(derive_theme("a", "b", 0), ColorTheme { start: "#43e97b".into(), end: "#38f9d7".into() });
        // plus 7 per position
        assert_eq!(derive_theme("a", "b", 1), ColorTheme { start: "#0fd850".into(), end: "#f9f047".into() });
    }
}
