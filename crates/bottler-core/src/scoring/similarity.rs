//! Character-sequence similarity ratio.
//!
//! Ratcliff/Obershelp matching: repeatedly take the longest common block,
//! recurse on both sides, and report `2 * matched / (len(a) + len(b))`.
//! Ties pick the earliest block in `a`, then in `b`.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`. Two empty strings are identical.
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    (2 * matched) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run length of the match ending at (i - 1, j), keyed by j
    let mut prev: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut current: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|pj| prev.get(&pj))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                current.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        prev = current;
    }
    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_is_one() {
        assert!(approx(similarity("witcher3", "witcher3"), 1.0));
        assert!(approx(similarity("", ""), 1.0));
    }

    #[test]
    fn test_disjoint_is_zero() {
        assert!(approx(similarity("abc", "xyz"), 0.0));
        assert!(approx(similarity("abc", ""), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // "abcd" vs "bcde": block "bcd" -> 2*3/8
        assert!(approx(similarity("abcd", "bcde"), 0.75));
        assert!(approx(similarity("game", "gamelauncher"), 2.0 * 4.0 / 16.0));
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // longest block "cd", then "a" on the left and "f" on the right
        assert!(approx(similarity("acdf", "axcdyf"), 2.0 * 4.0 / 10.0));
    }

    #[test]
    fn test_range_is_bounded() {
        for (a, b) in [("skyrim", "skyrimse"), ("tes", "launcher"), ("a", "aaaa")] {
            let r = similarity(a, b);
            assert!((0.0..=1.0).contains(&r), "{a} vs {b} -> {r}");
        }
    }
}
