//! Character-level similarity primitives. All ratios are in `[0, 1]`.

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Normalized indel similarity: `2 * LCS / (len(a) + len(b))`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// `ratio` after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    fn sorted(s: &str) -> String {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
    ratio(&sorted(a), &sorted(b))
}

/// Best `ratio` of the shorter string against any equally long window of the
/// longer one, including windows clipped at either edge.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return if long.is_empty() { 1.0 } else { 0.0 };
    }

    let n = short.len();
    let mut best = 0.0f64;

    for start in 0..=(long.len() - n) {
        best = best.max(ratio_chars(short, &long[start..start + n]));
        if best >= 1.0 {
            return 1.0;
        }
    }
    for clip in 1..n {
        best = best.max(ratio_chars(short, &long[..clip]));
        best = best.max(ratio_chars(short, &long[long.len() - clip..]));
    }
    best
}

/// Exactly one insertion, deletion or substitution apart.
pub fn is_single_char_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a == b {
        return false;
    }
    if a.len() == b.len() {
        return a.iter().zip(&b).filter(|(x, y)| x != y).count() == 1;
    }

    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() != 1 {
        return false;
    }
    let split = short
        .iter()
        .zip(long.iter())
        .take_while(|(x, y)| x == y)
        .count();
    short[split..] == long[split + 1..]
}

/// Alphabetic words of an identifier, lowercased. Splits on any
/// non-letter and on lower-to-upper case transitions, so `mensagemSucesso`
/// and `sucesso-mensagem` yield the same words.
pub fn word_tokens(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if !c.is_alphabetic() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn normalize_separators(s: &str) -> String {
    s.replace('_', "-")
}

/// First half of `s` (by characters), when it is at least `min_len` long.
pub fn half_prefix(s: &str, min_len: usize) -> Option<&str> {
    let half = s.chars().count() / 2;
    if half < min_len {
        return None;
    }
    s.char_indices().nth(half).map(|(i, _)| &s[..i])
}

/// Last half of `s` (by characters), when it is at least `min_len` long.
pub fn half_suffix(s: &str, min_len: usize) -> Option<&str> {
    let len = s.chars().count();
    let half = len / 2;
    if half < min_len {
        return None;
    }
    s.char_indices().nth(len - half).map(|(i, _)| &s[i..])
}
