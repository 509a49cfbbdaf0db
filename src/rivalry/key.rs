/// Orders two player ids canonically so either calling order agrees.
pub fn canonical_pair<'a>(first: &'a str, second: &'a str) -> (&'a str, &'a str) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

/// Deterministic identity of the rivalry between two players
pub fn pair_key(first: &str, second: &str) -> String {
    let (low, high) = canonical_pair(first, second);
    format!("{}_{}", low, high)
}
