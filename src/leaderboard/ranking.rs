/// Standard competition ranking ("1224") over an already sorted slice.
///
/// An item shares the rank of its predecessor when `tied` says so;
/// otherwise it takes its 1-based position.
pub fn competition_ranks<T, F>(sorted: &[T], tied: F) -> Vec<u32>
where
    F: Fn(&T, &T) -> bool,
{
    let mut ranks: Vec<u32> = Vec::with_capacity(sorted.len());

    for (idx, item) in sorted.iter().enumerate() {
        let rank = match (idx, ranks.last()) {
            (0, _) | (_, None) => 1,
            (_, Some(&previous)) if tied(&sorted[idx - 1], item) => previous,
            _ => idx as u32 + 1,
        };
        ranks.push(rank);
    }

    ranks
}
