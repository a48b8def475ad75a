//! Edit-distance name similarity.

/// Levenshtein distance over Unicode scalar values (unit-cost insert,
/// delete and substitute). Case-sensitive.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Keep the row over the shorter string.
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev_row: Vec<usize> = (0..=short.len()).collect();
    let mut curr_row = vec![0; short.len() + 1];

    for (i, long_char) in long.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, short_char) in short.iter().enumerate() {
            let cost = usize::from(long_char != short_char);
            curr_row[j + 1] = (curr_row[j] + 1) // insertion
                .min(prev_row[j + 1] + 1) // deletion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[short.len()]
}

/// Distance divided by the longer length in chars; `1.0` when both are empty.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    distance(a, b) as f64 / longest as f64
}

/// Case-insensitive [`normalized_distance`] used for name matching.
pub fn name_distance(a: &str, b: &str) -> f64 {
    normalized_distance(&a.to_lowercase(), &b.to_lowercase())
}
