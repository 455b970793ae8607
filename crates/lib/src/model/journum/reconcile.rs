//! Order repair and entry key derivation.

use std::{cmp::Ordering, collections::BTreeSet};

/// Repairs an order array against the set of entry keys that exist.
///
/// Keys not in `keys` and repeated keys are dropped; keys missing from
/// `order` are appended in key order (numerically when both keys are
/// integers). Already-consistent input comes back unchanged, and repairing
/// a repaired order is a no-op.
///
/// ```
/// use std::collections::BTreeSet;
/// use journo::model::repair_order;
///
/// let keys: BTreeSet<String> = ["a", "b"].into_iter().map(String::from).collect();
/// let order = vec!["b".to_string(), "c".to_string()];
/// assert_eq!(repair_order(&order, &keys), ["b", "a"]);
/// ```
pub fn repair_order(order: &[String], keys: &BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut repaired: Vec<String> = order
        .iter()
        .filter(|key| keys.contains(*key) && seen.insert(key.as_str()))
        .cloned()
        .collect();
    let mut missing: Vec<&String> = keys.iter().filter(|key| !seen.contains(key.as_str())).collect();
    missing.sort_by(|a, b| compare_keys(a, b));
    repaired.extend(missing.into_iter().cloned());
    repaired
}

/// Orders entry keys numerically when both parse as integers.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Entry key for a write at `now_millis`: whole seconds since the day's
/// local midnight, rounded to nearest. Entries added to a future day get
/// negative keys.
pub fn entry_key(now_millis: i64, midnight_millis: i64) -> i64 {
    (now_millis - midnight_millis + 500).div_euclid(1000)
}

/// The first key at or after `key` that `taken` does not contain.
pub fn free_key(mut key: i64, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = key.to_string();
        if !taken(&candidate) {
            return candidate;
        }
        key += 1;
    }
}
