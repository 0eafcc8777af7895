//! Permutation-free multiset handling shared by the carbon/double-bond search and the
//! isotope-label permutation step.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// Remembers the canonical (sorted) form of every multiset inserted so far.
///
/// Generation order is the tie-break: the first permutation inserted wins and all later
/// permutations of the same multiset are rejected.
#[derive(Debug, Clone)]
pub struct CanonicalSet<K> {
    seen: HashSet<Vec<K>>,
}

impl<K: Ord + Hash + Clone> Default for CanonicalSet<K> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }
}

impl<K: Ord + Hash + Clone> CanonicalSet<K> {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted copy of `parts`
    pub fn canonical_form(parts: &[K]) -> Vec<K> {
        let mut form = parts.to_vec();
        form.sort();
        form
    }

    /// Insert a multiset; returns `false` when a permutation of it was seen before
    pub fn insert(&mut self, parts: &[K]) -> bool {
        self.seen.insert(Self::canonical_form(parts))
    }

    /// Whether a permutation of `parts` has been inserted
    pub fn contains(&self, parts: &[K]) -> bool {
        self.seen.contains(&Self::canonical_form(parts))
    }

    /// Number of distinct multisets seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Keep the first-seen representative of every permutation class, preserving order.
pub fn dedup_permutations<T, K, F>(items: impl IntoIterator<Item = Vec<T>>, key: F) -> Vec<Vec<T>>
where
    K: Ord + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen = CanonicalSet::new();
    items
        .into_iter()
        .filter(|item| {
            let keys: Vec<K> = item.iter().map(&key).collect();
            seen.insert(&keys)
        })
        .collect()
}

/// Canonical printable name of a multiset: parts sorted, then joined with `_`
pub fn canonical_name<K: Ord + Clone + Display>(parts: &[K]) -> String {
    let mut sorted = parts.to_vec();
    sorted.sort();
    sorted
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("_")
}

/// Every distinct ordering of a multiset, in lexicographic order
pub fn unique_permutations<T: Ord + Clone>(items: &[T]) -> Vec<Vec<T>> {
    let mut current = items.to_vec();
    current.sort();
    let mut permutations = vec![current.clone()];
    while next_permutation(&mut current) {
        permutations.push(current.clone());
    }
    permutations
}

/// Rearrange `items` into the next lexicographic permutation; `false` once exhausted
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

/// Every distinct sub-multiset of size `k`, each sorted ascending
pub fn sub_multisets<T: Ord + Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let mut sorted = items.to_vec();
    sorted.sort();
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(k);
    collect_sub_multisets(&sorted, k, 0, &mut current, &mut result);
    result
}

fn collect_sub_multisets<T: Ord + Clone>(
    sorted: &[T],
    k: usize,
    start: usize,
    current: &mut Vec<T>,
    result: &mut Vec<Vec<T>>,
) {
    if current.len() == k {
        result.push(current.clone());
        return;
    }
    let mut i = start;
    while i < sorted.len() {
        // equal neighbours produce the same sub-multiset, take only the first
        if i > start && sorted[i] == sorted[i - 1] {
            i += 1;
            continue;
        }
        current.push(sorted[i].clone());
        collect_sub_multisets(sorted, k, i + 1, current, result);
        current.pop();
        i += 1;
    }
}
