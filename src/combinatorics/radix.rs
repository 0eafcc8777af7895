/// Mixed-radix index over the Cartesian product of per-slot option lists.
///
/// Index `j` selects option `(j / divisor[i]) % counts[i]` for slot `i`, so every
/// `j` in `0..total()` maps to exactly one combination of choices.
#[derive(Debug, Clone)]
pub struct MixedRadix {
    counts: Vec<usize>,
    divisors: Vec<usize>,
    total: usize,
}

impl MixedRadix {
    /// Build the index for slots with the given option counts
    pub fn new(counts: &[usize]) -> Self {
        let mut divisors = Vec::with_capacity(counts.len());
        let mut total = 1usize;
        for count in counts {
            divisors.push(total);
            total = total.saturating_mul(*count);
        }
        Self {
            counts: counts.to_vec(),
            divisors,
            total,
        }
    }

    /// Number of combinations (`∏ counts`)
    pub fn total(&self) -> usize {
        self.total
    }

    /// Option chosen for `slot` at combination `index`
    pub fn choice(&self, index: usize, slot: usize) -> usize {
        (index / self.divisors[slot]) % self.counts[slot]
    }

    /// All option indices for combination `index`
    pub fn choices(&self, index: usize) -> Vec<usize> {
        (0..self.counts.len())
            .map(|slot| self.choice(index, slot))
            .collect()
    }

    /// Iterate over the option indices of every combination
    pub fn iter(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.total).map(move |index| self.choices(index))
    }
}
