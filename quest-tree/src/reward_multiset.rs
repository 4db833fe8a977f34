use crate::Reward;
use std::collections::BinaryHeap;

/// Bag of rewards sharing one cost. Only the largest value is ever taken out.
#[derive(Debug, Clone, Default)]
pub struct RewardMultiset {
    heap: BinaryHeap<Reward>,
}

impl RewardMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(value: Reward) -> Self {
        let mut rewards = Self::new();
        rewards.insert(value);
        rewards
    }

    pub fn insert(&mut self, value: Reward) {
        self.heap.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn peek_max(&self) -> Option<Reward> {
        self.heap.peek().copied()
    }

    /// Removes and returns the largest reward.
    ///
    /// Panics when empty: a multiset attached to a live node always holds at
    /// least one value.
    pub fn extract_max(&mut self) -> Reward {
        match self.heap.pop() {
            Some(value) => value,
            None => panic!("cannot extract from an empty reward multiset"),
        }
    }

    pub fn total(&self) -> Reward {
        self.heap.iter().sum()
    }
}

impl FromIterator<Reward> for RewardMultiset {
    fn from_iter<I: IntoIterator<Item = Reward>>(iter: I) -> Self {
        Self {
            heap: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_descending_order() {
        let mut rewards: RewardMultiset = vec![4, 9, 1, 9, 3].into_iter().collect();
        assert_eq!(rewards.len(), 5);
        assert_eq!(rewards.total(), 26);
        assert_eq!(rewards.peek_max(), Some(9));

        let drained: Vec<Reward> = (0..5).map(|_| rewards.extract_max()).collect();
        assert_eq!(drained, vec![9, 9, 4, 3, 1]);
        assert!(rewards.is_empty());
    }

    #[test]
    #[should_panic(expected = "empty reward multiset")]
    fn test_extract_from_empty() {
        RewardMultiset::new().extract_max();
    }
}
