use crate::{Cost, Reward, RewardMultiset};
use anyhow::{anyhow, Result};
use std::{
    cmp::{max, Ordering},
    fmt,
};

type Link = Option<Box<Node>>;

/// One distinct cost in the tree together with every reward stored at it.
#[derive(Debug)]
pub struct Node {
    cost: Cost,
    rewards: RewardMultiset,
    left: Link,
    right: Link,
    height: usize,
}

/// A single reward taken out of the tree, and the cost paid for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub cost: Cost,
    pub reward: Reward,
}

/// AVL tree keyed by cost. Every node owns a non-empty [`RewardMultiset`].
///
/// Children are exclusively owned and there are no parent links; heights and
/// balance are repaired as the recursive calls unwind.
#[derive(Debug, Default)]
pub struct CostTree {
    root: Link,
    len: usize,
}

impl Node {
    fn leaf(cost: Cost, reward: Reward) -> Box<Self> {
        Box::new(Self {
            cost,
            rewards: RewardMultiset::singleton(reward),
            left: None,
            right: None,
            height: 1,
        })
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn rewards(&self) -> &RewardMultiset {
        &self.rewards
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl CostTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct costs currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    pub fn contains(&self, cost: Cost) -> bool {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            link = match cost.cmp(&node.cost) {
                Ordering::Equal => return true,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        false
    }

    /// Adds `reward` under `cost`. A repeated cost only grows the existing
    /// node's multiset and leaves the shape of the tree untouched.
    pub fn insert(&mut self, cost: Cost, reward: Reward) {
        let (root, created) = insert(self.root.take(), cost, reward);
        self.root = Some(root);
        if created {
            self.len += 1;
        }
    }

    /// Node with the greatest cost not exceeding `target`.
    pub fn floor_search(&self, target: Cost) -> Option<&Node> {
        floor_search(self.root.as_deref(), target)
    }

    /// Takes the largest reward stored at `floor_search(target)`. The node is
    /// deleted once its last reward is gone.
    pub fn extract_one(&mut self, target: Cost) -> Option<Extraction> {
        let cost = self.floor_search(target)?.cost;
        let node = match self.find_mut(cost) {
            Some(node) => node,
            None => panic!("floor node {} vanished before extraction", cost),
        };
        let reward = node.rewards.extract_max();
        if node.rewards.is_empty() {
            self.root = delete(self.root.take(), cost);
            self.len -= 1;
        }
        Some(Extraction { cost, reward })
    }

    /// Verifies ordering, balance, cached heights and that no node holds an
    /// empty multiset. Reports the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let count = check_subtree(self.root.as_deref(), None, None)?;
        if count != self.len {
            return Err(anyhow!(
                "Tree holds {} nodes but tracks a length of {}",
                count,
                self.len
            ));
        }
        Ok(())
    }

    fn find_mut(&mut self, cost: Cost) -> Option<&mut Node> {
        let mut link = self.root.as_deref_mut();
        while let Some(node) = link {
            link = match cost.cmp(&node.cost) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }
}

fn insert(link: Link, cost: Cost, reward: Reward) -> (Box<Node>, bool) {
    let mut node = match link {
        Some(node) => node,
        None => return (Node::leaf(cost, reward), true),
    };
    let created = match cost.cmp(&node.cost) {
        Ordering::Less => {
            let (left, created) = insert(node.left.take(), cost, reward);
            node.left = Some(left);
            created
        }
        Ordering::Greater => {
            let (right, created) = insert(node.right.take(), cost, reward);
            node.right = Some(right);
            created
        }
        Ordering::Equal => {
            node.rewards.insert(reward);
            false
        }
    };
    if !created {
        return (node, false);
    }
    node.update_height();
    (rebalance(node), true)
}

fn floor_search(link: Option<&Node>, target: Cost) -> Option<&Node> {
    let node = link?;
    match target.cmp(&node.cost) {
        Ordering::Equal => Some(node),
        Ordering::Greater => floor_search(node.right.as_deref(), target).or(Some(node)),
        Ordering::Less => floor_search(node.left.as_deref(), target),
    }
}

fn delete(link: Link, cost: Cost) -> Link {
    let mut node = link?;
    match cost.cmp(&node.cost) {
        Ordering::Less => node.left = delete(node.left.take(), cost),
        Ordering::Greater => node.right = delete(node.right.take(), cost),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return None,
            (Some(child), None) | (None, Some(child)) => return Some(child),
            (Some(mut left), Some(right)) => {
                // the in-order predecessor hands over its multiset, then its
                // old (now empty) slot is deleted from the left subtree
                let (predecessor, rewards) = take_max(&mut left);
                node.cost = predecessor;
                node.rewards = rewards;
                node.left = delete(Some(left), predecessor);
                node.right = Some(right);
            }
        },
    }
    node.update_height();
    Some(rebalance(node))
}

fn take_max(node: &mut Node) -> (Cost, RewardMultiset) {
    match node.right.as_deref_mut() {
        Some(right) => take_max(right),
        None => (node.cost, std::mem::take(&mut node.rewards)),
    }
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    let balance = node.balance_factor();
    if balance > 1 {
        // left-right
        if node.left.as_ref().map_or(0, |left| left.balance_factor()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        // right-left
        if node.right.as_ref().map_or(0, |right| right.balance_factor()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = match node.right.take() {
        Some(pivot) => pivot,
        None => panic!("cannot rotate node {} left without a right child", node.cost),
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = match node.left.take() {
        Some(pivot) => pivot,
        None => panic!("cannot rotate node {} right without a left child", node.cost),
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn check_subtree(link: Option<&Node>, lower: Option<Cost>, upper: Option<Cost>) -> Result<usize> {
    let node = match link {
        Some(node) => node,
        None => return Ok(0),
    };
    if lower.is_some_and(|lower| node.cost <= lower) || upper.is_some_and(|upper| node.cost >= upper)
    {
        return Err(anyhow!(
            "Node {} is out of order (bounds {:?}..{:?})",
            node.cost,
            lower,
            upper
        ));
    }
    if node.rewards.is_empty() {
        return Err(anyhow!("Node {} holds no rewards", node.cost));
    }
    let count = check_subtree(node.left.as_deref(), lower, Some(node.cost))?
        + check_subtree(node.right.as_deref(), Some(node.cost), upper)?
        + 1;
    let expected = 1 + max(height(&node.left), height(&node.right));
    if node.height != expected {
        return Err(anyhow!(
            "Node {} caches height {} but has height {}",
            node.cost,
            node.height,
            expected
        ));
    }
    if node.balance_factor().abs() > 1 {
        return Err(anyhow!(
            "Node {} is unbalanced (balance factor {})",
            node.cost,
            node.balance_factor()
        ));
    }
    Ok(count)
}

impl fmt::Display for CostTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            Some(root) => write_subtree(f, root, "", true),
            None => Ok(()),
        }
    }
}

fn write_subtree(f: &mut fmt::Formatter<'_>, node: &Node, indent: &str, last: bool) -> fmt::Result {
    let (branch, child_indent) = if last {
        ("R----", format!("{indent}     "))
    } else {
        ("L----", format!("{indent}|    "))
    };
    writeln!(
        f,
        "{}{}cost:{}, gold:{}, height:{}",
        indent,
        branch,
        node.cost,
        node.rewards.total(),
        node.height
    )?;
    if let Some(left) = node.left.as_deref() {
        write_subtree(f, left, &child_indent, false)?;
    }
    if let Some(right) = node.right.as_deref() {
        write_subtree(f, right, &child_indent, true)?;
    }
    Ok(())
}

impl Extend<(Cost, Reward)> for CostTree {
    fn extend<I: IntoIterator<Item = (Cost, Reward)>>(&mut self, iter: I) {
        for (cost, reward) in iter {
            self.insert(cost, reward);
        }
    }
}

impl FromIterator<(Cost, Reward)> for CostTree {
    fn from_iter<I: IntoIterator<Item = (Cost, Reward)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "without a right child")]
    fn test_rotate_left_without_right_child() {
        rotate_left(Node::leaf(4, 1));
    }

    #[test]
    #[should_panic(expected = "without a left child")]
    fn test_rotate_right_without_left_child() {
        rotate_right(Node::leaf(4, 1));
    }

    #[test]
    fn test_rotate_left_recomputes_heights() {
        let mut node = Node::leaf(1, 0);
        node.right = Some(Node::leaf(2, 0));
        node.update_height();
        let pivot = rotate_left(node);
        assert_eq!(pivot.cost, 2);
        assert_eq!(pivot.height, 2);
        assert_eq!(pivot.left.as_ref().map(|left| left.height), Some(1));
        assert!(pivot.right.is_none());
    }
}
