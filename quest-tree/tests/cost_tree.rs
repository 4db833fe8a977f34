use quest_tree::{Cost, CostTree, Extraction, Node};

fn in_order(node: Option<&Node>, costs: &mut Vec<Cost>) {
    if let Some(node) = node {
        in_order(node.left(), costs);
        costs.push(node.cost());
        in_order(node.right(), costs);
    }
}

fn costs(tree: &CostTree) -> Vec<Cost> {
    let mut costs = Vec::new();
    in_order(tree.root(), &mut costs);
    costs
}

#[test]
fn test_insert_ascending_stays_balanced() {
    let tree: CostTree = (1..=127).map(|cost| (cost, cost * 2)).collect();
    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 127);
    assert_eq!(tree.height(), 7);
    assert_eq!(costs(&tree), (1..=127).collect::<Vec<Cost>>());
}

#[test]
fn test_insert_descending_stays_balanced() {
    let tree: CostTree = (1..=100).rev().map(|cost| (cost, 1)).collect();
    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 100);
    assert!(tree.height() <= 8);
}

#[test]
fn test_single_rotations() {
    let tree: CostTree = vec![(1, 0), (2, 0), (3, 0)].into_iter().collect();
    let root = tree.root().unwrap();
    assert_eq!(root.cost(), 2);
    assert_eq!(root.left().unwrap().cost(), 1);
    assert_eq!(root.right().unwrap().cost(), 3);

    let tree: CostTree = vec![(3, 0), (2, 0), (1, 0)].into_iter().collect();
    assert_eq!(tree.root().unwrap().cost(), 2);
    tree.check_invariants().unwrap();
}

#[test]
fn test_double_rotations() {
    // left-right
    let tree: CostTree = vec![(3, 0), (1, 0), (2, 0)].into_iter().collect();
    let root = tree.root().unwrap();
    assert_eq!(root.cost(), 2);
    assert_eq!(root.left().unwrap().cost(), 1);
    assert_eq!(root.right().unwrap().cost(), 3);
    assert_eq!(root.height(), 2);

    // right-left
    let tree: CostTree = vec![(1, 0), (3, 0), (2, 0)].into_iter().collect();
    let root = tree.root().unwrap();
    assert_eq!(root.cost(), 2);
    assert_eq!(root.left().unwrap().height(), 1);
    assert_eq!(root.right().unwrap().height(), 1);
}

#[test]
fn test_duplicate_cost_accumulates() {
    let mut tree = CostTree::new();
    tree.insert(5, 1);
    tree.insert(5, 9);
    tree.insert(5, 4);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.root().unwrap().rewards().len(), 3);
    assert_eq!(tree.root().unwrap().height(), 1);

    assert_eq!(tree.extract_one(5), Some(Extraction { cost: 5, reward: 9 }));
    assert_eq!(tree.extract_one(5), Some(Extraction { cost: 5, reward: 4 }));
    assert!(tree.contains(5));
    assert_eq!(tree.extract_one(5), Some(Extraction { cost: 5, reward: 1 }));
    assert!(!tree.contains(5));
    assert!(tree.is_empty());
    assert_eq!(tree.extract_one(5), None);
}

#[test]
fn test_floor_search() {
    let tree: CostTree = vec![(10, 1), (20, 2), (30, 3)].into_iter().collect();
    assert!(tree.floor_search(5).is_none());
    assert_eq!(tree.floor_search(10).unwrap().cost(), 10);
    assert_eq!(tree.floor_search(25).unwrap().cost(), 20);
    assert_eq!(tree.floor_search(29).unwrap().cost(), 20);
    assert_eq!(tree.floor_search(100).unwrap().cost(), 30);
    assert!(CostTree::new().floor_search(100).is_none());
}

#[test]
fn test_floor_search_exhaustive() {
    let stored: Vec<Cost> = (0..40).map(|i| i * 3 + 1).collect();
    let tree: CostTree = stored.iter().map(|&cost| (cost, 0)).collect();
    for target in -2..130 {
        let expected = stored.iter().copied().filter(|&cost| cost <= target).max();
        assert_eq!(
            tree.floor_search(target).map(|node| node.cost()),
            expected,
            "floor({})",
            target
        );
    }
}

#[test]
fn test_delete_leaf_and_single_child() {
    let mut tree: CostTree = vec![(5, 50), (3, 30), (8, 80), (9, 90)]
        .into_iter()
        .collect();
    // 8 has a single right child
    assert_eq!(tree.extract_one(8), Some(Extraction { cost: 8, reward: 80 }));
    tree.check_invariants().unwrap();
    assert_eq!(costs(&tree), vec![3, 5, 9]);
    assert_eq!(tree.root().unwrap().right().unwrap().cost(), 9);

    // 3 is a leaf
    assert_eq!(tree.extract_one(3), Some(Extraction { cost: 3, reward: 30 }));
    tree.check_invariants().unwrap();
    assert_eq!(costs(&tree), vec![5, 9]);
}

#[test]
fn test_delete_two_children_moves_predecessor() {
    let mut tree: CostTree = vec![(5, 50), (3, 30), (8, 80), (4, 40), (4, 41)]
        .into_iter()
        .collect();
    assert_eq!(tree.root().unwrap().cost(), 5);

    assert_eq!(tree.extract_one(5), Some(Extraction { cost: 5, reward: 50 }));
    tree.check_invariants().unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.cost(), 4);
    assert_eq!(root.rewards().len(), 2);
    assert_eq!(root.rewards().peek_max(), Some(41));
    assert_eq!(root.left().unwrap().cost(), 3);
    assert_eq!(root.right().unwrap().cost(), 8);
}

#[test]
fn test_delete_rebalances() {
    let mut tree: CostTree = (1..=20).map(|cost| (cost, cost)).collect();
    for cost in 1..=15 {
        assert_eq!(
            tree.extract_one(cost),
            Some(Extraction { cost, reward: cost })
        );
        tree.check_invariants().unwrap();
    }
    assert_eq!(tree.len(), 5);
    assert_eq!(costs(&tree), vec![16, 17, 18, 19, 20]);
    assert_eq!(tree.height(), 3);
}

#[test]
fn test_display() {
    let tree: CostTree = vec![(5, 10), (3, 7), (8, 2), (5, 1)].into_iter().collect();
    assert_eq!(
        tree.to_string(),
        "R----cost:5, gold:11, height:2\n     L----cost:3, gold:7, height:1\n     R----cost:8, gold:2, height:1\n"
    );
    assert_eq!(CostTree::new().to_string(), "");
}
