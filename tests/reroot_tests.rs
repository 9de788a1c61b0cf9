use treekit::newick::{self, FormatSpec};
use treekit::{DistanceMode, TreeError};

const EPS: f64 = 1e-12;

fn level(level: u8) -> FormatSpec {
    FormatSpec::level(level).unwrap()
}

#[test]
fn test_set_outgroup_leaf_under_root() {
    let mut tree = newick::parse_str("(A:1,B:2);").unwrap();
    let root = tree.root();
    tree.set_outgroup(root, "A".into()).unwrap();

    let out = newick::to_newick(&tree, tree.root(), level(5), None);
    assert_eq!(out, "(A:1.5,B:1.5);");
}

#[test]
fn test_set_outgroup_rotates_path() {
    let mut tree = newick::parse_str("((A:1,B:1)0.9:0.5,C:1.5);").unwrap();
    let root = tree.root();
    tree.set_outgroup(root, "A".into()).unwrap();

    let out = newick::to_newick(&tree, tree.root(), level(5), None);
    assert_eq!(out, "(A:0.5,(B:1,C:2):0.5);");
}

#[test]
fn test_set_outgroup_groups_remaining_children_under_connector() {
    let mut tree = newick::parse_str("(A:1,B:2,C:3);").unwrap();
    let root = tree.root();
    tree.set_outgroup(root, "B".into()).unwrap();

    let out = newick::to_newick(&tree, tree.root(), level(5), None);
    assert_eq!(out, "(B:1,(A:1,C:3):1);");
}

#[test]
fn test_set_outgroup_internal_node() {
    let mut tree = newick::parse_str("((A:1,B:1)x:0.5,C:1);").unwrap();
    let root = tree.root();
    tree.set_outgroup(root, "x".into()).unwrap();

    // Root children come out in deterministic order: fewer leaves first
    let out = newick::to_newick(&tree, tree.root(), level(5), None);
    assert_eq!(out, "(C:0.75,(A:1,B:1):0.75);");
}

#[test]
fn test_set_outgroup_preserves_pairwise_distances() {
    let mut tree =
        newick::parse_str("(((A:0.1,B:0.01):0.001,C:0.0001):1.0,(D:0.00001):0.000001);").unwrap();
    let root = tree.root();
    let leaves: Vec<_> = tree.leaves(root).collect();

    let mut before = Vec::new();
    for (i, &x) in leaves.iter().enumerate() {
        for &y in &leaves[i + 1..] {
            before.push(tree.distance(x, y, DistanceMode::BranchLength).unwrap());
        }
    }

    tree.set_outgroup(root, "B".into()).unwrap();

    let mut after = Vec::new();
    for (i, &x) in leaves.iter().enumerate() {
        for &y in &leaves[i + 1..] {
            after.push(tree.distance(x, y, DistanceMode::BranchLength).unwrap());
        }
    }

    for (b, a) in before.iter().zip(after.iter()) {
        assert!((b - a).abs() < EPS, "distance changed: {b} -> {a}");
    }
}

#[test]
fn test_set_outgroup_is_idempotent_up_to_topology() {
    let mut tree = newick::parse_str("((A:1,B:1):0.5,(C:1,D:1):0.5);").unwrap();
    let root = tree.root();
    tree.set_outgroup(root, "A".into()).unwrap();
    let once = newick::to_newick(&tree, tree.root(), level(9), None);
    tree.set_outgroup(root, "A".into()).unwrap();
    let twice = newick::to_newick(&tree, tree.root(), level(9), None);
    assert_eq!(once, twice);
}

#[test]
fn test_set_outgroup_to_root_fails_without_mutation() {
    let mut tree = newick::parse_str("((A:1,B:1):0.5,C:1.5);").unwrap();
    let root = tree.root();
    let before = newick::to_newick(&tree, root, level(0), None);

    let err = tree.set_outgroup(root, root.into()).unwrap_err();
    assert!(matches!(err, TreeError::InvalidTopology(_)));
    assert_eq!(newick::to_newick(&tree, root, level(0), None), before);
}

#[test]
fn test_set_outgroup_unknown_name_fails_without_mutation() {
    let mut tree = newick::parse_str("((A,B),C);").unwrap();
    let root = tree.root();
    let before = newick::to_newick(&tree, root, level(0), None);

    let err = tree.set_outgroup(root, "Z".into()).unwrap_err();
    assert!(matches!(err, TreeError::NodeNotFound(_)));
    assert_eq!(newick::to_newick(&tree, root, level(0), None), before);
}

#[test]
fn test_midpoint_outgroup() {
    let tree =
        newick::parse_str("(((A:0.1,B:0.01):0.001,C:0.0001):1.0,(D:0.00001):0.000001);").unwrap();
    let root = tree.root();
    let n1 = tree[root].children()[0];

    // The A-D path is by far the longest; its halfway point falls on the
    // heavy edge above ((A,B),C)
    assert_eq!(tree.midpoint_outgroup(root), n1);
}

#[test]
fn test_midpoint_then_reroot_balances_halves() {
    let mut tree = newick::parse_str("((A:4,B:1):1,(C:1,D:1):5);").unwrap();
    let root = tree.root();
    let midpoint = tree.midpoint_outgroup(root);
    tree.set_outgroup(root, midpoint.into()).unwrap();

    // After midpoint rooting, the two root edges carry equal weight
    let children = tree[tree.root()].children();
    assert_eq!(children.len(), 2);
    assert!((tree[children[0]].dist() - tree[children[1]].dist()).abs() < EPS);
}

#[test]
fn test_unroot() {
    let mut tree = newick::parse_str("((A:1,B:1):0.5,C:1.5);").unwrap();
    let root = tree.root();
    tree.unroot(root).unwrap();

    assert_eq!(tree[root].children().len(), 3);
    let names: Vec<_> = tree.leaf_names(root).collect();
    assert_eq!(names, ["A", "B", "C"]);
}

#[test]
fn test_unroot_two_leaf_tree_fails() {
    let mut tree = newick::parse_str("(A:1,B:1);").unwrap();
    let root = tree.root();
    let err = tree.unroot(root).unwrap_err();
    assert!(matches!(err, TreeError::InvalidTopology(_)));
}

#[test]
fn test_unroot_multifurcating_root_is_noop() {
    let mut tree = newick::parse_str("(A,B,C);").unwrap();
    let root = tree.root();
    tree.unroot(root).unwrap();
    assert_eq!(tree[root].children().len(), 3);
}

#[test]
fn test_reroot_single_child_root_fails() {
    let mut tree = newick::parse_str("(A:1);").unwrap();
    let root = tree.root();
    let err = tree.set_outgroup(root, "A".into()).unwrap_err();
    assert!(matches!(err, TreeError::InvalidTopology(_)));
}

#[test]
fn test_reroot_deep_caterpillar_is_stack_safe() {
    const DEPTH: usize = 10_000;

    let mut tree = treekit::Tree::new();
    let mut spine = tree.root();
    for _ in 0..DEPTH {
        tree.add_child(spine);
        spine = tree.add_child(spine);
    }
    tree[spine].set_name("tip");
    let root = tree.root();
    let leaves_before = tree.num_leaves(root);

    tree.set_outgroup(root, spine.into()).unwrap();

    assert_eq!(tree[spine].parent(), Some(root));
    assert_eq!(tree[root].children().len(), 2);
    assert_eq!(tree.num_leaves(root), leaves_before);
}
