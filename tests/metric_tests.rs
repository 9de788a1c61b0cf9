use treekit::newick;
use treekit::{DistanceMode, Tree, TreeError};

const EPS: f64 = 1e-12;

fn fixture() -> Tree {
    newick::parse_str("(((A:0.1,B:0.01):0.001,C:0.0001):1.0,(D:0.00001):0.000001):2.0;").unwrap()
}

#[test]
fn test_branch_length_distance() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let b = tree.leaves_by_name(root, "B")[0];
    let c = tree.leaves_by_name(root, "C")[0];
    let d = tree.leaves_by_name(root, "D")[0];

    let ab = tree.distance(a, b, DistanceMode::BranchLength).unwrap();
    assert!((ab - 0.11).abs() < EPS);

    let ac = tree.distance(a, c, DistanceMode::BranchLength).unwrap();
    assert!((ac - 0.1011).abs() < EPS);

    let ad = tree.distance(a, d, DistanceMode::BranchLength).unwrap();
    assert!((ad - 1.101011).abs() < EPS);

    // Distance to self is zero
    let aa = tree.distance(a, a, DistanceMode::BranchLength).unwrap();
    assert_eq!(aa, 0.0);

    // Branch-length distance is symmetric
    let ba = tree.distance(b, a, DistanceMode::BranchLength).unwrap();
    assert!((ab - ba).abs() < EPS);
}

#[test]
fn test_topology_distance() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let b = tree.leaves_by_name(root, "B")[0];
    let c = tree.leaves_by_name(root, "C")[0];

    assert_eq!(tree.distance(a, b, DistanceMode::Topology).unwrap(), 1.0);
    assert_eq!(tree.distance(a, c, DistanceMode::Topology).unwrap(), 2.0);
}

#[test]
fn test_topology_distance_ancestor_asymmetry() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let n1 = tree[root].children()[0]; // ((A,B),C)

    // The first edge of the leg toward the first argument is not counted,
    // which shows when one endpoint is an ancestor of the other
    assert_eq!(tree.distance(a, n1, DistanceMode::Topology).unwrap(), 1.0);
    assert_eq!(tree.distance(n1, a, DistanceMode::Topology).unwrap(), 2.0);

    // The symmetric mode counts the full path both ways
    assert_eq!(tree.distance(a, n1, DistanceMode::TopologySymmetric).unwrap(), 2.0);
    assert_eq!(tree.distance(n1, a, DistanceMode::TopologySymmetric).unwrap(), 2.0);
}

#[test]
fn test_distance_across_detached_subtrees_fails() {
    let mut tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let d = tree.leaves_by_name(root, "D")[0];
    let n2 = tree[root].children()[1];

    tree.detach(n2);
    let err = tree.distance(a, d, DistanceMode::BranchLength).unwrap_err();
    assert!(matches!(err, TreeError::DisconnectedNodes));
}

#[test]
fn test_common_ancestor() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let b = tree.leaves_by_name(root, "B")[0];
    let d = tree.leaves_by_name(root, "D")[0];
    let n1 = tree[root].children()[0];
    let n3 = tree[a].parent().unwrap();

    // A single target pairs with the base node
    assert_eq!(tree.common_ancestor(a, &["C".into()]).unwrap(), n1);
    assert_eq!(tree.common_ancestor(a, &[b.into()]).unwrap(), n3);

    // Several targets are resolved among themselves
    assert_eq!(tree.common_ancestor(d, &["A".into(), "C".into()]).unwrap(), n1);
    assert_eq!(tree.common_ancestor(a, &["A".into(), "D".into()]).unwrap(), root);
}

#[test]
fn test_common_ancestor_without_targets_fails() {
    let tree = fixture();
    let root = tree.root();
    let err = tree.common_ancestor(root, &[]).unwrap_err();
    assert!(matches!(err, TreeError::InvalidTopology(_)));
}

#[test]
fn test_farthest_leaf() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];

    let (leaf, dist) = tree.farthest_leaf(root, false);
    assert_eq!(leaf, a);
    assert!((dist - 1.101).abs() < EPS);

    let (leaf, hops) = tree.farthest_leaf(root, true);
    assert_eq!(leaf, a); // ties broken by first encounter, A before B
    assert_eq!(hops, 3.0);

    // A leaf is its own farthest leaf
    let (leaf, dist) = tree.farthest_leaf(a, false);
    assert_eq!(leaf, a);
    assert_eq!(dist, 0.0);
}

#[test]
fn test_farthest_node_routes_through_ancestors() {
    let tree = fixture();
    let root = tree.root();
    let a = tree.leaves_by_name(root, "A")[0];
    let d = tree.leaves_by_name(root, "D")[0];

    let (node, dist) = tree.farthest_node(a, false);
    assert_eq!(node, d);
    assert!((dist - 1.101011).abs() < EPS);

    // Consistent with the pairwise distance
    let pairwise = tree.distance(a, d, DistanceMode::BranchLength).unwrap();
    assert!((dist - pairwise).abs() < EPS);
}
