use pretty_assertions::assert_eq;

use treekit::algo::canonical::NID_ATTR;
use treekit::model::AttrValue;
use treekit::newick::{self, FormatSpec};
use treekit::UltrametricStrategy;

const EPS: f64 = 1e-9;

fn names_only() -> FormatSpec {
    FormatSpec::level(9).unwrap()
}

#[test]
fn test_sort_descendants_is_construction_order_independent() {
    let mut first = newick::parse_str("((A,B),C);").unwrap();
    let mut second = newick::parse_str("(C,(B,A));").unwrap();

    let r1 = first.root();
    let r2 = second.root();
    first.sort_descendants(r1);
    second.sort_descendants(r2);

    assert_eq!(
        newick::to_newick(&first, r1, names_only(), None),
        newick::to_newick(&second, r2, names_only(), None),
    );
}

#[test]
fn test_sort_descendants_is_idempotent() {
    let mut tree = newick::parse_str("((D,(B,A)),(C,E));").unwrap();
    let root = tree.root();

    tree.sort_descendants(root);
    let once = newick::to_newick(&tree, root, names_only(), None);
    tree.sort_descendants(root);
    let twice = newick::to_newick(&tree, root, names_only(), None);

    assert_eq!(once, twice);
}

#[test]
fn test_sort_descendants_preserves_leaf_set() {
    let mut tree = newick::parse_str("((D,(B,A)),(C,E));").unwrap();
    let root = tree.root();
    tree.sort_descendants(root);

    let mut names: Vec<_> = tree.leaf_names(root).collect();
    names.sort();
    assert_eq!(names, ["A", "B", "C", "D", "E"]);
}

#[test]
fn test_sort_descendants_assigns_postorder_ids() {
    let mut tree = newick::parse_str("((A,B),C);").unwrap();
    let root = tree.root();
    tree.sort_descendants(root);

    // Ids run 1..=n in the postorder of the sorted arrangement, so the
    // root always gets the highest id
    assert_eq!(tree[root].attr(NID_ATTR), Some(&AttrValue::Int(5)));
    let mut ids: Vec<i64> = tree
        .traverse(root, treekit::Strategy::Postorder)
        .map(|id| match tree[id].attr(NID_ATTR) {
            Some(AttrValue::Int(n)) => *n,
            other => panic!("missing nid: {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_rescale_ultrametric_balanced() {
    let mut tree = newick::parse_str("((A:1,B:2)n:0.5,C:3);").unwrap();
    let root = tree.root();
    tree.rescale_ultrametric(root, 6.0, UltrametricStrategy::Balanced);

    let n = tree.resolve(root, "n".into()).unwrap();
    let a = tree.leaves_by_name(root, "A")[0];
    let b = tree.leaves_by_name(root, "B")[0];
    let c = tree.leaves_by_name(root, "C")[0];

    // Each edge takes an equal share of the remaining budget
    assert!((tree[n].dist() - 3.0).abs() < EPS);
    assert!((tree[a].dist() - 3.0).abs() < EPS);
    assert!((tree[b].dist() - 3.0).abs() < EPS);
    assert!((tree[c].dist() - 6.0).abs() < EPS);
    assert!(tree.is_ultrametric(root, EPS));
}

#[test]
fn test_rescale_ultrametric_fixed() {
    let mut tree = newick::parse_str("((A:1,B:2)n:0.5,C:3);").unwrap();
    let root = tree.root();
    tree.rescale_ultrametric(root, 6.0, UltrametricStrategy::Fixed);

    let n = tree.resolve(root, "n".into()).unwrap();
    let a = tree.leaves_by_name(root, "A")[0];
    let c = tree.leaves_by_name(root, "C")[0];

    // Internal edges take the constant step, leaves absorb the remainder
    assert!((tree[n].dist() - 2.0).abs() < EPS);
    assert!((tree[a].dist() - 4.0).abs() < EPS);
    assert!((tree[c].dist() - 6.0).abs() < EPS);
    assert!(tree.is_ultrametric(root, EPS));
}

#[test]
fn test_is_ultrametric() {
    let skewed = newick::parse_str("((A:1,B:2):0.5,C:3);").unwrap();
    assert!(!skewed.is_ultrametric(skewed.root(), EPS));

    let flat = newick::parse_str("((A:1,B:1):1,C:2);").unwrap();
    assert!(flat.is_ultrametric(flat.root(), EPS));

    // A lone leaf is trivially ultrametric
    let single = newick::parse_str("A;").unwrap();
    assert!(single.is_ultrametric(single.root(), EPS));
}
