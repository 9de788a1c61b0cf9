use proptest::prelude::*;

use rand::SeedableRng;
use rand::rngs::StdRng;

use treekit::model::{NodeRef, Tree};
use treekit::newick::{self, FormatSpec};
use treekit::DistanceMode;

const EPS: f64 = 1e-9;

fn random_tree(seed: u64, leaves: usize) -> Tree {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = Tree::new();
    let root = tree.root();
    tree.populate(&mut rng, root, leaves, &[], false);
    tree
}

proptest! {
    #[test]
    fn prop_newick_round_trip_is_stable(seed in any::<u64>(), leaves in 2usize..40) {
        let tree = random_tree(seed, leaves);
        let spec = FormatSpec::level(5).unwrap();

        let written = newick::to_newick(&tree, tree.root(), spec, None);
        let reparsed = newick::parse_str(&written).unwrap();
        let rewritten = newick::to_newick(&reparsed, reparsed.root(), spec, None);

        prop_assert_eq!(written, rewritten);
        prop_assert_eq!(reparsed.num_leaves(reparsed.root()), leaves);
    }

    #[test]
    fn prop_branch_length_distance_is_symmetric(
        seed in any::<u64>(),
        leaves in 2usize..40,
        i in any::<usize>(),
        j in any::<usize>(),
    ) {
        let tree = random_tree(seed, leaves);
        let ids: Vec<_> = tree.leaves(tree.root()).collect();
        let a = ids[i % ids.len()];
        let b = ids[j % ids.len()];

        let ab = tree.distance(a, b, DistanceMode::BranchLength).unwrap();
        let ba = tree.distance(b, a, DistanceMode::BranchLength).unwrap();
        prop_assert!((ab - ba).abs() < EPS);

        let hops_ab = tree.distance(a, b, DistanceMode::TopologySymmetric).unwrap();
        let hops_ba = tree.distance(b, a, DistanceMode::TopologySymmetric).unwrap();
        prop_assert_eq!(hops_ab, hops_ba);
    }

    #[test]
    fn prop_rerooting_preserves_leaf_distances(
        seed in any::<u64>(),
        leaves in 3usize..25,
        pick in any::<usize>(),
    ) {
        let mut tree = random_tree(seed, leaves);
        let root = tree.root();
        let ids: Vec<_> = tree.leaves(root).collect();
        let outgroup = ids[pick % ids.len()];

        let mut before = Vec::new();
        for (k, &x) in ids.iter().enumerate() {
            for &y in &ids[k + 1..] {
                before.push(tree.distance(x, y, DistanceMode::BranchLength).unwrap());
            }
        }

        tree.set_outgroup(root, outgroup.into()).unwrap();

        // The outgroup is now a direct child of the root
        prop_assert_eq!(tree[outgroup].parent(), Some(root));
        prop_assert_eq!(tree[root].children().len(), 2);

        let mut index = 0;
        for (k, &x) in ids.iter().enumerate() {
            for &y in &ids[k + 1..] {
                let after = tree.distance(x, y, DistanceMode::BranchLength).unwrap();
                prop_assert!(
                    (before[index] - after).abs() < EPS,
                    "distance {} -> {} changed", before[index], after,
                );
                index += 1;
            }
        }
    }

    #[test]
    fn prop_prune_to_full_leaf_set_is_identity(seed in any::<u64>(), leaves in 2usize..40) {
        let mut tree = random_tree(seed, leaves);
        let root = tree.root();
        let spec = FormatSpec::level(5).unwrap();
        let before = newick::to_newick(&tree, root, spec, None);

        let keep: Vec<NodeRef> = tree.leaves(root).map(NodeRef::from).collect();
        tree.prune(root, &keep).unwrap();

        let after = newick::to_newick(&tree, tree.root(), spec, None);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_sort_descendants_preserves_structure(seed in any::<u64>(), leaves in 2usize..40) {
        let mut tree = random_tree(seed, leaves);
        let root = tree.root();

        let mut names_before: Vec<_> = tree.leaf_names(root).map(str::to_string).collect();
        names_before.sort();

        tree.sort_descendants(root);
        let once = newick::to_newick(&tree, root, FormatSpec::level(9).unwrap(), None);
        tree.sort_descendants(root);
        let twice = newick::to_newick(&tree, root, FormatSpec::level(9).unwrap(), None);
        prop_assert_eq!(once, twice);

        let mut names_after: Vec<_> = tree.leaf_names(root).map(str::to_string).collect();
        names_after.sort();
        prop_assert_eq!(names_before, names_after);
    }
}
