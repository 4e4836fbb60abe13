//! A keccak Merkle tree with sorted-pair hashing.
//!
//! Leaves are sorted and de-duplicated before the tree is built. A parent is
//! `keccak256(min(a, b) || max(a, b))`, so a proof is just the list of siblings and needs no
//! left/right flags. A node without a sibling is carried up to the next layer unchanged.

use alloy_primitives::{keccak256, B256};

/// A Merkle tree over 32-byte leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` holds the sorted leaves, the last layer holds the root.
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Builds a tree from the given leaves.
    pub fn from_leaves(leaves: impl IntoIterator<Item = B256>) -> Self {
        let mut leaves: Vec<B256> = leaves.into_iter().collect();
        leaves.sort_unstable();
        leaves.dedup();

        let mut layers = vec![leaves];
        while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<B256> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two elements"),
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// The number of distinct leaves.
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// The root, or `None` for an empty tree.
    pub fn root(&self) -> Option<B256> {
        self.layers.last().and_then(|layer| layer.first()).copied()
    }

    /// The proof of inclusion of `leaf`, or `None` if it is not part of the tree.
    pub fn proof(&self, leaf: &B256) -> Option<Vec<B256>> {
        let mut index = self.layers[0].binary_search(leaf).ok()?;
        let mut proof = Vec::with_capacity(self.layers.len());

        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }

        Some(proof)
    }

    /// Checks that `proof` links `leaf` to `root`.
    pub fn verify(root: &B256, leaf: &B256, proof: &[B256]) -> bool {
        let computed = proof
            .iter()
            .fold(*leaf, |node, sibling| hash_pair(&node, sibling));

        &computed == root
    }
}

fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());

    keccak256(buf)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn leaf(n: u8) -> B256 {
        keccak256([n])
    }

    #[test]
    fn test_empty_tree_has_no_root() {
        let tree = MerkleTree::from_leaves([]);

        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.proof(&leaf(0)), None);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let tree = MerkleTree::from_leaves([leaf(1)]);

        assert_eq!(tree.root(), Some(leaf(1)));
        assert_eq!(tree.proof(&leaf(1)), Some(vec![]));
    }

    #[test]
    fn test_two_leaves_are_order_independent() {
        let a = MerkleTree::from_leaves([leaf(1), leaf(2)]);
        let b = MerkleTree::from_leaves([leaf(2), leaf(1), leaf(2)]);

        assert_eq!(a.root(), b.root());
        assert_eq!(b.len(), 2, "duplicates must be removed");
        assert_eq!(a.root(), Some(hash_pair(&leaf(1), &leaf(2))));
    }

    #[test]
    fn test_foreign_leaf_does_not_verify() {
        let tree = MerkleTree::from_leaves((0..5).map(leaf));
        let root = tree.root().unwrap();
        let proof = tree.proof(&leaf(3)).unwrap();

        assert!(MerkleTree::verify(&root, &leaf(3), &proof));
        assert!(!MerkleTree::verify(&root, &leaf(9), &proof));
    }

    proptest! {
        #[test]
        fn proptest_every_leaf_verifies(count in 1u8..64) {
            let leaves: Vec<B256> = (0..count).map(leaf).collect();
            let tree = MerkleTree::from_leaves(leaves.clone());
            let root = tree.root().unwrap();

            for leaf in &leaves {
                let proof = tree.proof(leaf).unwrap();
                prop_assert!(MerkleTree::verify(&root, leaf, &proof));
            }
        }
    }
}
