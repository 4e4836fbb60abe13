//! Turns raw source-chain transactions into normalized [`TxInput`]/[`TxOutput`] records.
//!
//! These functions hold no state and perform no I/O. They fail fast on any output or owner shape
//! that is not explicitly supported instead of trying to coerce it.

use crate::{
    address::AddressCodec,
    errors::{MalformedReason, ReconstructError},
    tx::{BaseTx, OutputOwners, RewardOwner, SourceOutput, TxInput, TxOutput},
    types::{ShortId, SourceTxId},
};

/// Creates the outputs of a transaction.
///
/// Every output must be a [`SourceOutput::Transfer`] with exactly one owner address. The first
/// violation fails the whole call and no partial result is returned.
pub fn build_outputs(
    codec: &AddressCodec,
    tx_id: SourceTxId,
    outs: &[SourceOutput],
) -> Result<Vec<TxOutput>, ReconstructError> {
    outs.iter()
        .enumerate()
        .map(|(index, out)| {
            let index = index as u32;
            let malformed = |reason| ReconstructError::MalformedTransaction {
                tx_id,
                output_index: index,
                reason,
            };

            let SourceOutput::Transfer(transfer) = out else {
                return Err(malformed(MalformedReason::UnsupportedKind(out.kind_name())));
            };
            let owner = single_owner(&transfer.owners).ok_or_else(|| {
                malformed(MalformedReason::OwnerCount(transfer.owners.addresses.len()))
            })?;

            Ok(TxOutput {
                tx_id,
                index,
                amount: transfer.amount,
                address: codec.format(owner)?,
            })
        })
        .collect()
}

/// Creates the inputs of a transaction.
///
/// The addresses of the inputs are intentionally left unset. They must be filled in by the caller
/// from cached outputs, stored outputs or a chain lookup of the referenced transaction.
pub fn build_inputs(tx_id: SourceTxId, base: &BaseTx) -> Vec<TxInput> {
    base.inputs
        .iter()
        .map(|input| TxInput {
            tx_id,
            out_tx_id: input.tx_id,
            out_index: input.output_index,
            address: None,
        })
        .collect()
}

/// Returns the address of a reward owner.
///
/// Only secp256k1 owners with exactly one address are supported.
pub fn resolve_reward_owner_address(
    codec: &AddressCodec,
    owner: &RewardOwner,
) -> Result<String, ReconstructError> {
    match owner {
        RewardOwner::Secp256k1(owners) => {
            let address = single_owner(owners).ok_or_else(|| {
                ReconstructError::UnsupportedOwnerShape(format!(
                    "reward owner has {} addresses, expected exactly one",
                    owners.addresses.len()
                ))
            })?;

            Ok(codec.format(address)?)
        }
        RewardOwner::Unsupported { name } => Err(ReconstructError::UnsupportedOwnerShape(
            format!("reward owner has unsupported type {name}"),
        )),
    }
}

fn single_owner(owners: &OutputOwners) -> Option<&ShortId> {
    match owners.addresses.as_slice() {
        [address] => Some(address),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tx::{SourceInput, TransferOutput};

    fn codec() -> AddressCodec {
        AddressCodec::new("P", "costwo").unwrap()
    }

    fn transfer(amount: u64, addresses: Vec<ShortId>) -> SourceOutput {
        SourceOutput::Transfer(TransferOutput {
            amount,
            owners: OutputOwners {
                locktime: 0,
                threshold: 1,
                addresses,
            },
        })
    }

    #[test]
    fn test_build_outputs_preserves_amount_and_address() {
        let tx_id = SourceTxId::new([9; 32]);
        let owner = ShortId::new([4; 20]);
        let outs = vec![transfer(5, vec![owner]), transfer(7, vec![owner])];

        let built = build_outputs(&codec(), tx_id, &outs).unwrap();

        assert_eq!(built.len(), 2);
        assert_eq!(built[1].index, 1);
        assert_eq!(built[1].amount, 7);
        assert_eq!(built[1].tx_id, tx_id);
        assert_eq!(codec().parse(&built[0].address).unwrap(), owner);
    }

    #[test]
    fn test_build_outputs_rejects_unsupported_kind() {
        let tx_id = SourceTxId::new([9; 32]);
        let owner = ShortId::new([4; 20]);
        let outs = vec![
            transfer(5, vec![owner]),
            SourceOutput::Mint(OutputOwners::single(owner)),
        ];

        let err = build_outputs(&codec(), tx_id, &outs).unwrap_err();

        assert_eq!(
            err,
            ReconstructError::MalformedTransaction {
                tx_id,
                output_index: 1,
                reason: MalformedReason::UnsupportedKind("mint"),
            }
        );
    }

    #[test]
    fn test_build_outputs_rejects_stakeable_locked() {
        let owner = ShortId::new([4; 20]);
        let outs = vec![SourceOutput::StakeableLocked {
            locktime: 100,
            transfer: TransferOutput {
                amount: 1,
                owners: OutputOwners::single(owner),
            },
        }];

        assert!(matches!(
            build_outputs(&codec(), SourceTxId::default(), &outs),
            Err(ReconstructError::MalformedTransaction {
                reason: MalformedReason::UnsupportedKind("stakeable_locked"),
                ..
            })
        ));
    }

    #[test]
    fn test_build_inputs_references_outputs() {
        let tx_id = SourceTxId::new([1; 32]);
        let base = BaseTx {
            inputs: vec![
                SourceInput {
                    tx_id: SourceTxId::new([2; 32]),
                    output_index: 3,
                },
                SourceInput {
                    tx_id: SourceTxId::new([4; 32]),
                    output_index: 0,
                },
            ],
            outputs: vec![],
        };

        let inputs = build_inputs(tx_id, &base);

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].out_tx_id, SourceTxId::new([2; 32]));
        assert_eq!(inputs[0].out_index, 3);
        assert_eq!(inputs[1].tx_id, tx_id);
    }

    #[test]
    fn test_reward_owner() {
        let owner = ShortId::new([8; 20]);

        let reward_owner = RewardOwner::Secp256k1(OutputOwners::single(owner));
        let address = resolve_reward_owner_address(&codec(), &reward_owner).unwrap();
        assert_eq!(codec().parse(&address).unwrap(), owner);

        let multi = RewardOwner::Secp256k1(OutputOwners {
            locktime: 0,
            threshold: 1,
            addresses: vec![owner, owner],
        });
        assert!(matches!(
            resolve_reward_owner_address(&codec(), &multi),
            Err(ReconstructError::UnsupportedOwnerShape(_))
        ));

        let foreign = RewardOwner::Unsupported {
            name: "nftfx.OutputOwners".to_string(),
        };
        assert!(matches!(
            resolve_reward_owner_address(&codec(), &foreign),
            Err(ReconstructError::UnsupportedOwnerShape(_))
        ));
    }

    fn arb_short_id() -> impl Strategy<Value = ShortId> {
        any::<[u8; 20]>().prop_map(ShortId::new)
    }

    proptest! {
        #[test]
        fn proptest_single_owner_outputs_are_preserved(
            outs in prop::collection::vec((any::<u64>(), arb_short_id()), 0..16),
        ) {
            let tx_id = SourceTxId::new([5; 32]);
            let raw: Vec<SourceOutput> = outs
                .iter()
                .map(|(amount, owner)| transfer(*amount, vec![*owner]))
                .collect();

            let built = build_outputs(&codec(), tx_id, &raw).unwrap();

            prop_assert_eq!(built.len(), outs.len());
            for (output, (amount, owner)) in built.iter().zip(&outs) {
                prop_assert_eq!(output.amount, *amount);
                prop_assert_eq!(codec().parse(&output.address).unwrap(), *owner);
            }
        }

        #[test]
        fn proptest_wrong_owner_count_fails_without_partial_result(
            prefix in 0usize..8,
            owners in prop::collection::vec(arb_short_id(), 0..5)
                .prop_filter("must not be exactly one owner", |owners| owners.len() != 1),
        ) {
            let tx_id = SourceTxId::new([6; 32]);
            let good = ShortId::new([1; 20]);
            let mut raw: Vec<SourceOutput> =
                (0..prefix).map(|i| transfer(i as u64, vec![good])).collect();
            let owner_count = owners.len();
            raw.push(transfer(1, owners));

            let result = build_outputs(&codec(), tx_id, &raw);

            prop_assert_eq!(
                result,
                Err(ReconstructError::MalformedTransaction {
                    tx_id,
                    output_index: prefix as u32,
                    reason: MalformedReason::OwnerCount(owner_count),
                })
            );
        }

        #[test]
        fn proptest_inputs_never_carry_addresses(
            refs in prop::collection::vec((any::<[u8; 32]>(), any::<u32>()), 0..16),
        ) {
            let base = BaseTx {
                inputs: refs
                    .iter()
                    .map(|(id, index)| SourceInput {
                        tx_id: SourceTxId::new(*id),
                        output_index: *index,
                    })
                    .collect(),
                outputs: vec![],
            };

            let inputs = build_inputs(SourceTxId::default(), &base);

            prop_assert_eq!(inputs.len(), refs.len());
            prop_assert!(inputs.iter().all(|input| input.address.is_none()));
        }
    }
}
