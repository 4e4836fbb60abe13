pub use super::{
    gateway::{FakeGateway, GatewayWrite},
    tx::{
        generate_funded_stake, generate_funded_stake_for, generate_keypair, generate_short_id,
        generate_source_tx, generate_tx_id, FundedStake, TEST_CHAIN_ALIAS, TEST_HRP,
    },
};
