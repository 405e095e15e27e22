#![allow(dead_code)]

use strata_crypto::{derive_address, keypair_from_seed, tm_address};
use strata_node::{Blockchain, NodeConfig};
use strata_state::{
    Candidate, CandidateStatus, Coin, GenesisAccount, GenesisBalance, GenesisCandidate,
    GenesisFrozenFund, GenesisState, FrozenFund, Stake,
};
use strata_transactions::send::SendData;
use strata_transactions::{Transaction, TxData};
use strata_types::{bip_to_pip, Address, ChainId, CoinId, CoinSymbol, KeyPair};

pub const ABC: CoinId = CoinId(1);

pub fn keys(n: u8) -> KeyPair {
    keypair_from_seed(&[n; 32])
}

pub fn address(n: u8) -> Address {
    derive_address(&keys(n).public)
}

/// Validator key of the genesis candidate.
pub fn validator() -> KeyPair {
    keys(50)
}

/// Account 1 holds base coin and all of ABC; account 2 has a frozen fund
/// due at height 2; one online candidate holds a base-coin stake.
pub fn genesis() -> GenesisState {
    let mut genesis = GenesisState::default();
    genesis.app.coins_count = 1;
    genesis.coins.push(Coin {
        id: ABC,
        symbol: CoinSymbol::new("ABC").unwrap(),
        version: 0,
        name: "Abc".to_string(),
        volume: bip_to_pip(100_000),
        reserve: bip_to_pip(100_000),
        crr: 100,
        max_supply: bip_to_pip(1_000_000),
        owner: None,
    });
    genesis.accounts.push(GenesisAccount {
        address: address(1),
        nonce: 0,
        balances: vec![
            GenesisBalance {
                coin: CoinId::BASE,
                value: bip_to_pip(1_000),
            },
            GenesisBalance {
                coin: ABC,
                value: bip_to_pip(100_000),
            },
        ],
    });

    let pubkey = validator().public;
    let mut stake = Stake::new(address(1), CoinId::BASE, bip_to_pip(500));
    stake.bip_value = bip_to_pip(500);
    genesis.candidates.push(GenesisCandidate {
        candidate: Candidate {
            pubkey,
            owner: address(1),
            reward_address: address(1),
            commission: 10,
            status: CandidateStatus::Online,
            tm_address: tm_address(&pubkey),
            created_at_block: 0,
            updates: Vec::new(),
        },
        stakes: vec![stake],
        total_stake: bip_to_pip(500),
    });
    genesis.frozen_funds.push(GenesisFrozenFund {
        height: 2,
        fund: FrozenFund {
            owner: address(2),
            candidate: pubkey,
            coin: CoinId::BASE,
            value: bip_to_pip(7),
        },
    });
    genesis
}

pub fn chain(config: NodeConfig) -> Blockchain {
    let mut chain = Blockchain::in_memory(config).unwrap();
    chain.init_chain(&genesis()).unwrap();
    chain
}

pub fn send(from: u8, nonce: u64, to: u8, value: u128) -> Vec<u8> {
    Transaction::new(
        nonce,
        ChainId::Testnet,
        CoinId::BASE,
        TxData::Send(SendData {
            coin: CoinId::BASE,
            to: address(to),
            value,
        }),
    )
    .sign(&keys(from))
    .unwrap()
    .encode()
    .unwrap()
}

/// Run a whole block and return its root hash.
pub fn block(chain: &mut Blockchain, height: u64, txs: &[Vec<u8>]) -> strata_types::Hash {
    chain.begin_block(height, &[]).unwrap();
    for raw in txs {
        let resp = chain.deliver_tx(raw).unwrap();
        assert!(resp.is_ok(), "{}", resp.log);
    }
    chain.end_block().unwrap();
    chain.commit().unwrap()
}
