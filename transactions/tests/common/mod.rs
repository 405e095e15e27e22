#![allow(dead_code)]

use std::sync::Arc;

use strata_crypto::{derive_address, keypair_from_seed};
use strata_nullables::MemTree;
use strata_state::{Coin, GenesisAccount, GenesisBalance, GenesisState, State};
use strata_store::MutableTree;
use strata_transactions::{run_tx, Context, Response, Transaction, TxData};
use strata_types::{bip_to_pip, Address, ChainId, CoinId, CoinSymbol, KeyPair};

pub const ABC: CoinId = CoinId(1);

pub fn keys(n: u8) -> KeyPair {
    keypair_from_seed(&[n; 32])
}

pub fn address(keys: &KeyPair) -> Address {
    derive_address(&keys.public)
}

pub fn alice() -> KeyPair {
    keys(1)
}

pub fn bob() -> KeyPair {
    keys(2)
}

pub fn signed(keys: &KeyPair, nonce: u64, data: TxData) -> Transaction {
    Transaction::new(nonce, ChainId::Testnet, CoinId::BASE, data)
        .sign(keys)
        .unwrap()
}

/// A deliver view seeded with one custom coin; alice holds all of it plus
/// one million base coins.
pub struct Env {
    pub tree: Arc<dyn MutableTree>,
    pub state: State,
    pub ctx: Context,
}

impl Env {
    pub fn new() -> Self {
        let tree: Arc<dyn MutableTree> = Arc::new(MemTree::new());
        let mut state = State::new_deliver(Arc::clone(&tree)).unwrap();

        let mut genesis = GenesisState::default();
        genesis.app.coins_count = 1;
        genesis.coins.push(Coin {
            id: ABC,
            symbol: CoinSymbol::new("ABC").unwrap(),
            version: 0,
            name: "Abc".to_string(),
            volume: bip_to_pip(1_000_000),
            reserve: bip_to_pip(500_000),
            crr: 50,
            max_supply: bip_to_pip(1_000_000_000),
            owner: None,
        });
        genesis.accounts.push(GenesisAccount {
            address: address(&alice()),
            nonce: 0,
            balances: vec![
                GenesisBalance {
                    coin: CoinId::BASE,
                    value: bip_to_pip(1_000_000),
                },
                GenesisBalance {
                    coin: ABC,
                    value: bip_to_pip(1_000_000),
                },
            ],
        });
        state.import(&genesis).unwrap();
        state.commit().unwrap();

        Self {
            tree,
            state,
            ctx: Context::new(ChainId::Testnet, 1, 10),
        }
    }

    pub fn run(&mut self, tx: &Transaction) -> Response {
        let raw = tx.encode().unwrap();
        self.run_raw(&raw)
    }

    pub fn run_raw(&mut self, raw: &[u8]) -> Response {
        run_tx(&mut self.state, raw, &mut self.ctx).unwrap()
    }

    pub fn balance(&mut self, keys: &KeyPair, coin: CoinId) -> u128 {
        self.state
            .accounts
            .get_balance(&address(keys), coin)
            .unwrap()
    }

    pub fn nonce(&mut self, keys: &KeyPair) -> u64 {
        self.state.accounts.get_nonce(&address(keys)).unwrap()
    }

    /// Run end-of-block stake recalculation.
    pub fn end_block(&mut self) {
        let (candidates, mut bus) = self.state.candidates_and_bus();
        candidates.recalculate_stakes(&mut bus).unwrap();
    }
}
