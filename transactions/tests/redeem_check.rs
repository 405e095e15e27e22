mod common;

use common::{address, alice, bob, keys, Env, ABC};
use strata_transactions::commission::commission_in_base;
use strata_transactions::redeem_check::{self, RedeemCheckData};
use strata_transactions::{Check, Code, Transaction, TxData};
use strata_types::{bip_to_pip, ChainId, CoinId, KeyPair};

const PASSPHRASE: &str = "open sesame";

fn issue(issuer: &KeyPair, nonce: &[u8], due_block: u64, value: u128, gas_coin: CoinId) -> Vec<u8> {
    Check::new(nonce.to_vec(), ChainId::Testnet, due_block, CoinId::BASE, value, gas_coin)
        .lock(&Check::lock_keys(PASSPHRASE))
        .unwrap()
        .sign(issuer)
        .unwrap()
        .encode()
        .unwrap()
}

fn redeem(redeemer: &KeyPair, nonce: u64, raw_check: Vec<u8>, passphrase: &str) -> Transaction {
    let lock = Check::lock_keys(passphrase);
    let proof = Check::proof(&lock.private, &address(redeemer));
    Transaction::new(
        nonce,
        ChainId::Testnet,
        CoinId::BASE,
        TxData::RedeemCheck(RedeemCheckData { raw_check, proof }),
    )
    .sign(redeemer)
    .unwrap()
}

#[test]
fn issuer_pays_value_and_commission() {
    let mut env = Env::new();
    let fee = commission_in_base(1, redeem_check::GAS).unwrap();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(10), CoinId::BASE);

    let resp = env.run(&redeem(&bob(), 1, raw, PASSPHRASE));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(env.balance(&bob(), CoinId::BASE), bip_to_pip(10));
    assert_eq!(
        env.balance(&alice(), CoinId::BASE),
        bip_to_pip(1_000_000) - bip_to_pip(10) - fee
    );
    assert_eq!(env.nonce(&bob()), 1);
    assert_eq!(env.nonce(&alice()), 0);
}

#[test]
fn a_check_redeems_only_once() {
    let mut env = Env::new();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(10), CoinId::BASE);
    assert!(env.run(&redeem(&bob(), 1, raw.clone(), PASSPHRASE)).is_ok());

    let resp = env.run(&redeem(&bob(), 2, raw.clone(), PASSPHRASE));
    assert_eq!(resp.code, Code::CheckUsed);

    // Another redeemer fares no better, and nothing survives a commit.
    env.state.commit().unwrap();
    let resp = env.run(&redeem(&keys(3), 1, raw, PASSPHRASE));
    assert_eq!(resp.code, Code::CheckUsed);
    assert_eq!(env.balance(&bob(), CoinId::BASE), bip_to_pip(10));
}

#[test]
fn expired_check_is_rejected_even_with_a_valid_signature() {
    let mut env = Env::new();
    env.ctx.height = 51;
    let raw = issue(&alice(), b"1", 50, bip_to_pip(1), CoinId::BASE);
    let resp = env.run(&redeem(&bob(), 1, raw, PASSPHRASE));
    assert_eq!(resp.code, Code::CheckExpired);
}

#[test]
fn check_is_still_valid_on_its_due_block() {
    let mut env = Env::new();
    env.ctx.height = 50;
    let raw = issue(&alice(), b"1", 50, bip_to_pip(1), CoinId::BASE);
    assert!(env.run(&redeem(&bob(), 1, raw, PASSPHRASE)).is_ok());
}

#[test]
fn wrong_passphrase_fails_the_lock() {
    let mut env = Env::new();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(1), CoinId::BASE);
    let resp = env.run(&redeem(&bob(), 1, raw, "guess"));
    assert_eq!(resp.code, Code::CheckInvalidLock);
}

#[test]
fn proof_is_bound_to_the_redeemer() {
    let mut env = Env::new();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(1), CoinId::BASE);
    let lock = Check::lock_keys(PASSPHRASE);
    let stolen = Check::proof(&lock.private, &address(&bob()));
    let tx = Transaction::new(
        1,
        ChainId::Testnet,
        CoinId::BASE,
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: raw,
            proof: stolen,
        }),
    )
    .sign(&keys(3))
    .unwrap();
    assert_eq!(env.run(&tx).code, Code::CheckInvalidLock);
}

#[test]
fn redeemer_cannot_raise_the_gas_price() {
    let mut env = Env::new();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(1), CoinId::BASE);
    let lock = Check::lock_keys(PASSPHRASE);
    let mut tx = Transaction::new(
        1,
        ChainId::Testnet,
        CoinId::BASE,
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: raw,
            proof: Check::proof(&lock.private, &address(&bob())),
        }),
    );
    tx.gas_price = 2;
    let tx = tx.sign(&bob()).unwrap();
    assert_eq!(env.run(&tx).code, Code::TooHighGasPrice);
}

#[test]
fn gas_coin_must_match_the_check() {
    let mut env = Env::new();
    let raw = issue(&alice(), b"1", 100, bip_to_pip(1), ABC);
    let resp = env.run(&redeem(&bob(), 1, raw, PASSPHRASE));
    assert_eq!(resp.code, Code::WrongGasCoin);
}

#[test]
fn long_nonce_is_rejected() {
    let mut env = Env::new();
    let raw = issue(&alice(), &[1; 17], 100, bip_to_pip(1), CoinId::BASE);
    let resp = env.run(&redeem(&bob(), 1, raw, PASSPHRASE));
    assert_eq!(resp.code, Code::TooLongNonce);
}

#[test]
fn broke_issuer_cannot_back_a_check() {
    let mut env = Env::new();
    let raw = issue(&keys(4), b"1", 100, bip_to_pip(1), CoinId::BASE);
    let resp = env.run(&redeem(&bob(), 1, raw, PASSPHRASE));
    assert_eq!(resp.code, Code::InsufficientFunds);
    assert_eq!(env.nonce(&bob()), 0);
}
