mod common;

use common::{address, alice, bob, keys, signed, Env, ABC};
use strata_state::CandidateStatus;
use strata_transactions::commission::commission_in_base;
use strata_transactions::declare_candidacy::{self, DeclareCandidacyData};
use strata_transactions::delegate::{self, DelegateData};
use strata_transactions::edit_candidate::EditCandidateData;
use strata_transactions::sell_coin::{self, SellCoinData};
use strata_transactions::send::{self, SendData};
use strata_transactions::set_candidate_status::SetCandidateOnlineData;
use strata_transactions::unbond::{self, UnbondData};
use strata_transactions::{Code, SwapFrom, Transaction, TxData};
use strata_types::params::UNBOND_PERIOD;
use strata_types::{bip_to_pip, ChainId, CoinId};

fn send(to: &strata_types::KeyPair, coin: CoinId, value: u128) -> TxData {
    TxData::Send(SendData {
        coin,
        to: address(to),
        value,
    })
}

fn sell(coin_to_sell: CoinId, value: u128, coin_to_buy: CoinId, min: u128, swap_from: SwapFrom) -> TxData {
    TxData::SellCoin(SellCoinData {
        coin_to_sell,
        value_to_sell: value,
        coin_to_buy,
        min_value_to_buy: min,
        swap_from,
    })
}

#[test]
fn send_moves_value_and_collects_commission() {
    let mut env = Env::new();
    let fee = commission_in_base(1, send::GAS).unwrap();

    let resp = env.run(&signed(&alice(), 1, send(&bob(), CoinId::BASE, bip_to_pip(5))));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.gas_used, send::GAS);
    assert_eq!(resp.tag("tx.type"), Some("01"));

    assert_eq!(env.balance(&bob(), CoinId::BASE), bip_to_pip(5));
    assert_eq!(
        env.balance(&alice(), CoinId::BASE),
        bip_to_pip(1_000_000) - bip_to_pip(5) - fee
    );
    assert_eq!(env.nonce(&alice()), 1);
    assert_eq!(env.ctx.reward_pool, fee);
}

#[test]
fn commission_in_custom_coin_burns_through_the_curve() {
    let mut env = Env::new();
    let fee = commission_in_base(1, send::GAS).unwrap();
    let coin = env.state.coins.require(ABC).unwrap();
    let charged = coin.sale_amount(fee).unwrap();

    let tx = Transaction::new(1, ChainId::Testnet, ABC, send(&bob(), ABC, bip_to_pip(1)))
        .sign(&alice())
        .unwrap();
    let resp = env.run(&tx);
    assert!(resp.is_ok(), "{}", resp.log);

    let after = env.state.coins.require(ABC).unwrap();
    assert_eq!(after.volume, coin.volume - charged);
    assert_eq!(after.reserve, coin.reserve - fee);
    assert_eq!(
        env.balance(&alice(), ABC),
        bip_to_pip(1_000_000) - bip_to_pip(1) - charged
    );
    env.state.check_invariants().unwrap();
}

#[test]
fn rejected_send_leaves_state_untouched() {
    let mut env = Env::new();
    let resp = env.run(&signed(&bob(), 1, send(&alice(), CoinId::BASE, 1)));
    assert_eq!(resp.code, Code::InsufficientFunds);
    assert_eq!(env.nonce(&bob()), 0);
    assert_eq!(env.ctx.reward_pool, 0);

    let resp = env.run(&signed(&alice(), 1, send(&bob(), CoinId(9), 1)));
    assert_eq!(resp.code, Code::CoinNotExists);
    assert_eq!(env.nonce(&alice()), 0);
}

#[test]
fn sell_through_the_curve_returns_the_quoted_amount() {
    let mut env = Env::new();
    let coin = env.state.coins.require(ABC).unwrap();
    let expected = coin.sale_return(bip_to_pip(100)).unwrap();
    let base_before = env.balance(&alice(), CoinId::BASE);
    let fee = commission_in_base(1, sell_coin::GAS).unwrap();

    let resp = env.run(&signed(
        &alice(),
        1,
        sell(ABC, bip_to_pip(100), CoinId::BASE, expected, SwapFrom::Optimal),
    ));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.tag("tx.source"), Some("bancor"));
    assert_eq!(resp.tag("tx.return"), Some(expected.to_string().as_str()));

    assert_eq!(env.balance(&alice(), CoinId::BASE), base_before + expected - fee);
    let after = env.state.coins.require(ABC).unwrap();
    assert_eq!(after.volume, coin.volume - bip_to_pip(100));
    assert_eq!(after.reserve, coin.reserve - expected);
    env.state.check_invariants().unwrap();
}

#[test]
fn sell_below_minimum_is_rejected() {
    let mut env = Env::new();
    let expected = env
        .state
        .coins
        .require(ABC)
        .unwrap()
        .sale_return(bip_to_pip(100))
        .unwrap();

    let resp = env.run(&signed(
        &alice(),
        1,
        sell(ABC, bip_to_pip(100), CoinId::BASE, expected + 1, SwapFrom::Optimal),
    ));
    assert_eq!(resp.code, Code::MinimumValueToBuyReached);
    assert_eq!(env.balance(&alice(), ABC), bip_to_pip(1_000_000));
}

#[test]
fn sell_into_the_same_coin_is_a_cross_convert() {
    let mut env = Env::new();
    let resp = env.run(&signed(&alice(), 1, sell(ABC, 1, ABC, 0, SwapFrom::Optimal)));
    assert_eq!(resp.code, Code::CrossConvert);
}

#[test]
fn sell_from_a_missing_pool_is_rejected() {
    let mut env = Env::new();
    let resp = env.run(&signed(
        &alice(),
        1,
        sell(ABC, bip_to_pip(1), CoinId::BASE, 0, SwapFrom::Pool),
    ));
    assert_eq!(resp.code, Code::PairNotExists);
}

#[test]
fn optimal_sell_prefers_the_better_pool() {
    let mut env = Env::new();
    let owner = address(&alice());
    // The pool prices ABC at 2 base coins, the curve at about 1.
    env.state.accounts.sub_balance(&owner, ABC, bip_to_pip(1_000)).unwrap();
    env.state
        .accounts
        .sub_balance(&owner, CoinId::BASE, bip_to_pip(2_000))
        .unwrap();
    env.state
        .swap
        .create_pair(ABC, bip_to_pip(1_000), CoinId::BASE, bip_to_pip(2_000))
        .unwrap();

    let resp = env.run(&signed(
        &alice(),
        1,
        sell(ABC, bip_to_pip(1), CoinId::BASE, bip_to_pip(1), SwapFrom::Optimal),
    ));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.tag("tx.source"), Some("pool"));

    let pool = env.state.swap.pair(ABC, CoinId::BASE).unwrap().unwrap();
    let (abc_reserve, _) = pool.reserves_for(ABC);
    assert_eq!(abc_reserve, bip_to_pip(1_001));
    env.state.check_invariants().unwrap();
}

#[test]
fn candidacy_delegation_and_unbond() {
    let mut env = Env::new();
    let validator = keys(10).public;
    let owner = address(&alice());

    let declare = TxData::DeclareCandidacy(DeclareCandidacyData {
        reward_address: owner,
        pub_key: validator,
        commission: 10,
        coin: CoinId::BASE,
        stake: bip_to_pip(1_000),
    });
    let resp = env.run(&signed(&alice(), 1, declare.clone()));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.gas_used, declare_candidacy::GAS);

    let candidate = env.state.candidates.get_candidate(&validator).unwrap().unwrap();
    assert_eq!(candidate.status, CandidateStatus::Offline);
    assert_eq!(candidate.owner, owner);

    let resp = env.run(&signed(&alice(), 2, declare));
    assert_eq!(resp.code, Code::CandidateExists);

    let resp = env.run(&signed(
        &alice(),
        2,
        TxData::Delegate(DelegateData {
            pub_key: validator,
            coin: ABC,
            value: bip_to_pip(500),
        }),
    ));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.gas_used, delegate::GAS);
    env.state.check_invariants().unwrap();

    env.end_block();
    let stake = env
        .state
        .candidates
        .get_stake_of_address(&validator, &owner, CoinId::BASE)
        .unwrap()
        .unwrap();
    assert_eq!(stake.value, bip_to_pip(1_000));

    let resp = env.run(&signed(
        &alice(),
        3,
        TxData::Unbond(UnbondData {
            pub_key: validator,
            coin: CoinId::BASE,
            value: bip_to_pip(5_000),
        }),
    ));
    assert_eq!(resp.code, Code::InsufficientStake);

    let resp = env.run(&signed(
        &alice(),
        3,
        TxData::Unbond(UnbondData {
            pub_key: validator,
            coin: CoinId::BASE,
            value: bip_to_pip(400),
        }),
    ));
    assert!(resp.is_ok(), "{}", resp.log);
    assert_eq!(resp.gas_used, unbond::GAS);

    let release = env.ctx.height + UNBOND_PERIOD;
    assert_eq!(resp.tag("tx.release_height"), Some(release.to_string().as_str()));
    let frozen = env.state.frozen_funds.get_frozen_funds(release).unwrap();
    assert_eq!(frozen.len(), 1);
    assert_eq!(frozen[0].value, bip_to_pip(400));
    assert_eq!(frozen[0].owner, owner);
    env.state.check_invariants().unwrap();
}

#[test]
fn delegating_to_an_unknown_candidate_fails() {
    let mut env = Env::new();
    let resp = env.run(&signed(
        &alice(),
        1,
        TxData::Delegate(DelegateData {
            pub_key: keys(11).public,
            coin: CoinId::BASE,
            value: 1,
        }),
    ));
    assert_eq!(resp.code, Code::CandidateNotFound);
}

#[test]
fn commission_above_one_hundred_percent_is_rejected() {
    let mut env = Env::new();
    let resp = env.run(&signed(
        &alice(),
        1,
        TxData::DeclareCandidacy(DeclareCandidacyData {
            reward_address: address(&alice()),
            pub_key: keys(10).public,
            commission: 101,
            coin: CoinId::BASE,
            stake: 1,
        }),
    ));
    assert_eq!(resp.code, Code::WrongCommission);
}

#[test]
fn only_the_owner_edits_a_candidate() {
    let mut env = Env::new();
    let validator = keys(10).public;
    let resp = env.run(&signed(
        &alice(),
        1,
        TxData::DeclareCandidacy(DeclareCandidacyData {
            reward_address: address(&alice()),
            pub_key: validator,
            commission: 5,
            coin: CoinId::BASE,
            stake: bip_to_pip(10),
        }),
    ));
    assert!(resp.is_ok(), "{}", resp.log);
    // Bob needs base coin for the commission.
    let resp = env.run(&signed(&alice(), 2, send(&bob(), CoinId::BASE, bip_to_pip(100))));
    assert!(resp.is_ok(), "{}", resp.log);

    let edit = TxData::EditCandidate(EditCandidateData {
        pub_key: validator,
        reward_address: address(&bob()),
        owner_address: address(&bob()),
    });
    let resp = env.run(&signed(&bob(), 1, edit.clone()));
    assert_eq!(resp.code, Code::IsNotOwnerOfCandidate);

    let resp = env.run(&signed(&alice(), 3, edit));
    assert!(resp.is_ok(), "{}", resp.log);
    let candidate = env.state.candidates.get_candidate(&validator).unwrap().unwrap();
    assert_eq!(candidate.owner, address(&bob()));

    let online = TxData::SetCandidateOnline(SetCandidateOnlineData { pub_key: validator });
    let resp = env.run(&signed(&alice(), 4, online.clone()));
    assert_eq!(resp.code, Code::IsNotOwnerOfCandidate);
    let resp = env.run(&signed(&bob(), 1, online));
    assert!(resp.is_ok(), "{}", resp.log);
    assert!(env
        .state
        .candidates
        .get_candidate(&validator)
        .unwrap()
        .unwrap()
        .is_online());
}
