mod common;

use common::{block, chain, send};
use strata_node::{Blockchain, NodeConfig, NodeError};

fn chain_with_blocks(n: u64) -> Blockchain {
    let mut chain = chain(NodeConfig::default());
    for height in 1..=n {
        block(&mut chain, height, &[send(1, height, 2, 1)]);
    }
    chain
}

#[tokio::test]
async fn exports_each_requested_height() {
    let chain = chain_with_blocks(3);
    let exported = chain.manager().export_states(2, 3).await.unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].0, 2);
    assert_eq!(exported[0].1.app.height, 2);
    assert_eq!(exported[1].1.app.height, 3);
    let account = exported[1]
        .1
        .accounts
        .iter()
        .find(|a| a.address == common::address(1))
        .unwrap();
    assert_eq!(account.nonce, 3);
}

#[tokio::test]
async fn exported_state_starts_a_new_chain() {
    let chain = chain_with_blocks(2);
    let (_, genesis) = chain.manager().export_states(2, 2).await.unwrap().remove(0);

    let mut next = Blockchain::in_memory(NodeConfig::default()).unwrap();
    next.init_chain(&genesis).unwrap();
    block(&mut next, 3, &[send(1, 3, 2, 1)]);
    assert_eq!(next.height(), 3);
    assert!(matches!(
        next.state_for_height(2),
        Err(NodeError::HeightNotAvailable(2))
    ));
    let status = next.manager().status().await.unwrap();
    assert_eq!(status.latest_height, 3);
    assert_eq!(status.oldest_height, Some(3));
}

#[tokio::test]
async fn bad_ranges_are_rejected() {
    let chain = chain_with_blocks(1);
    let manager = chain.manager();
    assert!(matches!(
        manager.export_states(3, 2).await,
        Err(NodeError::InvalidRange { from: 3, to: 2 })
    ));
    assert!(matches!(
        manager.export_states(0, 1).await,
        Err(NodeError::InvalidRange { .. })
    ));
    assert!(matches!(
        manager.export_states(1, 4).await,
        Err(NodeError::HeightNotAvailable(2))
    ));
}

#[tokio::test]
async fn pruning_keeps_the_latest_height() {
    let chain = chain_with_blocks(4);
    let manager = chain.manager();

    let pruned = manager.prune_states(1, 10).await.unwrap();
    assert_eq!(pruned, vec![1, 2, 3]);
    assert!(matches!(
        chain.state_for_height(2),
        Err(NodeError::HeightNotAvailable(2))
    ));
    assert!(chain.state_for_height(4).is_ok());

    let status = manager.status().await.unwrap();
    assert_eq!(status.latest_height, 4);
    assert_eq!(status.latest_hash, chain.root_hash());
    assert_eq!(status.oldest_height, Some(4));
    assert_eq!(status.stored_states, 1);
}

#[tokio::test]
async fn window_pruning_keeps_the_newest_heights() {
    let chain = chain_with_blocks(5);
    let manager = chain.manager();
    assert!(manager.prune_to_window(0).await.unwrap().is_empty());
    assert_eq!(manager.prune_to_window(2).await.unwrap(), vec![1, 2, 3]);
    assert_eq!(manager.status().await.unwrap().oldest_height, Some(4));
    assert!(manager.prune_to_window(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn export_runs_while_blocks_continue() {
    let mut chain = chain_with_blocks(2);
    let manager = chain.manager();
    let job = tokio::spawn(async move { manager.export_states(1, 2).await });
    block(&mut chain, 3, &[send(1, 3, 2, 1)]);
    let exported = job.await.unwrap().unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(chain.height(), 3);
}
