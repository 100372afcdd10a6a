//! Connection manager against an in-memory wallet provider.

mod common;

use common::{config, drain, state_after, FakeProvider, ACCOUNT};
use mint_gui::connection::{self, ConnectError};
use mint_gui::events::ServiceEvent;
use mint_gui::provider::ProviderCapability;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_absent_provider_leaves_account_empty() {
    let account = connection::check_existing_connection(&ProviderCapability::Absent).await;
    assert!(account.is_none());

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::restore(&ProviderCapability::Absent, &tx).await;
    let state = state_after(&drain(&mut rx));
    assert_eq!(state.active_account, "");
    assert!(!state.is_connected());
}

#[tokio::test]
async fn test_existing_account_is_adopted() {
    let (capability, _) = FakeProvider::default().into_capability();
    let account = connection::check_existing_connection(&capability).await;
    assert_eq!(account.as_deref(), Some(ACCOUNT));

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::restore(&capability, &tx).await;
    let state = state_after(&drain(&mut rx));
    assert_eq!(state.active_account, ACCOUNT);
}

#[tokio::test]
async fn test_first_of_several_accounts_is_adopted() {
    let (capability, _) = FakeProvider {
        authorized: vec![ACCOUNT.to_string(), "0xbb".to_string()],
        ..FakeProvider::default()
    }
    .into_capability();
    let account = connection::check_existing_connection(&capability).await;
    assert_eq!(account.as_deref(), Some(ACCOUNT));
}

#[tokio::test]
async fn test_no_authorized_accounts() {
    let (capability, _) = FakeProvider {
        authorized: Vec::new(),
        ..FakeProvider::default()
    }
    .into_capability();
    assert!(connection::check_existing_connection(&capability).await.is_none());
}

#[tokio::test]
async fn test_connect_with_zero_accounts_stays_disconnected() {
    let (capability, _) = FakeProvider {
        granted: Vec::new(),
        ..FakeProvider::default()
    }
    .into_capability();

    let result = connection::request_connection(&capability, &config()).await;
    assert!(matches!(result, Err(ConnectError::NoAccounts)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::connect(&capability, &config(), &tx).await;
    let events = drain(&mut rx);
    assert!(events.is_empty());
    assert!(!state_after(&events).is_connected());
}

#[tokio::test]
async fn test_connect_on_expected_network() {
    let (capability, _) = FakeProvider::default().into_capability();
    let connection = connection::request_connection(&capability, &config())
        .await
        .unwrap();
    assert_eq!(connection.account, ACCOUNT);
    assert_eq!(connection.chain_id, "0x4");
    assert!(!connection.wrong_network);

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::connect(&capability, &config(), &tx).await;
    let state = state_after(&drain(&mut rx));
    assert_eq!(state.active_account, ACCOUNT);
    assert!(state.warning.is_none());
}

#[tokio::test]
async fn test_wrong_network_still_connects_with_warning() {
    let (capability, _) = FakeProvider {
        chain_id: "0x1".to_string(),
        ..FakeProvider::default()
    }
    .into_capability();

    let connection = connection::request_connection(&capability, &config())
        .await
        .unwrap();
    assert!(connection.wrong_network);
    assert_eq!(connection.account, ACCOUNT);

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::connect(&capability, &config(), &tx).await;
    let events = drain(&mut rx);
    assert!(events.contains(&ServiceEvent::WrongNetwork {
        chain_id: "0x1".to_string(),
        expected: "0x4".to_string(),
    }));

    let state = state_after(&events);
    assert_eq!(state.active_account, ACCOUNT);
    assert!(state.warning.is_some());
    assert!(state.alert.is_none());
}

#[tokio::test]
async fn test_connect_without_provider_alerts() {
    let result = connection::request_connection(&ProviderCapability::Absent, &config()).await;
    assert!(matches!(result, Err(ConnectError::ProviderMissing)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::connect(&ProviderCapability::Absent, &config(), &tx).await;
    let state = state_after(&drain(&mut rx));
    assert!(state.alert.is_some());
    assert!(!state.is_connected());
}

#[tokio::test]
async fn test_rejected_connect_leaves_state_unchanged() {
    let (capability, _) = FakeProvider {
        reject_connect: true,
        ..FakeProvider::default()
    }
    .into_capability();

    match connection::request_connection(&capability, &config()).await {
        Err(ConnectError::Provider(e)) => assert!(e.is_user_rejection()),
        other => panic!("unexpected result: {:?}", other),
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    connection::connect(&capability, &config(), &tx).await;
    assert!(drain(&mut rx).is_empty());
}
