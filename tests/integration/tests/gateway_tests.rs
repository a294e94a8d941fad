//! End-to-end gateway tests
//!
//! Run the session manager against a scripted mock gateway.

use std::time::{Duration, Instant};

use bot_api::{ApiClient, ApiClientConfig};
use bot_core::{Intents, Message, MessageToCreate};
use bot_gateway::{EventEnvelope, EventRouter, SessionManager};
use integration_tests::*;

#[tokio::test]
async fn test_identify_carries_shard_and_intents() {
    let mut gateway = MockGateway::start().await.unwrap();
    let (router, _rx) = recording_router();
    let intents = router.intents();
    let manager = SessionManager::new(test_manager_config(), router);
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 2, 1), intents);

    let mut shards = Vec::new();
    for _ in 0..2 {
        let mut conn = gateway.next_connection().await.unwrap();
        let identify = conn.accept_handshake(45_000).await.unwrap();

        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "102001.s3cret");
        assert_eq!(identify["d"]["intents"], Intents::PUBLIC_GUILD_MESSAGES.bits());
        assert_eq!(identify["d"]["shard"][1], 2);
        shards.push(identify["d"]["shard"][0].as_u64().unwrap());
    }

    shards.sort_unstable();
    assert_eq!(shards, vec![0, 1]);
}

#[tokio::test]
async fn test_empty_intents_identify_with_guilds() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::empty());

    let mut conn = gateway.next_connection().await.unwrap();
    let identify = conn.accept_handshake(45_000).await.unwrap();

    assert_eq!(identify["d"]["intents"], Intents::GUILDS.bits());
}

#[tokio::test]
async fn test_dropped_connection_resumes_from_last_seq() {
    let mut gateway = MockGateway::start().await.unwrap();
    let (router, mut rx) = recording_router();
    let intents = router.intents();
    let manager = SessionManager::new(test_manager_config(), router);
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), intents);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    first.send_json(&ready(1, "sess-1", [0, 1])).await.unwrap();
    first.send_json(&at_message(5, "m-5", "c-1", "<@!1> hi")).await.unwrap();

    let (_, message) = rx.recv().await.unwrap();
    assert_eq!(message.id, "m-5");
    drop(first);

    let mut second = gateway.next_connection().await.unwrap();
    let resume = second.recv_json().await.unwrap();

    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-1");
    assert_eq!(resume["d"]["seq"], 5);
    assert_eq!(resume["d"]["token"], "102001.s3cret");
}

#[tokio::test]
async fn test_drop_before_ready_identifies_again() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::GUILDS);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    drop(first);

    let mut second = gateway.next_connection().await.unwrap();
    let handshake = second.recv_json().await.unwrap();
    assert_eq!(handshake["op"], 2);
}

#[tokio::test]
async fn test_handler_panic_reconnects_once() {
    let mut gateway = MockGateway::start().await.unwrap();
    let router = EventRouter::new().on_at_message(|_event: EventEnvelope, message: Message| async move {
        if message.content.contains("boom") {
            panic!("handler exploded on {}", message.id);
        }
        Ok::<(), anyhow::Error>(())
    });
    let intents = router.intents();
    let manager = SessionManager::new(test_manager_config(), router);
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), intents);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    first.send_json(&ready(1, "sess-p", [0, 1])).await.unwrap();
    first.send_json(&at_message(2, "m-2", "c-1", "boom")).await.unwrap();
    assert!(first.wait_closed().await);

    let mut second = gateway.next_connection().await.unwrap();
    let resume = second.accept_handshake(45_000).await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-p");
    assert_eq!(resume["d"]["seq"], 2);

    assert!(gateway.no_connection_within(Duration::from_millis(500)).await);
    assert_eq!(gateway.accepted(), 2);
}

#[tokio::test]
async fn test_unrouted_events_are_ignored() {
    let mut gateway = MockGateway::start().await.unwrap();
    let (router, mut rx) = recording_router();
    let intents = router.intents();
    let manager = SessionManager::new(test_manager_config(), router);
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), intents);

    let mut conn = gateway.next_connection().await.unwrap();
    conn.accept_handshake(45_000).await.unwrap();
    conn.send_json(&ready(1, "sess-u", [0, 1])).await.unwrap();
    conn.send_json(&message_event("DIRECT_MESSAGE_CREATE", 2, "dm-1", "c-1", "psst"))
        .await
        .unwrap();
    conn.send_json(&serde_json::json!({"op": 0, "s": 3, "t": "GUILD_CREATE", "d": {"id": "g-1"}}))
        .await
        .unwrap();
    conn.send_json(&heartbeat_ack()).await.unwrap();
    conn.send_json(&at_message(4, "m-4", "c-1", "<@!1> hello"))
        .await
        .unwrap();

    let (event, message) = rx.recv().await.unwrap();
    assert_eq!(event.as_deref(), Some("AT_MESSAGE_CREATE"));
    assert_eq!(message.id, "m-4");

    assert!(gateway.no_connection_within(Duration::from_millis(300)).await);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_reconnect_op_resumes() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::GUILDS);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    first.send_json(&ready(7, "sess-r", [0, 1])).await.unwrap();
    first.send_json(&reconnect()).await.unwrap();

    let mut second = gateway.next_connection().await.unwrap();
    let resume = second.accept_handshake(45_000).await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-r");
    assert_eq!(resume["d"]["seq"], 7);

    second.send_json(&resumed(8)).await.unwrap();
}

#[tokio::test]
async fn test_invalid_session_reconnects() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::GUILDS);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    first.send_json(&invalid_session()).await.unwrap();
    assert!(first.wait_closed().await);

    let mut second = gateway.next_connection().await.unwrap();
    assert!(second.recv_json().await.is_some());
}

#[tokio::test]
async fn test_close_code_reconnects_with_resume() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::GUILDS);

    let mut first = gateway.next_connection().await.unwrap();
    first.accept_handshake(45_000).await.unwrap();
    first.send_json(&ready(3, "sess-c", [0, 1])).await.unwrap();
    // Give the client time to apply Ready before the close frame arrives
    tokio::time::sleep(Duration::from_millis(100)).await;
    first.close_with(4009, "session timed out").await.unwrap();

    let mut second = gateway.next_connection().await.unwrap();
    let resume = second.recv_json().await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-c");
}

#[tokio::test]
async fn test_heartbeats_follow_hello_interval() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 1, 1), Intents::GUILDS);

    let mut conn = gateway.next_connection().await.unwrap();
    conn.accept_handshake(200).await.unwrap();
    conn.send_json(&ready(9, "sess-h", [0, 1])).await.unwrap();

    let start = Instant::now();
    let first = conn.recv_op(1).await.unwrap();
    let second = conn.recv_op(1).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(first["d"], 9);
    assert_eq!(second["d"], 9);
    assert!(elapsed >= Duration::from_millis(300), "heartbeats too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "heartbeats too slow: {elapsed:?}");
}

#[tokio::test]
async fn test_resume_signal_restarts_every_shard() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let signal = manager.resume_signal();
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 2, 1), Intents::GUILDS);

    let mut first_round = Vec::new();
    for n in 0..2u32 {
        let mut conn = gateway.next_connection().await.unwrap();
        let identify = conn.accept_handshake(45_000).await.unwrap();
        let shard = identify["d"]["shard"][0].as_u64().unwrap();
        conn.send_json(&ready(u64::from(n) + 1, &format!("sess-{shard}"), [shard as u32, 2]))
            .await
            .unwrap();
        first_round.push(conn);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    signal.trigger();

    let mut resumed_sessions = Vec::new();
    for _ in 0..2 {
        let mut conn = gateway.next_connection().await.unwrap();
        let resume = conn.recv_json().await.unwrap();
        assert_eq!(resume["op"], 6);
        resumed_sessions.push(resume["d"]["session_id"].as_str().unwrap().to_string());
    }
    resumed_sessions.sort();
    assert_eq!(resumed_sessions, vec!["sess-0", "sess-1"]);
}

#[tokio::test]
async fn test_shard_starts_are_paced() {
    let mut gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());
    let _task = spawn_manager(manager, gateway_info(&gateway.url, 3, 1), Intents::GUILDS);

    let mut arrivals = Vec::new();
    let mut held = Vec::new();
    for _ in 0..3 {
        let conn = gateway.next_connection().await.unwrap();
        arrivals.push(Instant::now());
        held.push(conn);
    }

    for pair in arrivals.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(80), "shards started {gap:?} apart");
    }
}

#[tokio::test]
async fn test_bootstrap_from_rest_and_reply() {
    let mut gateway = MockGateway::start().await.unwrap();
    let rest = MockRest::start(gateway_info(&gateway.url, 1, 1)).await.unwrap();
    let api = ApiClient::new(&ApiClientConfig::new(&rest.base_url), &test_token()).unwrap();

    let info = api.gateway_info().await.unwrap();
    assert_eq!(info.url, gateway.url);

    let replier = api.clone();
    let router = EventRouter::new().on_at_message(move |_event: EventEnvelope, message: Message| {
        let api = replier.clone();
        async move {
            let reply = MessageToCreate::text(message.content_without_mention()).reply_to(message.id.as_str());
            api.post_message(&message.channel_id, &reply).await?;
            Ok::<(), anyhow::Error>(())
        }
    });
    let intents = router.intents();
    let manager = SessionManager::new(test_manager_config(), router);
    let _task = spawn_manager(manager, info, intents);

    let mut conn = gateway.next_connection().await.unwrap();
    conn.accept_handshake(45_000).await.unwrap();
    conn.send_json(&ready(1, "sess-e", [0, 1])).await.unwrap();
    conn.send_json(&at_message(2, "m-2", "c-42", "<@!1> echo me"))
        .await
        .unwrap();

    let deadline = Instant::now() + WAIT;
    while rest.posted().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let posted = rest.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, "c-42");
    assert_eq!(posted[0].1["content"], "echo me");
    assert_eq!(posted[0].1["msg_id"], "m-2");
}

#[tokio::test]
async fn test_invalid_gateway_info_fails_start() {
    let gateway = MockGateway::start().await.unwrap();
    let manager = SessionManager::new(test_manager_config(), EventRouter::new());

    let result = spawn_manager(manager, gateway_info(&gateway.url, 0, 1), Intents::GUILDS)
        .await
        .unwrap();

    assert!(result.is_err());
    assert_eq!(gateway.accepted(), 0);
}
