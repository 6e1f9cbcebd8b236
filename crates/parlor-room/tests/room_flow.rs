//! Integration tests for the registry + room actors, with unbounded
//! channels standing in for connected clients.

use parlor_protocol::{
    GameKind, GameSnapshot, HandSign, Role, RoomPhase, ServerEvent, Verdict,
};
use parlor_room::{RoomError, RoomRegistry};
use parlor_session::EventSender;
use parlor_transport::ConnectionId;
use tokio::sync::mpsc;

type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn client() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

fn drain(rx: &mut EventReceiver) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Creates a room and seats both players; returns their receivers drained
/// up to the match start.
async fn seated_pair(
    registry: &mut RoomRegistry,
    kind: GameKind,
) -> (parlor_protocol::RoomId, EventReceiver, EventReceiver) {
    let room = registry.create(None, kind);
    let (tx1, mut rx1) = client();
    let (tx2, mut rx2) = client();
    registry
        .join(conn(1), "ada", room, false, true, tx1)
        .await
        .unwrap();
    registry
        .join(conn(2), "bob", room, false, false, tx2)
        .await
        .unwrap();
    drain(&mut rx1);
    drain(&mut rx2);
    (room, rx1, rx2)
}

#[tokio::test]
async fn create_generates_six_digit_ids() {
    let mut registry = RoomRegistry::new();
    let a = registry.create(None, GameKind::TicTacToe);
    let b = registry.create(None, GameKind::TicTacToe);
    assert_ne!(a, b);
    assert!((100_000..1_000_000).contains(&a.0));
    assert_eq!(registry.room_count(), 2);
}

#[tokio::test]
async fn join_unknown_room_fails() {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = client();
    let result = registry
        .join(conn(1), "ada", parlor_protocol::RoomId(999_999), false, false, tx)
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn one_room_at_a_time() {
    let mut registry = RoomRegistry::new();
    let r1 = registry.create(None, GameKind::TicTacToe);
    let r2 = registry.create(None, GameKind::TicTacToe);

    let (tx, _rx) = client();
    registry.join(conn(1), "ada", r1, false, false, tx).await.unwrap();

    let (tx, _rx) = client();
    let result = registry.join(conn(1), "ada", r2, false, false, tx).await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(id)) if id == r1));
}

#[tokio::test]
async fn creator_gets_room_created_and_joiner_gets_role() {
    let mut registry = RoomRegistry::new();
    let room = registry.create(Some("den".into()), GameKind::TicTacToe);

    let (tx1, mut rx1) = client();
    registry.join(conn(1), "ada", room, false, true, tx1).await.unwrap();
    let events = drain(&mut rx1);
    assert!(matches!(
        &events[0],
        ServerEvent::RoomCreated { role: Role::X, name, .. } if name == "den"
    ));
    assert!(matches!(&events[1], ServerEvent::StateSync { snapshot }
        if snapshot.phase == RoomPhase::Waiting));

    let (tx2, mut rx2) = client();
    registry.join(conn(2), "bob", room, false, false, tx2).await.unwrap();
    let events = drain(&mut rx2);
    // Seat first, then the start broadcast, then the state sync.
    assert!(matches!(
        &events[0],
        ServerEvent::RoleAssigned { role: Role::O, players, .. } if players.len() == 2
    ));
    assert!(matches!(
        &events[1],
        ServerEvent::MatchStarted { first_turn: Role::X, .. }
    ));
    assert!(matches!(&events[2], ServerEvent::StateSync { snapshot }
        if snapshot.phase == RoomPhase::InProgress));

    // The waiting creator saw the start too.
    let events = drain(&mut rx1);
    assert!(events
        .iter()
        .any(|e| matches!(e, ServerEvent::MatchStarted { .. })));
}

#[tokio::test]
async fn spectator_can_join_a_running_match() {
    let mut registry = RoomRegistry::new();
    let (room, _rx1, _rx2) = seated_pair(&mut registry, GameKind::TicTacToe).await;

    let (tx, mut rx) = client();
    registry.join(conn(9), "eve", room, true, false, tx).await.unwrap();
    let events = drain(&mut rx);
    assert!(matches!(
        &events[0],
        ServerEvent::SpectatorJoined { snapshot }
            if snapshot.phase == RoomPhase::InProgress
                && snapshot.spectators == vec!["eve".to_string()]
    ));
}

#[tokio::test]
async fn third_player_cannot_join_a_running_match() {
    let mut registry = RoomRegistry::new();
    let (room, _rx1, _rx2) = seated_pair(&mut registry, GameKind::TicTacToe).await;

    let (tx, _rx) = client();
    let result = registry.join(conn(3), "eve", room, false, false, tx).await;
    assert!(matches!(result, Err(RoomError::MatchInProgress)));
}

#[tokio::test]
async fn moves_broadcast_state_to_everyone() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, mut rx2) =
        seated_pair(&mut registry, GameKind::TicTacToe).await;

    let handle = registry.handle(room).unwrap();
    let record = handle.make_move(conn(1), 4, Role::X).await.unwrap();
    assert!(record.is_none());

    for rx in [&mut rx1, &mut rx2] {
        let events = drain(rx);
        let ServerEvent::StateSync { snapshot } = &events[0] else {
            panic!("expected state sync, got {:?}", events[0]);
        };
        let GameSnapshot::TicTacToe { board, turn, .. } = &snapshot.game else {
            panic!("wrong snapshot variant");
        };
        assert_eq!(board[4], Some(Role::X));
        assert_eq!(*turn, Role::O);
    }
}

#[tokio::test]
async fn rejected_moves_reach_only_the_caller() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, mut rx2) =
        seated_pair(&mut registry, GameKind::TicTacToe).await;

    let handle = registry.handle(room).unwrap();
    // O tries to act first.
    let result = handle.make_move(conn(2), 0, Role::O).await;
    assert!(result.is_err());

    // Nothing was broadcast for the failed move.
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn finished_match_returns_a_record() {
    let mut registry = RoomRegistry::new();
    let (room, _rx1, _rx2) = seated_pair(&mut registry, GameKind::TicTacToe).await;
    let handle = registry.handle(room).unwrap();

    handle.make_move(conn(1), 0, Role::X).await.unwrap();
    handle.make_move(conn(2), 3, Role::O).await.unwrap();
    handle.make_move(conn(1), 1, Role::X).await.unwrap();
    handle.make_move(conn(2), 4, Role::O).await.unwrap();
    let record = handle.make_move(conn(1), 2, Role::X).await.unwrap().unwrap();

    assert_eq!(record.verdict, Verdict::X);
    assert_eq!(record.roster.len(), 2);
}

#[tokio::test]
async fn rps_round_resolves_and_broadcasts() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, mut rx2) =
        seated_pair(&mut registry, GameKind::RockPaperScissors).await;
    let handle = registry.handle(room).unwrap();

    let reply = handle.submit_choice(conn(1), HandSign::Rock).await.unwrap();
    assert!(reply.record.is_none());
    assert_eq!(reply.round, 1);
    // A lone submission broadcasts nothing.
    assert!(drain(&mut rx2).is_empty());

    let reply = handle
        .submit_choice(conn(2), HandSign::Scissors)
        .await
        .unwrap();
    let record = reply.record.unwrap();
    assert_eq!(record.verdict, Verdict::X);

    for rx in [&mut rx1, &mut rx2] {
        let events = drain(rx);
        assert!(matches!(
            &events[0],
            ServerEvent::RoundResult { result } if result.round == 1
                && result.verdict == Verdict::X
        ));
    }
}

#[tokio::test]
async fn restart_alternates_the_first_actor() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, _rx2) =
        seated_pair(&mut registry, GameKind::TicTacToe).await;
    let handle = registry.handle(room).unwrap();

    handle.make_move(conn(1), 0, Role::X).await.unwrap();
    handle.make_move(conn(2), 3, Role::O).await.unwrap();
    handle.make_move(conn(1), 1, Role::X).await.unwrap();
    handle.make_move(conn(2), 4, Role::O).await.unwrap();
    handle.make_move(conn(1), 2, Role::X).await.unwrap();

    let reply = handle.request_restart(conn(1)).await.unwrap();
    assert!(!reply.restarted);
    assert_eq!(reply.votes, 1);

    drain(&mut rx1);
    let reply = handle.request_restart(conn(2)).await.unwrap();
    assert!(reply.restarted);

    let events = drain(&mut rx1);
    assert!(matches!(
        &events[0],
        ServerEvent::RestartConfirmed { first_turn: Role::O, .. }
    ));
    assert!(matches!(&events[1], ServerEvent::StateSync { snapshot }
        if snapshot.phase == RoomPhase::InProgress));
}

#[tokio::test]
async fn leaving_mid_match_notifies_and_resets() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, _rx2) =
        seated_pair(&mut registry, GameKind::TicTacToe).await;

    let (left_room, removal) = registry.leave(conn(2)).await.unwrap();
    assert_eq!(left_room, room);
    assert!(removal.was_player);
    assert!(removal.match_reset);
    assert!(!removal.now_empty);

    let events = drain(&mut rx1);
    assert!(matches!(
        &events[0],
        ServerEvent::PlayerDisconnected { username, remaining_players: 1 }
            if username == "bob"
    ));
    assert!(matches!(&events[1], ServerEvent::StateSync { snapshot }
        if snapshot.phase == RoomPhase::Waiting));

    // The room survives with one player.
    assert_eq!(registry.room_count(), 1);
}

#[tokio::test]
async fn last_participant_leaving_destroys_the_room() {
    let mut registry = RoomRegistry::new();
    let room = registry.create(None, GameKind::TicTacToe);

    let (tx, _rx) = client();
    registry.join(conn(1), "ada", room, false, false, tx).await.unwrap();

    let (_, removal) = registry.leave(conn(1)).await.unwrap();
    assert!(removal.now_empty);
    assert_eq!(registry.room_count(), 0);
    assert!(registry.handle(room).is_none());
    assert_eq!(registry.member_room(conn(1)), None);
}

#[tokio::test]
async fn spectator_leaving_empty_room_destroys_it() {
    let mut registry = RoomRegistry::new();
    let room = registry.create(None, GameKind::TicTacToe);

    let (tx, _rx) = client();
    registry.join(conn(1), "ada", room, false, false, tx).await.unwrap();
    let (tx, _rx) = client();
    registry.join(conn(9), "eve", room, true, false, tx).await.unwrap();

    registry.leave(conn(1)).await.unwrap();
    assert_eq!(registry.room_count(), 1, "spectator keeps the room alive");

    let (_, removal) = registry.leave(conn(9)).await.unwrap();
    assert!(!removal.was_player);
    assert!(removal.now_empty);
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn leave_when_not_in_a_room_is_none() {
    let mut registry = RoomRegistry::new();
    assert!(registry.leave(conn(1)).await.is_none());
}

#[tokio::test]
async fn listing_reports_counts_and_phase() {
    let mut registry = RoomRegistry::new();
    let quiet = registry.create(Some("quiet".into()), GameKind::MemoryMatch);
    let busy = registry.create(Some("busy".into()), GameKind::TicTacToe);

    let (tx1, _rx1) = client();
    let (tx2, _rx2) = client();
    registry.join(conn(1), "ada", busy, false, false, tx1).await.unwrap();
    registry.join(conn(2), "bob", busy, false, false, tx2).await.unwrap();

    let rooms = registry.list().await;
    assert_eq!(rooms.len(), 2);
    let busy_row = rooms.iter().find(|r| r.room_id == busy).unwrap();
    assert_eq!(busy_row.phase, RoomPhase::InProgress);
    assert_eq!(busy_row.player_count, 2);
    let quiet_row = rooms.iter().find(|r| r.room_id == quiet).unwrap();
    assert_eq!(quiet_row.phase, RoomPhase::Waiting);
    assert_eq!(quiet_row.player_count, 0);
}

#[tokio::test]
async fn room_chat_reaches_players_and_spectators() {
    let mut registry = RoomRegistry::new();
    let (room, mut rx1, mut rx2) =
        seated_pair(&mut registry, GameKind::TicTacToe).await;
    let (tx, mut rx3) = client();
    registry.join(conn(9), "eve", room, true, false, tx).await.unwrap();
    drain(&mut rx1);
    drain(&mut rx2);
    drain(&mut rx3);

    let handle = registry.handle(room).unwrap();
    handle
        .chat(parlor_protocol::ChatMessage {
            username: "ada".into(),
            message: "good luck".into(),
            timestamp: 1_700_000_000_000,
        })
        .await
        .unwrap();
    // Chat is fire-and-forget; wait for the actor to process it.
    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.spectator_count, 1);

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let events = drain(rx);
        assert!(matches!(
            &events[0],
            ServerEvent::RoomMessage { message, .. } if message.message == "good luck"
        ));
    }
}
