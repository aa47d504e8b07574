//! End-to-end scenarios for the realtime engine, driven through the hub's
//! public API the way the websocket transport drives it.

use chrono::Utc;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::error::TryRecvError;

use sinfgram_server::config::RealtimeSettings;
use sinfgram_server::domain::{
    ChatId, Message, MessageContent, MessageId, MessageKind, PresenceStatus, UserId,
};
use sinfgram_server::realtime::{OutboundEvent, RealtimeHub};

fn message(chat: ChatId, sender: UserId, text: &str) -> Message {
    Message {
        id: MessageId::new(),
        chat_id: chat,
        sender_id: sender,
        content: MessageContent {
            text: Some(text.to_string()),
            media: Vec::new(),
        },
        kind: MessageKind::Text,
        reactions: Vec::new(),
        created_at: Utc::now(),
    }
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn multi_device_user_emits_one_online_and_one_offline() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let observer = UserId::new();
    let user = UserId::new();

    let (_obs_session, mut obs_rx) = hub.connect(observer);
    // The observer hears its own transition first.
    assert_eq!(
        obs_rx.try_recv().unwrap(),
        OutboundEvent::PresenceChanged {
            user_id: observer,
            status: PresenceStatus::Online,
        }
    );

    let (s1, _rx1) = hub.connect(user);
    let (s2, _rx2) = hub.connect(user);

    // Second handle must not repeat the announcement.
    assert_eq!(
        drain(&mut obs_rx),
        vec![OutboundEvent::PresenceChanged {
            user_id: user,
            status: PresenceStatus::Online,
        }]
    );

    // Dropping one of two handles keeps the user online.
    hub.disconnect(s1.id());
    assert!(hub.is_online(user));
    assert_eq!(drain(&mut obs_rx), vec![]);

    hub.disconnect(s2.id());
    assert!(!hub.is_online(user));
    assert_eq!(
        drain(&mut obs_rx),
        vec![OutboundEvent::PresenceChanged {
            user_id: user,
            status: PresenceStatus::Offline,
        }]
    );
}

#[tokio::test]
async fn explicit_offline_is_ignored_while_handles_remain() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let observer = UserId::new();
    let user = UserId::new();

    let (_obs_session, mut obs_rx) = hub.connect(observer);
    let (_session, _rx) = hub.connect(user);
    drain(&mut obs_rx);

    hub.set_offline(user);
    assert!(hub.is_online(user));
    assert_eq!(drain(&mut obs_rx), vec![]);

    // Re-asserting online while already announced is also silent.
    hub.set_online(user);
    assert_eq!(drain(&mut obs_rx), vec![]);
}

#[tokio::test]
async fn dispatch_preserves_per_recipient_order() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let chat = ChatId::new();
    let sender = UserId::new();
    let recipient = UserId::new();

    let (session, mut rx) = hub.connect(recipient);
    hub.join(session.id(), chat);
    drain(&mut rx);

    let m1 = message(chat, sender, "first");
    let m2 = message(chat, sender, "second");
    hub.dispatch(chat, m1.clone());
    hub.dispatch(chat, m2.clone());

    assert_eq!(
        drain(&mut rx),
        vec![
            OutboundEvent::NewMessage {
                chat_id: chat,
                message: m1,
            },
            OutboundEvent::NewMessage {
                chat_id: chat,
                message: m2,
            },
        ]
    );
}

#[tokio::test]
async fn dispatch_reaches_only_room_members() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let chat = ChatId::new();
    let member = UserId::new();
    let bystander = UserId::new();

    let (member_session, mut member_rx) = hub.connect(member);
    let (_bystander_session, mut bystander_rx) = hub.connect(bystander);
    hub.join(member_session.id(), chat);
    drain(&mut member_rx);
    drain(&mut bystander_rx);

    hub.dispatch(chat, message(chat, member, "room only"));

    assert_eq!(drain(&mut member_rx).len(), 1);
    assert_eq!(drain(&mut bystander_rx), vec![]);
}

#[tokio::test]
async fn leaving_a_room_stops_delivery() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let chat = ChatId::new();
    let user = UserId::new();

    let (session, mut rx) = hub.connect(user);
    hub.join(session.id(), chat);
    drain(&mut rx);

    hub.leave(session.id(), chat);
    hub.dispatch(chat, message(chat, user, "after leave"));

    assert_eq!(drain(&mut rx), vec![]);
}

#[tokio::test]
async fn typing_notifies_room_once_and_skips_the_typist_connection() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let chat = ChatId::new();
    let typist = UserId::new();
    let reader = UserId::new();

    let (typist_session, mut typist_rx) = hub.connect(typist);
    let (reader_session, mut reader_rx) = hub.connect(reader);
    hub.join(typist_session.id(), chat);
    hub.join(reader_session.id(), chat);
    drain(&mut typist_rx);
    drain(&mut reader_rx);

    hub.typing_start(chat, typist, Some(typist_session.id()));
    // Refresh within the window is silent.
    hub.typing_start(chat, typist, Some(typist_session.id()));

    assert_eq!(drain(&mut typist_rx), vec![]);
    assert_eq!(
        drain(&mut reader_rx),
        vec![OutboundEvent::TypingStart {
            chat_id: chat,
            user_id: typist,
        }]
    );

    hub.typing_stop(chat, typist, Some(typist_session.id()));
    // A second stop has nothing to cancel.
    hub.typing_stop(chat, typist, Some(typist_session.id()));

    assert_eq!(
        drain(&mut reader_rx),
        vec![OutboundEvent::TypingStop {
            chat_id: chat,
            user_id: typist,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn stale_typing_indicator_expires_exactly_once() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let sweeper = hub.spawn_typing_sweeper();

    let chat = ChatId::new();
    let typist = UserId::new();
    let reader = UserId::new();

    let (reader_session, mut reader_rx) = hub.connect(reader);
    hub.join(reader_session.id(), chat);
    drain(&mut reader_rx);

    hub.typing_start(chat, typist, None);
    assert_eq!(drain(&mut reader_rx).len(), 1);

    // Past the TTL plus several sweep periods.
    tokio::time::advance(std::time::Duration::from_secs(5)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        drain(&mut reader_rx),
        vec![OutboundEvent::TypingStop {
            chat_id: chat,
            user_id: typist,
        }]
    );

    // An explicit stop after expiry stays silent.
    hub.typing_stop(chat, typist, None);
    assert_eq!(drain(&mut reader_rx), vec![]);

    sweeper.abort();
}

#[tokio::test]
async fn overflowing_connection_is_force_closed() {
    let settings = RealtimeSettings {
        send_queue_capacity: 2,
        ..RealtimeSettings::default()
    };
    let hub = RealtimeHub::new(settings);
    let chat = ChatId::new();
    let observer = UserId::new();
    let victim = UserId::new();

    let (observer_session, mut observer_rx) = hub.connect(observer);
    let (victim_session, mut victim_rx) = hub.connect(victim);
    hub.join(victim_session.id(), chat);
    drain(&mut observer_rx);
    drain(&mut victim_rx);

    let sender = UserId::new();
    hub.dispatch(chat, message(chat, sender, "one"));
    hub.dispatch(chat, message(chat, sender, "two"));
    // Third event does not fit and closes the connection.
    hub.dispatch(chat, message(chat, sender, "three"));

    assert!(victim_session.is_closed());
    assert!(!hub.is_online(victim));
    assert_eq!(hub.room_members(chat), vec![]);
    assert_eq!(hub.connection_count(), 1);

    // The queued events before the overflow are still drainable, and the
    // dropped one never arrives.
    assert_eq!(drain(&mut victim_rx).len(), 2);
    assert_eq!(victim_rx.try_recv(), Err(TryRecvError::Empty));

    // Everyone else hears the resulting offline transition.
    assert_eq!(
        drain(&mut observer_rx),
        vec![OutboundEvent::PresenceChanged {
            user_id: victim,
            status: PresenceStatus::Offline,
        }]
    );
    assert_eq!(drain(&mut observer_rx), vec![]);

    drop(observer_session);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let user = UserId::new();

    let (session, _rx) = hub.connect(user);
    hub.disconnect(session.id());
    hub.disconnect(session.id());

    assert_eq!(hub.connection_count(), 0);
    assert!(!hub.is_online(user));
}

#[tokio::test]
async fn join_after_disconnect_is_ignored() {
    let hub = RealtimeHub::new(RealtimeSettings::default());
    let chat = ChatId::new();
    let user = UserId::new();

    let (session, _rx) = hub.connect(user);
    hub.disconnect(session.id());
    hub.join(session.id(), chat);

    assert_eq!(hub.room_members(chat), vec![]);
}
