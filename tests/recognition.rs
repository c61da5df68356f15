//! Integration tests for the recognise/forget commands and roster
//! persistence.

mod common;

use common::{BOT, CHANNEL, Harness};
use slirc_motions::config::DatabaseConfig;
use slirc_motions::db::{Database, MotionStore};
use slirc_motions::error::{MotionError, RosterChange};
use slirc_motions::hostmask::{Fingerprint, Hostmask};
use slirc_motions::state::Vote;
use slirc_motions::{Config, Engine, JoinOutcome, Outbound};
use std::sync::Arc;
use std::time::Duration;

fn notice(channel: &str, text: &str) -> Outbound {
    Outbound::ChannelNotice {
        channel: channel.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_recognize_voices_and_records_fingerprint() {
    let mut h = Harness::new().await;
    h.member("alice", "");
    h.resolver.insert("alice", "al", "coop.example");

    assert!(h.engine.recognize("chair", CHANNEL, "alice").await.unwrap());
    assert_eq!(
        h.drain(),
        vec![Outbound::Voice {
            channel: CHANNEL.to_string(),
            nick: "alice".to_string(),
        }]
    );

    let state = h.engine.snapshot(CHANNEL).await.unwrap();
    assert!(state.recognized.contains(&Fingerprint::new("al", "coop.example")));

    // Second time is a no-op.
    h.member("alice", "+");
    assert!(!h.engine.recognize("chair", CHANNEL, "alice").await.unwrap());
    assert!(h.drain().is_empty());
    assert_eq!(h.engine.snapshot(CHANNEL).await.unwrap().recognized.len(), 1);
}

#[tokio::test]
async fn test_recognize_without_ops_warns() {
    let mut h = Harness::new().await;
    h.members.set_prefix(CHANNEL, "motionbot", '@', false);
    h.resolver.insert("alice", "al", "coop.example");

    assert!(h.engine.recognize("chair", CHANNEL, "alice").await.unwrap());
    assert_eq!(h.notices(), vec!["*** I am not opped and cannot voice user."]);
}

#[tokio::test]
async fn test_failed_lookup_leaves_roster_untouched() {
    let mut h = Harness::new().await;
    h.member("ghost", "+");

    let err = h.engine.recognize("chair", CHANNEL, "ghost").await.unwrap_err();
    assert_eq!(
        err,
        MotionError::LookupFailed {
            nick: "ghost".to_string(),
            change: RosterChange::Add,
        }
    );
    assert_eq!(h.notices(), vec!["*** Could not add user to recognised list."]);
    assert!(h.engine.snapshot(CHANNEL).await.unwrap().recognized.is_empty());

    let err = h.engine.forget("chair", CHANNEL, "ghost").await.unwrap_err();
    assert!(matches!(
        err,
        MotionError::LookupFailed {
            change: RosterChange::Remove,
            ..
        }
    ));
    assert_eq!(
        h.notices(),
        vec!["*** Could not remove user from recognised list."]
    );
}

#[tokio::test]
async fn test_failed_lookup_sends_no_voice() {
    let mut h = Harness::new().await;
    h.member("ghost", "");

    let err = h.engine.recognize("chair", CHANNEL, "ghost").await.unwrap_err();
    assert!(matches!(
        err,
        MotionError::LookupFailed {
            change: RosterChange::Add,
            ..
        }
    ));
    assert_eq!(
        h.drain(),
        vec![notice(CHANNEL, "*** Could not add user to recognised list.")]
    );

    // Without ops the warning is also held back.
    h.members.set_prefix(CHANNEL, BOT, '@', false);
    h.engine.recognize("chair", CHANNEL, "ghost").await.unwrap_err();
    assert_eq!(
        h.drain(),
        vec![notice(CHANNEL, "*** Could not add user to recognised list.")]
    );
}

#[tokio::test]
async fn test_lookup_holds_its_channel_only() {
    let mut h = Harness::new().await;
    h.bot_joins("#board").await;
    h.members.add_member("#board", "chair", "@");
    h.member("alice", "+");
    h.resolver.insert("bob", "bob", "coop.example");
    h.open_motion(0).await;
    let gate = h.resolver.hold();

    let engine = &h.engine;
    let resolver = &h.resolver;
    let others = async {
        while resolver.lookups().is_empty() {
            tokio::task::yield_now().await;
        }
        // Another channel is not blocked by the lookup.
        engine.start_meeting("chair", "#board").await.unwrap();
        assert!(engine.snapshot("#board").await.unwrap().meeting.started);

        let queued = async {
            tokio::join!(
                engine.cast_vote("alice", CHANNEL, "aye"),
                engine.stop_motion("chair", CHANNEL),
            )
        };
        let release = async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            gate.notify_one();
        };
        tokio::join!(queued, release).0
    };

    let (added, (vote, tally)) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(engine.recognize("chair", CHANNEL, "bob"), others)
    })
    .await
    .expect("channel operations deadlocked");

    assert!(added.unwrap());
    assert_eq!(vote.unwrap(), Some(Vote::Aye));
    assert_eq!(tally.unwrap().ayes, vec!["alice".to_string()]);

    // #coop work ran strictly after the lookup finished.
    let out = h.drain();
    assert_eq!(out[0], notice("#board", "*** Meeting started."));
    assert_eq!(
        out[1],
        Outbound::Voice {
            channel: CHANNEL.to_string(),
            nick: "bob".to_string(),
        }
    );
    assert_eq!(out[2], notice(CHANNEL, "*** Votes"));
}

#[tokio::test]
async fn test_rejoin_waits_for_in_flight_recognition() {
    let store: Arc<dyn MotionStore> = Arc::new(Database::new(":memory:").await.unwrap());
    let mut h = Harness::with_store(Config::default(), store).await;
    h.resolver.insert("bob", "bob", "coop.example");
    h.open_motion(0).await;
    let gate = h.resolver.hold();

    let me = Hostmask::new(BOT, "bot", "bot.example.org");
    let engine = &h.engine;
    let resolver = &h.resolver;
    let rejoin = async {
        while resolver.lookups().is_empty() {
            tokio::task::yield_now().await;
        }
        let release = async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            gate.notify_one();
        };
        tokio::join!(engine.on_join(&me, CHANNEL), release).0
    };

    let (added, rejoined) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(engine.recognize("chair", CHANNEL, "bob"), rejoin)
    })
    .await
    .expect("rejoin deadlocked");
    assert!(added.unwrap());
    assert_eq!(rejoined.unwrap(), JoinOutcome::Tracked);

    // The rejoin reloaded the roster after the recognition was stored.
    let state = h.engine.snapshot(CHANNEL).await.unwrap();
    assert!(state.recognized.contains(&Fingerprint::new("bob", "coop.example")));
    assert!(!state.meeting.started);
    assert!(!state.motion.started);
    h.drain();
}

#[tokio::test]
async fn test_recognize_requires_admin() {
    let mut h = Harness::new().await;
    h.member("alice", "+");
    h.resolver.insert("bob", "bob", "coop.example");

    let err = h.engine.recognize("alice", CHANNEL, "bob").await.unwrap_err();
    assert_eq!(err, MotionError::PermissionDenied);
    assert!(h.drain().is_empty());
    assert!(h.resolver.lookups().is_empty());
}

#[tokio::test]
async fn test_forget_devoices_and_drops_pending() {
    let mut h = Harness::new().await;
    h.resolver.insert("bob", "bob", "coop.example");
    h.engine.recognize("chair", CHANNEL, "bob").await.unwrap();
    h.open_motion(0).await;
    assert_eq!(h.join("bob", "bob", "coop.example").await, JoinOutcome::Deferred);
    h.members.set_prefix(CHANNEL, "bob", '+', true);

    assert!(h.engine.forget("chair", CHANNEL, "bob").await.unwrap());
    assert_eq!(
        h.drain(),
        vec![Outbound::Devoice {
            channel: CHANNEL.to_string(),
            nick: "bob".to_string(),
        }]
    );
    let state = h.engine.snapshot(CHANNEL).await.unwrap();
    assert!(state.recognized.is_empty());
    assert!(state.pending_voice.is_empty());

    // Cancelling now voices nobody.
    h.engine.cancel_motion("chair", CHANNEL).await.unwrap();
    assert!(!h.drain().iter().any(|o| matches!(o, Outbound::Voice { .. })));
}

#[tokio::test]
async fn test_roster_survives_restart_with_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motions.db");
    let config = Config {
        database: Some(DatabaseConfig {
            path: path.to_string_lossy().into_owned(),
        }),
        ..Config::default()
    };

    {
        let store = Engine::open_store(&config).await;
        let mut h = Harness::with_store(config.clone(), store).await;
        h.resolver.insert("alice", "al", "coop.example");
        h.engine.recognize("chair", CHANNEL, "alice").await.unwrap();
        h.drain();
    }

    // A fresh engine loads the roster when it joins.
    let store = Engine::open_store(&config).await;
    let mut h = Harness::with_store(config, store).await;
    let state = h.engine.snapshot(CHANNEL).await.unwrap();
    assert_eq!(state.recognized.len(), 1);

    assert_eq!(h.join("Alice", "al", "coop.example").await, JoinOutcome::Voiced);
    assert_eq!(
        h.drain(),
        vec![Outbound::Voice {
            channel: CHANNEL.to_string(),
            nick: "Alice".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_stop_meeting_archives_minutes() {
    let db = Arc::new(Database::new(":memory:").await.unwrap());
    let store: Arc<dyn MotionStore> = db.clone();
    let mut h = Harness::with_store(Config::default(), store).await;
    h.member("alice", "+");

    h.engine.set_meeting_name("chair", CHANNEL, "AGM").await.unwrap();
    h.open_motion(1).await;
    h.engine.cast_vote("alice", CHANNEL, "aye").await.unwrap();
    h.engine.stop_motion("chair", CHANNEL).await.unwrap();
    h.engine.stop_meeting("chair", CHANNEL).await.unwrap();

    let rows = db.meetings().recent("motionbot", CHANNEL, 5).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "AGM");
    assert_eq!(rows[0].quorum, 1);

    let minutes: serde_json::Value = serde_json::from_str(&rows[0].minutes).unwrap();
    assert_eq!(minutes[0]["text"], "Buy a new kettle");
    assert_eq!(minutes[0]["outcome"], "carried");
    assert_eq!(minutes[0]["ayes"], 1);
}

#[tokio::test]
async fn test_unopenable_database_falls_back_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    // A directory is not a database file.
    let config = Config {
        database: Some(DatabaseConfig {
            path: dir.path().to_string_lossy().into_owned(),
        }),
        ..Config::default()
    };

    let store = Engine::open_store(&config).await;
    let mut h = Harness::with_store(config, store).await;
    h.resolver.insert("alice", "al", "coop.example");
    assert!(h.engine.recognize("chair", CHANNEL, "alice").await.unwrap());
    assert_eq!(h.engine.snapshot(CHANNEL).await.unwrap().recognized.len(), 1);
}
