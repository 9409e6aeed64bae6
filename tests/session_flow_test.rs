//! End-to-end session lifecycle over the public API.

use chrono::{Duration, Utc};
use daybook::{
    DepthSetting, PromptKind, SessionConfig, SessionStage, SessionStore,
};

fn config(setting: DepthSetting, is_first: bool) -> SessionConfig {
    SessionConfig {
        personality: "warm".into(),
        depth_setting: setting,
        is_first_session: is_first,
    }
}

fn long_reply() -> String {
    vec!["word"; 120].join(" ")
}

fn medium_reply() -> String {
    vec!["word"; 40].join(" ")
}

#[test]
fn engaged_standard_session_runs_to_its_ceiling_and_closes() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Standard, false), PromptKind::Scheduled, now);

    // Exchange 1: opener answered.
    let out = store.process_message("u1", &medium_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::Anchor);

    // Exchange 2: anchored, probing begins.
    let out = store.process_message("u1", &medium_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::Probe);

    // Medium engagement keeps probing until the ceiling (6) is reached.
    for _ in 3..6 {
        let out = store.process_message("u1", &medium_reply(), now).unwrap();
        assert_eq!(out.next_stage, SessionStage::Probe);
    }
    let out = store.process_message("u1", &medium_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::PreClose);

    // No continuation signal, shallow reply: close.
    let out = store.process_message("u1", "nothing else", now).unwrap();
    assert_eq!(out.next_stage, SessionStage::Close);

    // Caller detaches the session for close-out.
    let final_snapshot = store.close("u1").unwrap();
    assert_eq!(final_snapshot.stage, SessionStage::Ended);
    assert_eq!(final_snapshot.exchange_count, 7);
    assert!(store.is_empty());
}

#[test]
fn soft_close_extension_grows_the_ceiling() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Quick, false), PromptKind::Manual, now);

    // Walk quick (ceiling 3) to the soft close.
    store.process_message("u1", &medium_reply(), now).unwrap(); // -> Anchor
    store.process_message("u1", &medium_reply(), now).unwrap(); // -> Probe
    let out = store.process_message("u1", &medium_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::PreClose); // ceiling 3 reached

    // "actually, one more thing" extends: back to Probe, ceiling now 6.
    let out = store
        .process_message("u1", "actually, one more thing", now)
        .unwrap();
    assert_eq!(out.next_stage, SessionStage::Probe);
    assert_eq!(out.session.pre_close_count, 1);
    assert_eq!(out.session.ceiling(), 6);
}

#[test]
fn deep_engagement_surfaces_a_connection_once() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Deep, false), PromptKind::Scheduled, now);

    store.process_message("u1", &long_reply(), now).unwrap(); // -> Anchor
    store.process_message("u1", &long_reply(), now).unwrap(); // -> Probe
    store.process_message("u1", &long_reply(), now).unwrap(); // -> Probe
    let out = store.process_message("u1", &long_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::Connect);
}

#[test]
fn hard_cap_closes_even_a_repeatedly_extended_session() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Deep, false), PromptKind::Scheduled, now);

    // Keep answering with continuation questions; every soft close extends.
    for _ in 0..14 {
        let text = format!("{} but what else could it mean?", medium_reply());
        let out = store.process_message("u1", &text, now).unwrap();
        assert_ne!(out.next_stage, SessionStage::Close);
    }
    // The 15th exchange hits the hard cap regardless of the signal.
    let out = store
        .process_message("u1", "and one more question?", now)
        .unwrap();
    assert_eq!(out.next_stage, SessionStage::Close);
    assert_eq!(out.session.exchange_count, 15);
}

#[test]
fn first_session_stays_short() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Deep, true), PromptKind::Scheduled, now);

    store.process_message("u1", &medium_reply(), now).unwrap(); // -> Anchor
    store.process_message("u1", &medium_reply(), now).unwrap(); // -> Probe
    store.process_message("u1", &medium_reply(), now).unwrap(); // -> Probe
    // Exchange 4 hits the first-session cap.
    let out = store.process_message("u1", &medium_reply(), now).unwrap();
    assert_eq!(out.next_stage, SessionStage::PreClose);
    assert_eq!(out.session.ceiling(), 4);
}

#[test]
fn inactivity_expires_the_session_lazily() {
    let store = SessionStore::new();
    let now = Utc::now();
    store.start_session("u1", config(DepthSetting::Standard, false), PromptKind::Scheduled, now);
    store.process_message("u1", &medium_reply(), now).unwrap();

    // 121 minutes after the last inbound message, the session is gone.
    let later = now + Duration::minutes(121);
    assert!(store.get_active("u1", later).is_none());
    assert!(store.is_empty());
}

#[test]
fn restarting_a_user_session_hands_back_the_displaced_one() {
    let store = SessionStore::new();
    let now = Utc::now();
    let first = store.start_session("u1", config(DepthSetting::Standard, false), PromptKind::Scheduled, now);
    store.process_message("u1", &medium_reply(), now).unwrap();

    let second = store.start_session("u1", config(DepthSetting::Standard, false), PromptKind::CatchUp, now);
    let displaced = second.displaced.expect("prior session handed back");
    assert_eq!(displaced.session_id, first.session.session_id);
    assert_eq!(displaced.stage, SessionStage::Ended);
    assert_eq!(displaced.exchange_count, 1);

    // The replacement is the only active session.
    assert_eq!(store.len(), 1);
    let active = store.get_active("u1", now).unwrap();
    assert_eq!(active.session_id, second.session.session_id);
}
