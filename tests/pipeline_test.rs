//! End-to-end turns through the interaction pipeline.

mod common;

use std::sync::Arc;

use common::{ms, network_error, pcm_payload, pipeline, ScriptedBackend};
use mood_pet::pet::{PetEvent, RejectReason, TurnPhase};
use mood_pet::{Mood, PetConfig, Submission, TurnOutcome};

#[tokio::test(start_paused = true)]
async fn test_successful_turn_shows_and_speaks_reply() {
    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("olá pet")).await;

    match outcome {
        TurnOutcome::Completed { reply, played } => {
            assert_eq!(reply.text, "Olá!");
            assert_eq!(reply.mood, "happy");
            assert!(played);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let state = pipeline.store().snapshot();
    assert_eq!(state.mood, Mood::Happy);
    assert_eq!(state.text, "Olá!");
    assert!(!state.busy);
    assert!(!state.speaking);
    assert_eq!(state.phase, TurnPhase::Idle);

    let persona = PetConfig::default().persona;
    let prompts = backend.reply_prompts();
    assert_eq!(prompts, vec![format!("{}olá pet", persona.instruction)]);
    assert_eq!(backend.speech_prompts(), vec!["Diz com fofura: Olá!".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_user_text_clears_input_but_gestures_do_not() {
    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = pipeline(&backend);
    let mut events = pipeline.store().events();

    pipeline.interact(Submission::synthetic("festinhas")).await;
    assert_eq!(events.recv().await.expect("event"), PetEvent::SpeakingStarted);
    assert_eq!(events.recv().await.expect("event"), PetEvent::SpeakingEnded);

    pipeline.interact(Submission::text("olá")).await;
    assert_eq!(events.recv().await.expect("event"), PetEvent::InputCleared);
}

#[tokio::test(start_paused = true)]
async fn test_blank_text_is_ignored() {
    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("   ")).await;

    assert!(matches!(outcome, TurnOutcome::Rejected(RejectReason::EmptyInput)));
    assert_eq!(backend.reply_calls(), 0);
    assert!(!pipeline.store().snapshot().busy);
}

#[tokio::test(start_paused = true)]
async fn test_missing_credential_skips_remote_calls() {
    let backend = Arc::new(ScriptedBackend::without_credential());
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("olá")).await;

    assert!(matches!(outcome, TurnOutcome::Rejected(RejectReason::NoCredential)));
    assert_eq!(backend.reply_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submission_while_busy_is_dropped() {
    let backend = Arc::new(ScriptedBackend::with_reply_delay(ms(1000)));
    let pipeline = pipeline(&backend);

    let first = pipeline
        .try_start(Submission::text("primeiro"))
        .expect("first turn accepted");
    assert!(pipeline.store().snapshot().busy);

    let before = pipeline.store().snapshot();
    let second = pipeline.interact(Submission::text("segundo")).await;
    assert!(matches!(second, TurnOutcome::Rejected(RejectReason::Busy)));
    assert_eq!(pipeline.store().snapshot(), before);
    assert!(matches!(
        pipeline.try_start(Submission::synthetic("festinhas")),
        Err(RejectReason::Busy)
    ));

    first.await.expect("join");
    assert_eq!(backend.reply_calls(), 1);
    assert!(backend.reply_prompts()[0].ends_with("primeiro"));

    // Idle again: the next submission goes through.
    pipeline.interact(Submission::text("terceiro")).await;
    assert_eq!(backend.reply_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_speaking_only_during_playback() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_speech(Ok(pcm_payload(1000)));
    let pipeline = pipeline(&backend);

    let turn = pipeline
        .try_start(Submission::text("canta"))
        .expect("accepted");

    tokio::time::sleep(ms(500)).await;
    let state = pipeline.store().snapshot();
    assert!(state.speaking);
    assert!(state.busy);
    assert_eq!(state.phase, TurnPhase::Playing);

    let outcome = turn.await.expect("join");
    assert!(matches!(outcome, TurnOutcome::Completed { played: true, .. }));
    let state = pipeline.store().snapshot();
    assert!(!state.speaking);
    assert!(!state.busy);
    assert!(!state.mouth_open);
}

#[tokio::test(start_paused = true)]
async fn test_reply_failure_aborts_turn() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Err(network_error()));
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("olá")).await;

    assert!(matches!(outcome, TurnOutcome::Failed(_)));
    assert!(backend.speech_prompts().is_empty());
    let state = pipeline.store().snapshot();
    assert_eq!(state.mood, Mood::Neutral);
    assert!(state.text.is_empty());
    assert!(!state.busy);
}

#[tokio::test(start_paused = true)]
async fn test_speech_failure_keeps_the_new_face() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(r#"{"text": "Buá", "mood": "sad"}"#.to_string()));
    backend.push_speech(Err(network_error()));
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("adeus")).await;

    assert!(matches!(outcome, TurnOutcome::Failed(_)));
    let state = pipeline.store().snapshot();
    assert_eq!(state.mood, Mood::Sad);
    assert_eq!(state.text, "Buá");
    assert!(!state.busy);
    assert!(!state.speaking);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_audio_completes_without_sound() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(r#"{"text": "Uau", "mood": "surprised"}"#.to_string()));
    backend.push_speech(Ok("AQID".to_string())); // three bytes
    let pipeline = pipeline(&backend);
    let mut events = pipeline.store().events();

    let outcome = pipeline.interact(Submission::synthetic("surpresa")).await;

    assert!(matches!(outcome, TurnOutcome::Completed { played: false, .. }));
    assert_eq!(pipeline.store().snapshot().mood, Mood::Surprised);
    assert!(events.try_recv().is_err(), "no speaking events without audio");
}

#[tokio::test(start_paused = true)]
async fn test_prose_reply_falls_back_to_happy() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok("Miau! Gosto muito de ti.".to_string()));
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("gostas de mim?")).await;

    let reply = outcome.reply().expect("completed").clone();
    assert_eq!(reply.text, "Miau! Gosto muito de ti.");
    assert_eq!(reply.mood, "happy");
    assert_eq!(pipeline.store().snapshot().mood, Mood::Happy);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_mood_draws_default_theme() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(r#"{"text": "Hmm", "mood": "pensativo"}"#.to_string()));
    let pipeline = pipeline(&backend);

    let outcome = pipeline.interact(Submission::text("em que pensas?")).await;

    assert_eq!(outcome.reply().map(|r| r.mood.as_str()), Some("pensativo"));
    let state = pipeline.store().snapshot();
    assert_eq!(state.mood, Mood::Neutral);
    assert_eq!(state.text, "Hmm");
}

#[tokio::test(start_paused = true)]
async fn test_mood_decays_to_neutral_after_five_seconds() {
    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = pipeline(&backend);

    pipeline.interact(Submission::text("olá")).await; // ends at 100ms
    assert_eq!(pipeline.store().snapshot().mood, Mood::Happy);

    tokio::time::sleep(ms(4800)).await;
    assert_eq!(pipeline.store().snapshot().mood, Mood::Happy);

    tokio::time::sleep(ms(200)).await;
    let state = pipeline.store().snapshot();
    assert_eq!(state.mood, Mood::Neutral);
    assert_eq!(state.text, "Olá!", "decay only touches the mood");
}

#[tokio::test(start_paused = true)]
async fn test_second_turn_restarts_decay_window() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(r#"{"text": "Olá!", "mood": "happy"}"#.to_string()));
    backend.push_reply(Ok(r#"{"text": "Grr", "mood": "angry"}"#.to_string()));
    let pipeline = pipeline(&backend);

    pipeline.interact(Submission::text("olá")).await; // reply at 0ms
    tokio::time::sleep(ms(1900)).await;
    pipeline.interact(Submission::text("chato")).await; // reply at 2000ms

    tokio::time::sleep(ms(3000)).await; // 5100ms
    assert_eq!(pipeline.store().snapshot().mood, Mood::Angry);

    tokio::time::sleep(ms(2000)).await; // 7100ms
    assert_eq!(pipeline.store().snapshot().mood, Mood::Neutral);
}

#[tokio::test(start_paused = true)]
async fn test_slow_turn_holds_mood_until_its_reply_lands() {
    let backend = Arc::new(ScriptedBackend::with_reply_delay(ms(2500)));
    let pipeline = pipeline(&backend);

    pipeline.interact(Submission::text("olá")).await; // reply at 2500ms, decay due 7500ms
    tokio::time::sleep(ms(3400)).await; // 6000ms

    let second = pipeline
        .try_start(Submission::text("outra vez"))
        .expect("pet is idle");

    tokio::time::sleep(ms(1600)).await; // 7600ms, reply still pending
    let state = pipeline.store().snapshot();
    assert_eq!(state.phase, TurnPhase::RequestingReply);
    assert_eq!(state.mood, Mood::Happy, "first countdown was cancelled");

    second.await.expect("turn task"); // reply at 8500ms
    tokio::time::sleep(ms(4800)).await;
    assert_eq!(pipeline.store().snapshot().mood, Mood::Happy);

    tokio::time::sleep(ms(300)).await;
    assert_eq!(pipeline.store().snapshot().mood, Mood::Neutral);
}

#[tokio::test(start_paused = true)]
async fn test_failed_reply_still_lets_mood_decay() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(r#"{"text": "Buu", "mood": "sad"}"#.to_string()));
    backend.push_reply(Err(network_error()));
    let pipeline = pipeline(&backend);

    pipeline.interact(Submission::text("olá")).await;
    pipeline.interact(Submission::text("outra")).await;
    assert_eq!(pipeline.store().snapshot().mood, Mood::Sad);

    tokio::time::sleep(ms(5100)).await;
    assert_eq!(pipeline.store().snapshot().mood, Mood::Neutral);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_idle_pet_always_accepts_next_turn() {
    let backend = Arc::new(ScriptedBackend::new());
    let pipeline = pipeline(&backend);
    let mut state = pipeline.store().subscribe();

    for round in 0..5 {
        let turn = pipeline
            .try_start(Submission::text("olá"))
            .expect("previous turn finished");
        state
            .wait_for(|s| !s.busy)
            .await
            .expect("store alive");
        assert!(
            pipeline.try_start(Submission::synthetic("festinhas")).is_ok(),
            "round {round}: idle published before the permit was freed"
        );
        turn.await.expect("turn task");
        state
            .wait_for(|s| !s.busy)
            .await
            .expect("store alive");
    }
}
