mod common;

use std::time::Duration;

use common::{acme_report, generation_config, ok_reply, status_reply, ScriptedGeneration};
use payguard_core::llm::{fallback_notice, GenerationError};
use payguard_core::{NoticeComposer, NoticeProvider};

#[tokio::test(start_paused = true)]
async fn rate_limited_twice_then_primary_succeeds() {
    let backend = ScriptedGeneration::new(vec![
        status_reply(429),
        status_reply(429),
        ok_reply("Dear Acme, please pay Jo."),
    ]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let started = tokio::time::Instant::now();
    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Primary);
    assert_eq!(notice.text, "Dear Acme, please pay Jo.");
    assert_eq!(backend.call_count(), 3);
    // base 2s, multiplied by the attempt number
    assert_eq!(
        backend.call_gaps(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
    assert!(started.elapsed() >= Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn server_error_falls_back_without_retrying() {
    let backend = ScriptedGeneration::new(vec![
        status_reply(500),
        status_reply(500),
        status_reply(500),
    ]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert_eq!(notice.text, fallback_notice(&acme_report()));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_exhausts_budget_then_falls_back() {
    let backend = ScriptedGeneration::new(vec![
        status_reply(429),
        status_reply(429),
        status_reply(429),
    ]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let started = tokio::time::Instant::now();
    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert!(!notice.text.is_empty());
    assert_eq!(backend.call_count(), 3);
    // no wait after the final attempt
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn timeouts_are_retried_with_base_delay() {
    let backend = ScriptedGeneration::new(vec![
        Err(GenerationError::Timeout),
        Err(GenerationError::Timeout),
        ok_reply("Final notice."),
    ]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Primary);
    assert_eq!(backend.call_count(), 3);
    assert_eq!(
        backend.call_gaps(),
        vec![Duration::from_secs(2), Duration::from_secs(2)]
    );
}

#[tokio::test(start_paused = true)]
async fn all_timeouts_fall_back() {
    let backend = ScriptedGeneration::new(vec![
        Err(GenerationError::Timeout),
        Err(GenerationError::Timeout),
        Err(GenerationError::Timeout),
    ]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn transport_error_falls_back_immediately() {
    let backend = ScriptedGeneration::new(vec![Err(GenerationError::Transport(
        "connection refused".into(),
    ))]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());

    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn unusable_success_body_falls_back() {
    let backend = ScriptedGeneration::new(vec![Ok(payguard_core::llm::GenerationReply {
        status: 200,
        body: "not json".into(),
    })]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());
    assert_eq!(
        composer.compose(&acme_report()).await.provider,
        NoticeProvider::Fallback
    );

    let backend = ScriptedGeneration::new(vec![ok_reply("   ")]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());
    let notice = composer.compose(&acme_report()).await;
    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert!(!notice.text.trim().is_empty());
}

#[tokio::test]
async fn prompt_carries_report_fields() {
    let backend = ScriptedGeneration::new(vec![ok_reply("ok")]);
    let composer = NoticeComposer::new(backend.clone(), generation_config());
    composer.compose(&acme_report()).await;

    let prompt = backend.last_prompt().unwrap();
    assert!(prompt.contains("Employer: Acme"));
    assert!(prompt.contains("Employee: Jo"));
    assert!(prompt.contains("Amount: 500"));
    assert!(prompt.contains("Due Date: 2024-01-01"));
}

#[tokio::test]
async fn single_attempt_budget_is_respected() {
    let mut cfg = generation_config();
    cfg.max_retries = 1;
    let backend = ScriptedGeneration::new(vec![status_reply(429), ok_reply("late")]);
    let composer = NoticeComposer::new(backend.clone(), cfg);

    let notice = composer.compose(&acme_report()).await;

    assert_eq!(notice.provider, NoticeProvider::Fallback);
    assert_eq!(backend.call_count(), 1);
}
