//! Integration tests for the profile generation flow.
//!
//! These tests drive [`ProfileFlow`] end to end against the mock provider:
//! 1. Wizard mode: role selection, five answers, structured generation
//! 2. Chat mode: opening exchange, turn-limited conversation, finalization
//! 3. Failure paths: rewind-and-retry semantics in both modes

use std::sync::Arc;

use serde_json::json;

use founderlink_core::adapters::ai::{MockCompletionProvider, MockFailure};
use founderlink_core::application::{FlowUpdate, GatewayError, InterviewGateway, ProfileFlow};
use founderlink_core::domain::generation::{FlowState, CHAT_TURN_LIMIT, FALLBACK_REPLY};
use founderlink_core::domain::profile::{Profile, ProfileParseError, Role};

fn gateway(provider: &MockCompletionProvider) -> InterviewGateway {
    InterviewGateway::new(Arc::new(provider.clone()))
}

fn profile_body() -> String {
    json!({
        "name": "PayFlow",
        "role": "Explorer",
        "tagline": "Payroll without the pain",
        "tags": ["Fintech", "SaaS", "Payroll", "B2B", "Extra"],
        "description": "Building payroll for small teams",
        "needs": "Technical co-founder",
        "offers": "Industry connections"
    })
    .to_string()
}

const FOUNDER_ANSWERS: [&str; 5] = [
    "PayFlow — 发薪服务",
    "Fintech",
    "MVP",
    "技术合伙人",
    "行业资源",
];

// =============================================================================
// Wizard mode
// =============================================================================

#[tokio::test]
async fn wizard_flow_produces_profile_with_stamped_role() {
    let provider = MockCompletionProvider::new().with_reply(profile_body());
    let mut flow = ProfileFlow::wizard(gateway(&provider), None);

    assert_eq!(flow.start().await.unwrap(), FlowUpdate::AwaitingInput);
    assert_eq!(flow.state(), &FlowState::RoleSelection);

    assert_eq!(flow.select_role(Role::Founder), FlowUpdate::AwaitingInput);
    assert_eq!(
        flow.current_question(),
        Some("你的项目叫什么？一句话介绍它。")
    );

    let mut profile: Option<Profile> = None;
    for (i, answer) in FOUNDER_ANSWERS.iter().enumerate() {
        let update = flow.submit_answer(answer).await.unwrap();
        if i < 4 {
            assert_eq!(update, FlowUpdate::AwaitingInput);
        } else {
            match update {
                FlowUpdate::ProfileReady(p) => profile = Some(p),
                other => panic!("expected profile, got {other:?}"),
            }
        }
    }

    // The response body claims Explorer; the selected role must win.
    let profile = profile.unwrap();
    assert_eq!(profile.role, Role::Founder);
    assert_eq!(profile.name, "PayFlow");
    assert_eq!(profile.tags.len(), 4);
    assert!(!profile.is_verified);
    assert!(flow.is_terminated());

    // Exactly one remote call, structured, with the numbered answers.
    let calls = provider.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_structured());
    assert!(calls[0].messages[0].content.contains("1. PayFlow — 发薪服务"));
    assert!(calls[0].messages[0].content.contains("5. 行业资源"));
}

#[tokio::test]
async fn wizard_empty_answers_never_touch_the_network() {
    let provider = MockCompletionProvider::new();
    let mut flow = ProfileFlow::wizard(gateway(&provider), Some(Role::Explorer));

    assert_eq!(flow.submit_answer("   ").await.unwrap(), FlowUpdate::Ignored);
    assert_eq!(flow.submit_answer("\t\n").await.unwrap(), FlowUpdate::Ignored);

    assert_eq!(flow.state(), &FlowState::WizardQuestion { index: 0 });
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn wizard_generation_failure_rewinds_and_finalize_retries() {
    let provider = MockCompletionProvider::new()
        .with_reply("not json")
        .with_reply(profile_body());
    let mut flow = ProfileFlow::wizard(gateway(&provider), Some(Role::Founder));

    for answer in &FOUNDER_ANSWERS[..4] {
        flow.submit_answer(answer).await.unwrap();
    }
    let err = flow.submit_answer(FOUNDER_ANSWERS[4]).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Parse(ProfileParseError::InvalidJson(_))
    ));

    // Rewound to the last question with all answers preserved.
    assert_eq!(flow.state(), &FlowState::WizardQuestion { index: 4 });

    let update = flow.finalize().await.unwrap();
    match update {
        FlowUpdate::ProfileReady(profile) => assert_eq!(profile.role, Role::Founder),
        other => panic!("expected profile, got {other:?}"),
    }
    assert!(flow.is_terminated());
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn wizard_answer_resubmission_after_failure_replaces_the_last_one() {
    let provider = MockCompletionProvider::new()
        .with_failure(MockFailure::Unavailable {
            message: "overloaded".to_string(),
        })
        .with_reply(profile_body());
    let mut flow = ProfileFlow::wizard(gateway(&provider), Some(Role::Founder));

    for answer in &FOUNDER_ANSWERS {
        let _ = flow.submit_answer(answer).await;
    }
    assert_eq!(flow.state(), &FlowState::WizardQuestion { index: 4 });

    let update = flow.submit_answer("只要行业资源").await.unwrap();
    assert!(matches!(update, FlowUpdate::ProfileReady(_)));

    let calls = provider.get_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].messages[0].content.contains("5. 只要行业资源"));
    assert!(!calls[1].messages[0].content.contains("5. 行业资源\n"));
}

// =============================================================================
// Chat mode
// =============================================================================

#[tokio::test]
async fn chat_flow_reaches_turn_limit_and_finalizes() {
    let provider = MockCompletionProvider::new()
        .with_reply("你好！先聊聊你在做什么？")
        .with_reply("目前到什么阶段了？")
        .with_reply("你最需要什么支持？")
        .with_reply("你能为社区带来什么？")
        .with_reply(profile_body());
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Founder, None);

    let update = flow.start().await.unwrap();
    assert_eq!(
        update,
        FlowUpdate::AssistantReplied("你好！先聊聊你在做什么？".to_string())
    );
    assert_eq!(flow.history().len(), 1);

    // Greeting is turn 1; three full exchanges bring the log to 7 turns.
    for (i, message) in ["我在做发薪工具", "刚上线 MVP", "需要技术合伙人"]
        .iter()
        .enumerate()
    {
        let update = flow.send_message(message).await.unwrap();
        assert!(
            matches!(update, FlowUpdate::AssistantReplied(_)),
            "exchange {i} should reply"
        );
    }
    assert_eq!(flow.history().len(), CHAT_TURN_LIMIT);

    // The next message routes to finalization instead of another reply.
    let update = flow.send_message("就这些了").await.unwrap();
    match update {
        FlowUpdate::ProfileReady(profile) => assert_eq!(profile.role, Role::Founder),
        other => panic!("expected profile, got {other:?}"),
    }
    assert!(flow.is_terminated());

    // 1 opening + 3 exchanges + 1 generation.
    let calls = provider.get_calls();
    assert_eq!(calls.len(), 5);
    assert!(calls[4].is_structured());
    assert!(calls[4].messages[0].content.contains("user: 就这些了"));
}

#[tokio::test]
async fn chat_message_before_start_is_rejected() {
    let provider = MockCompletionProvider::new();
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Explorer, None);

    let err = flow.send_message("hello?").await.unwrap_err();
    assert!(matches!(err, GatewayError::NoActiveSession));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn chat_start_failure_is_session_init_and_retryable() {
    let provider = MockCompletionProvider::new()
        .with_failure(MockFailure::Timeout { timeout_secs: 30 })
        .with_reply("你好！");
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Investor, None);

    let err = flow.start().await.unwrap_err();
    assert!(matches!(err, GatewayError::SessionInit(_)));

    // A second start opens the session normally.
    let update = flow.start().await.unwrap();
    assert_eq!(update, FlowUpdate::AssistantReplied("你好！".to_string()));
    assert_eq!(flow.history().len(), 1);
}

#[tokio::test]
async fn chat_seed_profile_sets_role_and_deepening_instructions() {
    let seed = Profile {
        name: "PayFlow".to_string(),
        role: Role::Founder,
        tagline: "Payroll without the pain".to_string(),
        tags: vec!["Fintech".to_string()],
        description: "Building payroll for small teams".to_string(),
        needs: "Technical co-founder".to_string(),
        offers: "Industry connections".to_string(),
        avatar_url: None,
        is_verified: false,
    };

    let provider = MockCompletionProvider::new().with_reply("上次聊到招人，进展如何？");
    // Seeded flows take the role from the profile, not the argument.
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Explorer, Some(seed));

    flow.start().await.unwrap();
    assert_eq!(flow.role(), Some(Role::Founder));

    let calls = provider.get_calls();
    let instruction = calls[0].system_instruction.as_deref().unwrap();
    assert!(instruction.contains("DEEPEN"));
    assert!(instruction.contains("Name: PayFlow"));
    assert_eq!(calls[0].messages[0].content, "Let's deepen the profile.");
}

#[tokio::test]
async fn chat_empty_reply_falls_back_to_canned_line() {
    let provider = MockCompletionProvider::new()
        .with_reply("你好！")
        .with_reply("   ");
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Founder, None);

    flow.start().await.unwrap();
    let update = flow.send_message("在吗？").await.unwrap();
    assert_eq!(update, FlowUpdate::AssistantReplied(FALLBACK_REPLY.to_string()));
    assert_eq!(flow.history().len(), 3);
}

#[tokio::test]
async fn chat_turn_failure_keeps_history_for_retry() {
    let provider = MockCompletionProvider::new()
        .with_reply("你好！")
        .with_failure(MockFailure::Network {
            message: "reset".to_string(),
        })
        .with_reply("听到了，继续说。");
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Founder, None);

    flow.start().await.unwrap();
    let err = flow.send_message("我在做支付").await.unwrap_err();
    assert!(matches!(err, GatewayError::Completion(_)));

    // The failed user turn stays in the flow history; sending works again.
    assert_eq!(flow.state(), &FlowState::Conversation { pending: false });
    assert_eq!(flow.history().len(), 2);

    let update = flow.send_message("还在吗").await.unwrap();
    assert!(matches!(update, FlowUpdate::AssistantReplied(_)));
}

#[tokio::test]
async fn chat_finalize_failure_allows_further_conversation() {
    let provider = MockCompletionProvider::new()
        .with_reply("你好！")
        .with_reply("not json")
        .with_reply("没事，我们继续。")
        .with_reply(profile_body());
    let mut flow = ProfileFlow::chat(gateway(&provider), Role::Founder, None)
        .with_turn_limit(20);

    flow.start().await.unwrap();
    let err = flow.finalize().await.unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
    assert_eq!(flow.state(), &FlowState::Conversation { pending: false });

    // Conversation continues after the failed finalization.
    flow.send_message("再补充一点").await.unwrap();
    let update = flow.finalize().await.unwrap();
    assert!(matches!(update, FlowUpdate::ProfileReady(_)));
}

#[tokio::test]
async fn turn_limit_override_shortens_the_interview() {
    let provider = MockCompletionProvider::new()
        .with_reply("你好！")
        .with_reply(profile_body());
    let mut flow =
        ProfileFlow::chat(gateway(&provider), Role::Explorer, None).with_turn_limit(1);

    flow.start().await.unwrap();
    let update = flow.send_message("我是学生，想认识创始人").await.unwrap();
    assert!(matches!(update, FlowUpdate::ProfileReady(_)));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn cancel_terminates_and_further_input_is_ignored() {
    let provider = MockCompletionProvider::new();
    let mut flow = ProfileFlow::wizard(gateway(&provider), Some(Role::Founder));

    flow.submit_answer("PayFlow").await.unwrap();
    assert_eq!(flow.cancel(), FlowUpdate::Cancelled);
    assert!(flow.is_terminated());

    assert_eq!(flow.cancel(), FlowUpdate::Ignored);
    assert_eq!(flow.submit_answer("late").await.unwrap(), FlowUpdate::Ignored);
    assert_eq!(provider.call_count(), 0);
}
