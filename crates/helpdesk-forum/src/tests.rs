//! Tests for help-forum module behavior and regressions.

use std::sync::Arc;

use helpdesk_commands::{CommandRouter, DispatchOutcome};
use helpdesk_core::{
    Actor, ButtonAction, Clock, IncomingMessage, ManualClock, NoticeKind, ReactionEmoji,
    ReactionEvent, ThreadDescriptor,
};
use helpdesk_store::{InMemoryKvStore, KvStore};

use crate::test_support::FakeForumGateway;
use crate::{
    ClassifyOutcome, ForumError, ForumLayout, ForumTag, HelpForum, HelpForumConfig, PingOutcome,
    StatusChangeOutcome, ThreadCreatedOutcome, ThreadDeletedOutcome, ThreadRecord, ThreadStatus,
};

const FORUM: &str = "100";
const HELP_REQUESTS: &str = "200";
const HELPER_ROLE: &str = "300";
const START_MS: u64 = 1_700_000_000_000;
const COOLDOWN_MS: u64 = 2 * 60 * 60 * 1_000;

const SHORT_POST: &str = "my code does not work";

fn long_post() -> String {
    "I am trying to parse a config file with serde and the derive keeps failing with a \
     lifetime error that I do not understand at all, here is the full code and the error"
        .to_string()
}

fn tag(id: &str, name: &str, moderated: bool, emoji: Option<ReactionEmoji>) -> ForumTag {
    ForumTag {
        id: id.to_string(),
        name: name.to_string(),
        moderated,
        emoji,
    }
}

fn ferris() -> ReactionEmoji {
    ReactionEmoji::Custom {
        id: "99".to_string(),
        name: Some("ferris".to_string()),
    }
}

fn bug() -> ReactionEmoji {
    ReactionEmoji::Unicode {
        name: "🐛".to_string(),
    }
}

fn star() -> ReactionEmoji {
    ReactionEmoji::Unicode {
        name: "⭐".to_string(),
    }
}

fn forum_layout() -> ForumLayout {
    ForumLayout {
        channel_id: FORUM.to_string(),
        is_forum: true,
        available_tags: vec![
            tag("t-open", "Open", true, None),
            tag("t-resolved", "Resolved", true, None),
            tag("t-rust", "Rust", false, Some(ferris())),
            tag("t-bug", "Bug", false, Some(bug())),
            tag("t-staff", "Staff", true, Some(star())),
        ],
    }
}

fn config() -> HelpForumConfig {
    HelpForumConfig::new(FORUM, HELP_REQUESTS, "Open", "Resolved", HELPER_ROLE)
}

fn seeded_gateway() -> Arc<FakeForumGateway> {
    let gateway = Arc::new(FakeForumGateway::default());
    gateway.insert_layout(forum_layout());
    gateway.insert_text_channel(HELP_REQUESTS);
    gateway.set_bot_user_id("bot");
    gateway
}

struct Harness {
    forum: Arc<HelpForum>,
    gateway: Arc<FakeForumGateway>,
    clock: Arc<ManualClock>,
    store: Arc<InMemoryKvStore>,
    router: CommandRouter,
}

async fn harness_with(config: HelpForumConfig) -> Harness {
    let gateway = seeded_gateway();
    let clock = Arc::new(ManualClock::new(START_MS));
    let store = Arc::new(InMemoryKvStore::with_clock(clock.clone()));
    let mut router = CommandRouter::new(vec!["!".to_string()], Vec::new()).expect("router");
    let forum = HelpForum::setup(
        config,
        gateway.clone(),
        store.clone(),
        clock.clone(),
        &mut router,
    )
    .await
    .expect("forum setup");
    Harness {
        forum,
        gateway,
        clock,
        store,
        router,
    }
}

async fn harness() -> Harness {
    harness_with(config()).await
}

impl Harness {
    /// Creates a help thread owned by `owner` and runs the creation handler.
    async fn create_thread(
        &self,
        thread_id: &str,
        owner: &str,
        post: &str,
    ) -> ThreadCreatedOutcome {
        let mut thread = ThreadDescriptor::new(thread_id);
        thread.parent_id = Some(FORUM.to_string());
        thread.owner_id = Some(owner.to_string());
        thread.created_at_ms = Some(self.clock.now_unix_ms());
        self.gateway.insert_thread(thread.clone());
        self.gateway.set_starter_content(thread_id, post);
        self.forum
            .on_thread_created(&thread)
            .await
            .expect("thread created")
    }

    fn message(&self, thread_id: &str, author: Actor, content: &str) -> IncomingMessage {
        IncomingMessage {
            id: format!("cmd-{}", self.gateway.notices().len()),
            channel_id: thread_id.to_string(),
            author,
            content: content.to_string(),
            thread: self.gateway.thread(thread_id),
        }
    }

    async fn record(&self, thread_id: &str) -> Option<ThreadRecord> {
        self.forum.records().load(thread_id).await.expect("load record")
    }

    fn reaction(&self, thread_id: &str, user: &str, emoji: ReactionEmoji) -> ReactionEvent {
        ReactionEvent {
            channel_id: thread_id.to_string(),
            message_id: thread_id.to_string(),
            user_id: Some(user.to_string()),
            emoji,
        }
    }
}

#[tokio::test]
async fn functional_setup_resolves_status_tags_and_registers_commands() {
    let harness = harness().await;
    assert_eq!(harness.forum.status_tags().open, "t-open");
    assert_eq!(harness.forum.status_tags().resolved, "t-resolved");
    for alias in ["helper", "helpers", "resolve", "solved", "reopen", "unresolve"] {
        assert!(harness.router.has_alias(alias), "missing alias {alias}");
    }
}

#[tokio::test]
async fn regression_setup_rejects_non_forum_channel() {
    let gateway = seeded_gateway();
    gateway.insert_layout(ForumLayout {
        is_forum: false,
        ..forum_layout()
    });
    let mut router = CommandRouter::new(vec!["!".to_string()], Vec::new()).expect("router");
    let error = HelpForum::setup(
        config(),
        gateway,
        Arc::new(InMemoryKvStore::new()),
        Arc::new(ManualClock::new(0)),
        &mut router,
    )
    .await
    .err()
    .expect("setup error");
    assert!(matches!(error, ForumError::NotAForum { channel_id } if channel_id == FORUM));
    assert!(!router.has_alias("helpers"));
}

#[tokio::test]
async fn regression_setup_rejects_missing_tag_and_non_text_requests_channel() {
    let mut router = CommandRouter::new(vec!["!".to_string()], Vec::new()).expect("router");
    let mut missing_tag = config();
    missing_tag.resolved_tag_name = "Closed".to_string();
    let error = HelpForum::setup(
        missing_tag,
        seeded_gateway(),
        Arc::new(InMemoryKvStore::new()),
        Arc::new(ManualClock::new(0)),
        &mut router,
    )
    .await
    .err()
    .expect("setup error");
    assert!(matches!(error, ForumError::TagNotFound { name, .. } if name == "Closed"));

    let gateway = Arc::new(FakeForumGateway::default());
    gateway.insert_layout(forum_layout());
    let error = HelpForum::setup(
        config(),
        gateway,
        Arc::new(InMemoryKvStore::new()),
        Arc::new(ManualClock::new(0)),
        &mut router,
    )
    .await
    .err()
    .expect("setup error");
    assert!(matches!(error, ForumError::NotTextChannel(id) if id == HELP_REQUESTS));
}

#[tokio::test]
async fn functional_thread_creation_stores_record_applies_open_tag_and_gates_content() {
    let harness = harness().await;
    let outcome = harness.create_thread("t1", "u1", SHORT_POST).await;
    assert_eq!(
        outcome,
        ThreadCreatedOutcome::Tracked {
            content_passed: Some(false)
        }
    );

    assert_eq!(harness.record("t1").await, Some(ThreadRecord::new("u1")));
    let expires = harness
        .forum
        .records()
        .expires_at_ms("t1")
        .await
        .expect("expiry");
    assert_eq!(expires, Some(START_MS + 7 * 24 * 60 * 60 * 1_000));
    assert_eq!(
        harness.gateway.thread("t1").expect("thread").applied_tags,
        vec!["t-open".to_string()]
    );

    let notices = harness.gateway.notices_in("t1");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(
        ButtonAction::parse(&notices[0].buttons[0].custom_id),
        ButtonAction::RetryContentCheck {
            thread_id: "t1".to_string(),
            message_id: "t1".to_string(),
        }
    );
}

#[tokio::test]
async fn functional_detailed_post_gets_success_notice() {
    let harness = harness().await;
    let outcome = harness.create_thread("t1", "u1", &long_post()).await;
    assert_eq!(
        outcome,
        ThreadCreatedOutcome::Tracked {
            content_passed: Some(true)
        }
    );
    let notices = harness.gateway.notices_in("t1");
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert!(notices[0].buttons.is_empty());
}

#[tokio::test]
async fn unit_threads_outside_forum_or_without_owner_are_ignored() {
    let harness = harness().await;
    let mut elsewhere = ThreadDescriptor::new("x1");
    elsewhere.parent_id = Some("999".to_string());
    elsewhere.owner_id = Some("u1".to_string());
    assert_eq!(
        harness
            .forum
            .on_thread_created(&elsewhere)
            .await
            .expect("created"),
        ThreadCreatedOutcome::Ignored
    );

    let mut ownerless = ThreadDescriptor::new("x2");
    ownerless.parent_id = Some(FORUM.to_string());
    assert_eq!(
        harness
            .forum
            .on_thread_created(&ownerless)
            .await
            .expect("created"),
        ThreadCreatedOutcome::Ignored
    );
    assert!(harness.store.is_empty().await);
    assert!(harness.gateway.tag_writes().is_empty());
}

#[tokio::test]
async fn functional_retry_recomputes_notice_without_posting() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", SHORT_POST).await;
    harness.gateway.set_starter_content("t1", long_post());

    let notice = harness
        .forum
        .recheck_content("t1", "t1")
        .await
        .expect("recheck");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(harness.gateway.notices().len(), 1);
}

#[tokio::test]
async fn regression_retry_for_missing_starter_message_is_an_error() {
    let harness = harness().await;
    let error = harness
        .forum
        .recheck_content("gone", "gone")
        .await
        .expect_err("missing starter");
    assert!(matches!(error, ForumError::StarterMessageMissing(id) if id == "gone"));
}

#[tokio::test]
async fn functional_owner_resolves_without_owner_addressed_notice() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    let message = harness.message("t1", Actor::member("u1"), "!resolve");

    let outcome = harness
        .forum
        .change_status(&message, ThreadStatus::Resolved)
        .await
        .expect("resolve");
    assert_eq!(
        outcome,
        StatusChangeOutcome::Changed {
            status: ThreadStatus::Resolved,
            applied_tags: vec!["t-resolved".to_string()],
        }
    );
    let notices = harness.gateway.notices_in("t1");
    let confirmation = notices.last().expect("confirmation");
    assert_eq!(confirmation.title, "Thread marked as resolved.");
    assert_eq!(
        confirmation.description.as_deref(),
        Some("Run `!reopen` to reopen the thread.")
    );
    assert!(notices.iter().all(|notice| notice.content.is_none()));
}

#[tokio::test]
async fn functional_helper_resolution_notifies_owner() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    let message = harness.message("t1", Actor::helper("h1"), "!resolve");

    harness
        .forum
        .change_status(&message, ThreadStatus::Resolved)
        .await
        .expect("resolve");
    let notices = harness.gateway.notices_in("t1");
    let owner_notice = notices.last().expect("owner notice");
    assert_eq!(owner_notice.content.as_deref(), Some("<@u1>"));
    assert_eq!(owner_notice.kind, NoticeKind::Info);
    let description = owner_notice.description.as_deref().expect("description");
    assert!(description.contains("<@h1>"));
    assert!(description.contains("`!reopen`"));
    assert!(description.contains("<#100>"));
}

#[tokio::test]
async fn functional_stranger_cannot_change_status() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    let message = harness.message("t1", Actor::member("u2"), "!resolve");

    let outcome = harness
        .forum
        .change_status(&message, ThreadStatus::Resolved)
        .await
        .expect("resolve");
    assert_eq!(outcome, StatusChangeOutcome::Unauthorized);
    assert_eq!(
        harness.gateway.thread("t1").expect("thread").applied_tags,
        vec!["t-open".to_string()]
    );
    let warning = harness.gateway.notices_in("t1").pop().expect("warning");
    assert_eq!(warning.kind, NoticeKind::Warning);
    assert!(warning.is_deletable());
}

#[tokio::test]
async fn functional_status_command_outside_help_thread_warns_in_channel() {
    let harness = harness().await;
    let message = IncomingMessage {
        id: "m1".to_string(),
        channel_id: "general".to_string(),
        author: Actor::member("u1"),
        content: "!resolve".to_string(),
        thread: None,
    };
    let outcome = harness
        .forum
        .change_status(&message, ThreadStatus::Resolved)
        .await
        .expect("resolve");
    assert_eq!(outcome, StatusChangeOutcome::NotHelpThread);
    let warning = harness.gateway.notices_in("general").pop().expect("warning");
    assert_eq!(warning.title, "Can only be run in a help post!");
    assert!(warning.is_deletable());
}

#[tokio::test]
async fn functional_owner_is_immutable_across_status_changes_and_pings() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness.clock.advance_ms(COOLDOWN_MS);

    for (author, content) in [
        (Actor::helper("h1"), "!resolve"),
        (Actor::member("u1"), "!reopen"),
        (Actor::member("u1"), "!helpers"),
        (Actor::helper("h2"), "!helpers"),
        (Actor::member("u2"), "!resolve"),
        (Actor::helper("h1"), "!done"),
    ] {
        let outcome = harness
            .router
            .dispatch(&harness.message("t1", author, content))
            .await;
        assert!(matches!(outcome, DispatchOutcome::Handled { .. }), "{content}");
        let record = harness.record("t1").await.expect("record");
        assert_eq!(record.owner_id(), "u1");
    }
    assert_eq!(
        harness.gateway.thread("t1").expect("thread").applied_tags,
        vec!["t-resolved".to_string()]
    );
}

#[tokio::test]
async fn functional_owner_ping_respects_cooldown() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;

    let outcome = harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::member("u1"), "!helpers"), "")
        .await
        .expect("ping");
    let next_allowed_ms = START_MS + COOLDOWN_MS;
    assert_eq!(outcome, PingOutcome::CoolingDown { next_allowed_ms });
    let wait = harness.gateway.notices_in("t1").pop().expect("wait notice");
    assert_eq!(wait.title, "Please wait a bit longer.");
    assert_eq!(
        wait.description.as_deref(),
        Some(format!("You can ping helpers <t:{}:R>.", next_allowed_ms / 1_000).as_str())
    );
    assert!(harness.gateway.texts().is_empty());

    harness.clock.advance_ms(COOLDOWN_MS);
    let outcome = harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::member("u1"), "!helpers"), "")
        .await
        .expect("ping");
    assert!(matches!(outcome, PingOutcome::Dispatched { .. }));

    harness.clock.advance_ms(60_000);
    let outcome = harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::member("u1"), "!helpers"), "")
        .await
        .expect("ping");
    assert_eq!(
        outcome,
        PingOutcome::CoolingDown {
            next_allowed_ms: START_MS + 2 * COOLDOWN_MS
        }
    );
}

#[tokio::test]
async fn functional_helper_bypasses_cooldown_and_can_attach_comment() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .on_reaction_added(&harness.reaction("t1", "u1", ferris()))
        .await
        .expect("classify");

    for _ in 0..2 {
        let outcome = harness
            .forum
            .ping_helpers(
                &harness.message("t1", Actor::helper("h1"), "!helpers needs a macro expert"),
                "needs a macro expert",
            )
            .await
            .expect("ping");
        assert!(matches!(outcome, PingOutcome::Dispatched { .. }));
    }

    let texts = harness.gateway.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].channel_id, HELP_REQUESTS);
    assert_eq!(
        texts[0].content,
        "<@&300> <#t1> (Open, <:ferris:99> Rust)\n> needs a macro expert"
    );
    let record = harness.record("t1").await.expect("record");
    assert_eq!(record.last_helpers_ping, Some(START_MS));
    assert_eq!(
        record.help_request_message_id.as_deref(),
        Some(texts[1].message_id.as_str())
    );
    let ack = harness.gateway.notices_in("t1").pop().expect("ack");
    assert_eq!(ack.title, "Helpers are on the way!");
    assert_eq!(ack.kind, NoticeKind::Special);
}

#[tokio::test]
async fn unit_owner_comment_is_not_forwarded() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness.clock.advance_ms(COOLDOWN_MS);
    harness
        .forum
        .ping_helpers(
            &harness.message("t1", Actor::member("u1"), "!helpers urgent!!"),
            "urgent!!",
        )
        .await
        .expect("ping");
    assert_eq!(harness.gateway.texts()[0].content, "<@&300> <#t1> (Open)");
}

#[tokio::test]
async fn functional_stranger_cannot_ping_helpers() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness.clock.advance_ms(COOLDOWN_MS);
    let outcome = harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::member("u2"), "!helpers"), "")
        .await
        .expect("ping");
    assert_eq!(outcome, PingOutcome::Unauthorized);
    assert!(harness.gateway.texts().is_empty());
    assert_eq!(harness.record("t1").await.expect("record").last_helpers_ping, None);
}

#[tokio::test]
async fn regression_failed_help_request_delivery_still_records_ping() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::helper("h1"), "!helpers"), "")
        .await
        .expect("first ping");
    let first_request = harness.gateway.texts()[0].message_id.clone();

    harness.gateway.fail_send_text(true);
    harness.clock.advance_ms(1_000);
    let outcome = harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::helper("h1"), "!helpers"), "")
        .await
        .expect("second ping");
    assert_eq!(
        outcome,
        PingOutcome::Dispatched {
            help_request_message_id: None
        }
    );
    let record = harness.record("t1").await.expect("record");
    assert_eq!(record.last_helpers_ping, Some(START_MS + 1_000));
    assert_eq!(record.help_request_message_id, Some(first_request));
    assert_eq!(
        harness.gateway.notices_in("t1").pop().expect("ack").title,
        "Helpers are on the way!"
    );
}

#[tokio::test]
async fn functional_status_change_refreshes_help_request() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::helper("h1"), "!helpers"), "")
        .await
        .expect("ping");
    let request_id = harness.gateway.texts()[0].message_id.clone();

    harness
        .forum
        .change_status(
            &harness.message("t1", Actor::member("u1"), "!solved"),
            ThreadStatus::Resolved,
        )
        .await
        .expect("resolve");
    let edits = harness.gateway.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].channel_id, HELP_REQUESTS);
    assert_eq!(edits[0].message_id, request_id);
    assert_eq!(edits[0].content, "<@&300> <#t1> (Resolved)");
}

#[tokio::test]
async fn regression_status_refresh_keeps_helper_comment() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .ping_helpers(
            &harness.message("t1", Actor::helper("h1"), "!helpers needs a macro expert"),
            "  needs a macro expert ",
        )
        .await
        .expect("ping");
    let sent = harness.gateway.texts()[0].content.clone();
    assert_eq!(sent, "<@&300> <#t1> (Open)\n> needs a macro expert");
    assert_eq!(
        harness
            .record("t1")
            .await
            .expect("record")
            .help_request_comment
            .as_deref(),
        Some("needs a macro expert")
    );

    let outcome = harness
        .router
        .dispatch(&harness.message("t1", Actor::member("u1"), "!solved"))
        .await;
    assert_eq!(
        outcome,
        DispatchOutcome::Handled {
            alias: "solved".to_string()
        }
    );
    let edits = harness.gateway.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0].content,
        "<@&300> <#t1> (Resolved)\n> needs a macro expert"
    );

    // A later ping without a comment replaces the quoted text.
    harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::helper("h1"), "!helpers"), "")
        .await
        .expect("second ping");
    assert_eq!(
        harness.record("t1").await.expect("record").help_request_comment,
        None
    );
}

#[tokio::test]
async fn functional_thread_deletion_removes_record_and_help_request() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .ping_helpers(&harness.message("t1", Actor::helper("h1"), "!helpers"), "")
        .await
        .expect("ping");
    let request_id = harness.gateway.texts()[0].message_id.clone();
    let thread = harness.gateway.thread("t1").expect("thread");

    let outcome = harness
        .forum
        .on_thread_deleted(&thread)
        .await
        .expect("deleted");
    assert_eq!(
        outcome,
        ThreadDeletedOutcome::Removed {
            help_request_deleted: true
        }
    );
    assert_eq!(
        harness.gateway.deleted(),
        vec![(HELP_REQUESTS.to_string(), request_id)]
    );
    assert!(harness.record("t1").await.is_none());
}

#[tokio::test]
async fn functional_missing_record_is_reconstructed_on_command() {
    let harness = harness().await;
    let mut thread = ThreadDescriptor::new("old");
    thread.parent_id = Some(FORUM.to_string());
    thread.owner_id = Some("u9".to_string());
    thread.applied_tags = vec!["t-bug".to_string()];
    harness.gateway.insert_thread(thread);

    let outcome = harness
        .forum
        .change_status(
            &harness.message("old", Actor::member("u9"), "!close"),
            ThreadStatus::Resolved,
        )
        .await
        .expect("resolve");
    assert!(matches!(outcome, StatusChangeOutcome::Changed { .. }));
    assert_eq!(harness.record("old").await, Some(ThreadRecord::new("u9")));
    assert_eq!(
        harness.gateway.thread("old").expect("thread").applied_tags,
        vec!["t-resolved".to_string(), "t-bug".to_string()]
    );
}

#[tokio::test]
async fn regression_unresolvable_thread_fails_the_command_only() {
    let harness = harness().await;
    let mut orphan = ThreadDescriptor::new("orphan");
    orphan.parent_id = Some(FORUM.to_string());
    let message = IncomingMessage {
        id: "m1".to_string(),
        channel_id: "orphan".to_string(),
        author: Actor::member("u1"),
        content: "!resolve".to_string(),
        thread: Some(orphan),
    };
    let outcome = harness.router.dispatch(&message).await;
    assert!(matches!(outcome, DispatchOutcome::Failed { alias, .. } if alias == "resolve"));
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn functional_reaction_applies_matching_tag_and_is_removed() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;

    let outcome = harness
        .forum
        .on_reaction_added(&harness.reaction("t1", "u2", bug()))
        .await
        .expect("classify");
    assert_eq!(
        outcome,
        ClassifyOutcome::TagApplied {
            tag_id: "t-bug".to_string()
        }
    );
    assert_eq!(
        harness.gateway.thread("t1").expect("thread").applied_tags,
        vec!["t-open".to_string(), "t-bug".to_string()]
    );
    let removed = harness.gateway.removed_reactions();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].user_id, "u2");
    assert_eq!(removed[0].emoji, bug());

    let outcome = harness
        .forum
        .on_reaction_added(&harness.reaction("t1", "u2", bug()))
        .await
        .expect("classify");
    assert_eq!(
        outcome,
        ClassifyOutcome::AlreadyApplied {
            tag_id: "t-bug".to_string()
        }
    );
    assert_eq!(harness.gateway.removed_reactions().len(), 2);
}

#[tokio::test]
async fn functional_unknown_or_moderated_emoji_never_mutates_tags() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;
    let writes_before = harness.gateway.tag_writes().len();

    for emoji in [
        star(),
        ReactionEmoji::Unicode {
            name: "👍".to_string(),
        },
        ReactionEmoji::Custom {
            id: "12345".to_string(),
            name: Some("ferris".to_string()),
        },
    ] {
        let outcome = harness
            .forum
            .on_reaction_added(&harness.reaction("t1", "u2", emoji))
            .await
            .expect("classify");
        assert_eq!(outcome, ClassifyOutcome::NoMatchingTag);
    }
    assert_eq!(harness.gateway.tag_writes().len(), writes_before);
    assert_eq!(harness.gateway.removed_reactions().len(), 3);
}

#[tokio::test]
async fn functional_reaction_at_tag_ceiling_is_removed_without_write() {
    let mut config = config();
    config.max_applied_tags = 2;
    let harness = harness_with(config).await;
    harness.create_thread("t1", "u1", &long_post()).await;
    harness
        .forum
        .on_reaction_added(&harness.reaction("t1", "u2", bug()))
        .await
        .expect("classify");
    let writes_before = harness.gateway.tag_writes().len();

    let outcome = harness
        .forum
        .on_reaction_added(&harness.reaction("t1", "u2", ferris()))
        .await
        .expect("classify");
    assert_eq!(
        outcome,
        ClassifyOutcome::AtCapacity {
            tag_id: "t-rust".to_string()
        }
    );
    assert_eq!(harness.gateway.tag_writes().len(), writes_before);
    assert_eq!(harness.gateway.removed_reactions().len(), 2);
}

#[tokio::test]
async fn unit_reactions_off_the_starter_post_or_from_the_bot_are_ignored() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", &long_post()).await;

    let mut reply_reaction = harness.reaction("t1", "u2", bug());
    reply_reaction.message_id = "reply-1".to_string();
    let bot_reaction = harness.reaction("t1", "bot", bug());
    let mut outside = harness.reaction("elsewhere", "u2", bug());
    outside.message_id = "elsewhere".to_string();

    for reaction in [reply_reaction, bot_reaction, outside] {
        let outcome = harness
            .forum
            .on_reaction_added(&reaction)
            .await
            .expect("classify");
        assert_eq!(outcome, ClassifyOutcome::Ignored);
    }
    assert!(harness.gateway.removed_reactions().is_empty());
}

#[tokio::test]
async fn unit_help_request_text_skips_unknown_tags() {
    let harness = harness().await;
    let thread = ThreadDescriptor::new("t9").with_applied_tags(vec![
        "gone".to_string(),
        "t-rust".to_string(),
    ]);
    assert_eq!(
        harness.forum.help_request_text(&thread, Some("  ")),
        "<@&300> <#t9> (<:ferris:99> Rust)"
    );
    assert_eq!(
        harness.forum.help_request_text(&ThreadDescriptor::new("t9"), None),
        "<@&300> <#t9>"
    );
}

#[tokio::test]
async fn unit_store_is_shared_through_the_kv_trait() {
    let harness = harness().await;
    harness.create_thread("t1", "u1", SHORT_POST).await;
    let key = crate::thread_record_key("t1").expect("key");
    let raw = harness.store.get(&key).await.expect("get").expect("raw");
    assert_eq!(raw, r#"{"ownerId":"u1"}"#);
}
