use std::sync::Arc;

use helpdesk_commands::{CommandRouter, DispatchOutcome};
use helpdesk_core::{
    Actor, ButtonAction, Clock, IncomingMessage, ManualClock, NoticeKind, ThreadDescriptor,
};
use helpdesk_forum::test_support::FakeForumGateway;
use helpdesk_forum::{
    ForumLayout, ForumTag, HelpForum, HelpForumConfig, ThreadCreatedOutcome, THREAD_RECORD_TTL,
};
use helpdesk_store::{InMemoryKvStore, KvStore, SqliteKvStore, StoreKey};
use serde_json::Value;

const FORUM: &str = "100";
const HELP_REQUESTS: &str = "200";
const HELPER_ROLE: &str = "300";
const THREAD: &str = "500";
const OWNER: &str = "600";
const HELPER: &str = "700";
const START_MS: u64 = 1_700_000_000_000;
const COOLDOWN_MS: u64 = 2 * 60 * 60 * 1_000;

fn status_tag(id: &str, name: &str) -> ForumTag {
    ForumTag {
        id: id.to_string(),
        name: name.to_string(),
        moderated: true,
        emoji: None,
    }
}

fn integration_gateway() -> Arc<FakeForumGateway> {
    let gateway = Arc::new(FakeForumGateway::default());
    gateway.insert_layout(ForumLayout {
        channel_id: FORUM.to_string(),
        is_forum: true,
        available_tags: vec![
            status_tag("t-open", "Open"),
            status_tag("t-resolved", "Resolved"),
        ],
    });
    gateway.insert_text_channel(HELP_REQUESTS);
    gateway.set_bot_user_id("bot");
    gateway
}

async fn integration_forum(
    gateway: Arc<FakeForumGateway>,
    store: Arc<dyn KvStore>,
    clock: Arc<ManualClock>,
) -> (Arc<HelpForum>, CommandRouter) {
    let mut router = CommandRouter::new(vec!["!".to_string()], Vec::new()).expect("router");
    let forum = HelpForum::setup(
        HelpForumConfig::new(FORUM, HELP_REQUESTS, "Open", "Resolved", HELPER_ROLE),
        gateway,
        store,
        clock,
        &mut router,
    )
    .await
    .expect("forum setup");
    (forum, router)
}

fn new_thread(clock: &ManualClock) -> ThreadDescriptor {
    let mut thread = ThreadDescriptor::new(THREAD);
    thread.parent_id = Some(FORUM.to_string());
    thread.owner_id = Some(OWNER.to_string());
    thread.created_at_ms = Some(clock.now_unix_ms());
    thread
}

fn command(gateway: &FakeForumGateway, author: Actor, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: format!("cmd-{}", gateway.notices().len()),
        channel_id: THREAD.to_string(),
        author,
        content: content.to_string(),
        thread: gateway.thread(THREAD),
    }
}

fn applied_tags(gateway: &FakeForumGateway) -> Vec<String> {
    gateway.thread(THREAD).expect("thread").applied_tags
}

#[tokio::test]
async fn integration_help_thread_lifecycle_through_router() {
    let gateway = integration_gateway();
    let clock = Arc::new(ManualClock::new(START_MS));
    let store = Arc::new(InMemoryKvStore::with_clock(clock.clone()));
    let (forum, router) = integration_forum(gateway.clone(), store.clone(), clock.clone()).await;

    // A five-word post fails the content check.
    let thread = new_thread(&clock);
    gateway.insert_thread(thread.clone());
    gateway.set_starter_content(THREAD, "my code does not work");
    let created = forum.on_thread_created(&thread).await.expect("create");
    assert_eq!(
        created,
        ThreadCreatedOutcome::Tracked {
            content_passed: Some(false)
        }
    );
    let record = forum
        .records()
        .load(THREAD)
        .await
        .expect("load")
        .expect("record");
    assert_eq!(record.owner_id(), OWNER);
    assert_eq!(applied_tags(&gateway), vec!["t-open".to_string()]);

    let thread_notices = gateway.notices_in(THREAD);
    assert_eq!(thread_notices.len(), 1);
    assert_eq!(thread_notices[0].kind, NoticeKind::Error);
    let retry = thread_notices[0]
        .buttons
        .iter()
        .map(|button| ButtonAction::parse(&button.custom_id))
        .find(|action| matches!(action, ButtonAction::RetryContentCheck { .. }))
        .expect("retry button");

    // The owner edits the post and clicks retry.
    gateway.set_starter_content(
        THREAD,
        "I am trying to read a config file with serde and the derive fails with a lifetime \
         error that I cannot explain, here is the struct and the full compiler output below",
    );
    let ButtonAction::RetryContentCheck {
        thread_id,
        message_id,
    } = retry
    else {
        panic!("expected retry action");
    };
    let sent_before_retry = gateway.notices().len();
    let refreshed = forum
        .recheck_content(&thread_id, &message_id)
        .await
        .expect("recheck");
    assert_eq!(refreshed.kind, NoticeKind::Success);
    assert_eq!(gateway.notices().len(), sent_before_retry);

    // The owner pings helpers once the cooldown since creation has passed.
    clock.advance_ms(COOLDOWN_MS);
    let ping = router
        .dispatch(&command(&gateway, Actor::member(OWNER), "!helpers"))
        .await;
    assert_eq!(
        ping,
        DispatchOutcome::Handled {
            alias: "helpers".to_string()
        }
    );
    let texts = gateway.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].channel_id, HELP_REQUESTS);
    assert_eq!(texts[0].content, "<@&300> <#500> (Open)");

    // A helper resolves the thread.
    let resolve = router
        .dispatch(&command(&gateway, Actor::helper(HELPER), "!resolve"))
        .await;
    assert_eq!(
        resolve,
        DispatchOutcome::Handled {
            alias: "resolve".to_string()
        }
    );
    assert_eq!(applied_tags(&gateway), vec!["t-resolved".to_string()]);
    let owner_notice = gateway
        .notices_in(THREAD)
        .into_iter()
        .find(|notice| notice.title == "Thread marked as resolved by a helper.")
        .expect("owner notice");
    assert_eq!(owner_notice.content.as_deref(), Some("<@600>"));
    let edits = gateway.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].channel_id, HELP_REQUESTS);
    assert_eq!(edits[0].message_id, texts[0].message_id);
    assert_eq!(edits[0].content, "<@&300> <#500> (Resolved)");

    // The owner reopens it.
    let reopen = router
        .dispatch(&command(&gateway, Actor::member(OWNER), "!reopen"))
        .await;
    assert_eq!(
        reopen,
        DispatchOutcome::Handled {
            alias: "reopen".to_string()
        }
    );
    assert_eq!(applied_tags(&gateway), vec!["t-open".to_string()]);
    let record = forum
        .records()
        .load(THREAD)
        .await
        .expect("load")
        .expect("record");
    assert_eq!(record.owner_id(), OWNER);
    assert_eq!(
        record.help_request_message_id.as_deref(),
        Some(texts[0].message_id.as_str())
    );
}

#[tokio::test]
async fn integration_thread_record_persists_in_sqlite_across_restarts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("store.sqlite3");
    let clock = Arc::new(ManualClock::new(START_MS));
    let gateway = integration_gateway();
    let thread = new_thread(&clock);
    gateway.insert_thread(thread.clone());
    gateway.set_starter_content(THREAD, "short");

    {
        let store = Arc::new(SqliteKvStore::with_clock(&path, clock.clone()).expect("open store"));
        let (forum, _router) = integration_forum(gateway.clone(), store, clock.clone()).await;
        forum.on_thread_created(&thread).await.expect("create");
    }

    let store = Arc::new(SqliteKvStore::with_clock(&path, clock.clone()).expect("reopen store"));
    let key = StoreKey::new(["forum", THREAD]).expect("key");
    let raw = store.get(&key).await.expect("get").expect("persisted record");
    let value: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["ownerId"], OWNER);
    assert_eq!(
        store.expires_at_ms(&key).await.expect("expiry"),
        Some(START_MS + THREAD_RECORD_TTL.as_millis() as u64)
    );

    clock.advance_ms(THREAD_RECORD_TTL.as_millis() as u64);
    assert!(store.get(&key).await.expect("get").is_none());
}
