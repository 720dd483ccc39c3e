mod support;

use std::sync::Arc;
use std::time::Duration;

use crm_application::{AttachOutcome, AttachPhase, LiveListSynchronizer};
use crm_core::category::CategoryStore;
use crm_core::config::CrmConfig;
use crm_core::host::Annotation;
use crm_core::identity::IdentityResolver;
use support::{FakeHost, FakeNode, memory_repository, start_engine};

async fn synchronizer(host: Arc<FakeHost>) -> LiveListSynchronizer<FakeHost> {
    let config = CrmConfig::default();
    let (_kv, repository) = memory_repository();
    let mut store = CategoryStore::new(repository);
    store.load().await;
    LiveListSynchronizer::new(
        host,
        store,
        IdentityResolver::from_config(&config),
        config.probes.clone(),
    )
}

#[tokio::test]
async fn test_attach_same_container_is_noop() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let mut sync = synchronizer(host.clone()).await;

    let container = sync.locate_container().unwrap();
    assert_eq!(sync.attach(container.clone(), Box::new(|| {})), AttachOutcome::Attached);
    assert_eq!(
        sync.attach(container, Box::new(|| {})),
        AttachOutcome::AlreadyAttached
    );

    assert_eq!(host.active_observers(), 1);
    assert_eq!(host.total_observations(), 1);
}

#[tokio::test]
async fn test_attach_new_container_replaces_observer() {
    let host = FakeHost::with_list(vec![]);
    let mut sync = synchronizer(host.clone()).await;

    sync.attach("first".to_string(), Box::new(|| {}));
    let outcome = sync.attach("second".to_string(), Box::new(|| {}));

    assert_eq!(outcome, AttachOutcome::Replaced);
    assert_eq!(host.observed_containers(), vec!["second".to_string()]);
}

#[tokio::test]
async fn test_dropping_synchronizer_disconnects() {
    let host = FakeHost::with_list(vec![]);
    let mut sync = synchronizer(host.clone()).await;
    sync.attach("list".to_string(), Box::new(|| {}));
    assert!(sync.is_attached());

    drop(sync);

    assert_eq!(host.active_observers(), 0);
}

#[tokio::test]
async fn test_container_probes_fall_back_in_order() {
    let host = FakeHost::without_list(vec![]);
    host.show_container("[role=\"tabpanel\"]");
    host.show_container("#pane-side");
    let sync = synchronizer(host).await;

    assert_eq!(sync.locate_container(), Some("#pane-side".to_string()));
}

#[tokio::test]
async fn test_conversation_probes_fall_back_when_first_matches_nothing() {
    let alice = FakeNode::titled("Alice");
    let host = FakeHost::with_list(vec![alice.clone()]);
    host.set_conversation_selector("div[role=\"listitem\"]");
    let mut sync = synchronizer(host).await;

    assert_eq!(sync.wire_conversations(), 1);
    assert!(alice.is_draggable());
}

#[tokio::test]
async fn test_title_probe_falls_back_to_span_title() {
    let bob = FakeNode::with_text("span[title]", "  Bob  ");
    let host = FakeHost::with_list(vec![bob.clone()]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host, repository).await;

    let work = handle.create_category("Work").await.unwrap().unwrap();
    handle.drag_start(bob.clone());
    handle.drop_on(crm_core::category::CategoryTarget::Category(work.id.clone()));

    assert_eq!(handle.category_of("Bob").await.unwrap(), Some(work.id));
}

#[tokio::test(start_paused = true)]
async fn test_first_command_sees_attached_observer() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;

    // No time passes, so the retry timer cannot be what attached.
    let status = handle.status().await.unwrap();

    assert_eq!(status.phase, AttachPhase::Observing);
    assert_eq!(host.active_observers(), 1);
    assert_eq!(host.total_observations(), 1);
}

#[tokio::test]
async fn test_rewiring_is_idempotent() {
    let alice = FakeNode::titled("Alice");
    let bob = FakeNode::titled("Bob");
    let host = FakeHost::with_list(vec![alice.clone(), bob.clone()]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;
    handle.status().await.unwrap();

    host.notify_observers();
    host.notify_observers();
    let carol = FakeNode::titled("Carol");
    host.insert_nodes([carol.clone()]);
    handle.status().await.unwrap();

    for node in [&alice, &bob, &carol] {
        assert!(node.is_draggable());
        assert_eq!(node.handler_registrations(), 1);
    }
    assert_eq!(carol.annotation(), Some(Annotation::Uncategorized));
    assert_eq!(host.last_counts().unwrap().uncategorized, 3);
}

#[tokio::test]
async fn test_mutation_burst_costs_one_render_pass() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;
    handle.status().await.unwrap();
    let before = host.render_passes();

    for _ in 0..5 {
        host.notify_observers();
    }
    handle.status().await.unwrap();

    assert_eq!(host.render_passes(), before + 1);
}

#[tokio::test]
async fn test_rerendered_nodes_are_reannotated() {
    let alice = FakeNode::titled("Alice");
    let host = FakeHost::with_list(vec![alice.clone()]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;

    let work = handle.create_category("Work").await.unwrap().unwrap();
    handle.drag_start(alice.clone());
    handle.drop_on(crm_core::category::CategoryTarget::Category(work.id.clone()));
    handle.drag_end(alice);

    // The host throws away its items and renders fresh ones.
    let fresh = FakeNode::titled("Alice");
    host.replace_nodes(vec![fresh.clone()]);
    handle.status().await.unwrap();

    assert_eq!(fresh.annotated_category(), Some(work.id));
    assert_eq!(fresh.handler_registrations(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_attach_retries_until_container_appears() {
    let host = FakeHost::without_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(handle.status().await.unwrap().phase, AttachPhase::Searching);
    assert_eq!(host.active_observers(), 0);

    host.show_container("#pane-side");
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    assert_eq!(handle.status().await.unwrap().phase, AttachPhase::Observing);
    assert_eq!(host.observed_containers(), vec!["#pane-side".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_attach_gives_up_after_timeout() {
    let alice = FakeNode::titled("Alice");
    let host = FakeHost::without_list(vec![alice.clone()]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;

    tokio::time::sleep(Duration::from_millis(15_500)).await;
    assert_eq!(handle.status().await.unwrap().phase, AttachPhase::Degraded);

    // Late containers are not picked up without a reinitialize.
    host.show_container("#pane-side");
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(handle.status().await.unwrap().phase, AttachPhase::Degraded);
    assert_eq!(host.total_observations(), 0);

    // Drops still work without observation.
    let work = handle.create_category("Work").await.unwrap().unwrap();
    handle.drag_start(alice.clone());
    handle.drop_on(crm_core::category::CategoryTarget::Category(work.id.clone()));
    handle.status().await.unwrap();
    assert_eq!(alice.annotated_category(), Some(work.id));
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_attaches_after_degrade() {
    let host = FakeHost::without_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;

    tokio::time::sleep(Duration::from_millis(16_000)).await;
    host.show_container("[data-testid=\"chat-list\"]");
    handle.reinitialize().await.unwrap();

    assert_eq!(handle.status().await.unwrap().phase, AttachPhase::Observing);
    assert_eq!(host.active_observers(), 1);
}

#[tokio::test]
async fn test_reinitialize_keeps_a_single_observer() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, _engine) = start_engine(host.clone(), repository).await;
    handle.status().await.unwrap();

    handle.reinitialize().await.unwrap();
    handle.reinitialize().await.unwrap();

    assert_eq!(host.active_observers(), 1);
    assert_eq!(host.total_observations(), 3);
}

#[tokio::test]
async fn test_shutdown_disconnects_and_stops() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, engine) = start_engine(host.clone(), repository).await;
    handle.status().await.unwrap();
    assert_eq!(host.active_observers(), 1);

    handle.shutdown();
    engine.await.unwrap();

    assert_eq!(host.active_observers(), 0);
    assert!(!handle.is_running());
    assert!(handle.categories().await.is_err());
}

#[tokio::test]
async fn test_engine_stops_when_handles_are_dropped() {
    let host = FakeHost::with_list(vec![FakeNode::titled("Alice")]);
    let (_kv, repository) = memory_repository();
    let (handle, engine) = start_engine(host.clone(), repository).await;
    handle.status().await.unwrap();

    drop(handle);
    engine.await.unwrap();

    assert_eq!(host.active_observers(), 0);
}
