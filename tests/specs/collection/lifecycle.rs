//! Collection lifecycle specs
//!
//! Verify acquire/release pairing, rollback and failure aggregation.

use crate::prelude::*;

#[tokio::test]
async fn full_success_pairs_acquire_with_release() {
    for n in [0, 1, 3, 8] {
        let members = fakes(n);
        let set = set_of(&members);

        set.acquire_resources().await.unwrap();
        set.release_resources().await.unwrap();

        for fake in &members {
            assert_eq!(
                fake.calls(),
                vec![ManagerCall::Acquire, ManagerCall::Release]
            );
            assert_eq!(fake.state(), RELEASED);
        }
    }
}

#[tokio::test]
async fn one_failed_acquire_rolls_back_the_others() {
    let members = fakes(3);
    members[1].fail_acquire("disk full");
    let set = set_of(&members);

    let result = scoped_collection(&set, || async { Ok::<_, BodyError>(()) }).await;

    let Err(ScopeError::Acquire(group)) = result else {
        panic!("expected acquire failure, got {:?}", result);
    };
    assert_eq!(group.len(), 1);
    assert_eq!(group.failed_members(), vec![1]);
    assert!(group.contains_message("disk full"));
    assert!(group.rollback().is_none());

    assert_eq!(members[0].state(), ROLLED_BACK);
    assert_eq!(members[1].state(), UNTOUCHED);
    assert_eq!(members[2].state(), ROLLED_BACK);
    assert_eq!(members[1].calls(), vec![ManagerCall::Acquire]);
    for i in [0, 2] {
        assert_eq!(members[i].call_count(ManagerCall::Release), 0);
        assert_eq!(members[i].call_count(ManagerCall::ReleaseOnError), 1);
    }
}

#[tokio::test]
async fn one_failed_release_is_reported_and_others_still_release() {
    let members = fakes(3);
    members[1].fail_release("socket closed");
    let set = set_of(&members);

    let result = scoped_collection(&set, || async { Ok::<_, BodyError>(()) }).await;

    let Err(ScopeError::Release(group)) = result else {
        panic!("expected release failure, got {:?}", result);
    };
    assert_eq!(group.len(), 1);
    assert_eq!(group.message(), "1 resources were not released");
    assert_eq!(group.failures()[0].name, "rm-1");
    assert_eq!(group.failures()[0].phase, Phase::Release);

    assert_eq!(members[0].state(), RELEASED);
    assert_eq!(members[1].state(), HELD);
    assert_eq!(members[2].state(), RELEASED);
}

#[tokio::test]
async fn every_release_failure_is_enumerated() {
    let members = fakes(5);
    members[0].fail_release("a");
    members[3].fail_release("b");
    members[4].fail_release("c");
    let set = set_of(&members);

    set.acquire_resources().await.unwrap();
    let group = set.release_resources().await.unwrap_err();

    assert_eq!(group.failed_members(), vec![0, 3, 4]);
    let messages: Vec<String> = group.failures().iter().map(|f| f.error.to_string()).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
    assert_eq!(members[1].state(), RELEASED);
    assert_eq!(members[2].state(), RELEASED);
}

#[tokio::test]
async fn several_acquire_failures_and_a_rollback_failure_all_surface() {
    let members = fakes(5);
    members[1].fail_acquire("first");
    members[3].fail_acquire("second");
    members[4].fail_release_on_error("rollback broke");
    let set = set_of(&members);

    let group = set.acquire_resources().await.unwrap_err();

    assert_eq!(group.message(), "2 resources were not acquired");
    assert_eq!(group.failed_members(), vec![1, 3]);
    let rollback = group.rollback().expect("rollback failures should be chained");
    assert_eq!(rollback.failed_members(), vec![4]);
    assert_eq!(rollback.failures()[0].phase, Phase::ReleaseOnError);
    assert_eq!(group.all_failures().count(), 3);
    assert!(group.contains_message("rollback broke"));

    let source = std::error::Error::source(&group).expect("rollback is the source");
    assert_eq!(source.to_string(), "1 resources were not released");

    assert_eq!(members[0].state(), ROLLED_BACK);
    assert_eq!(members[2].state(), ROLLED_BACK);
}

#[tokio::test]
async fn single_member_failure_uses_the_aggregate_shape() {
    let members = fakes(1);
    members[0].fail_acquire("nope");
    let set = set_of(&members);

    let group: ErrorGroup = set.acquire_resources().await.unwrap_err();

    assert_eq!(group.len(), 1);
    assert_eq!(group.failures()[0].index, 0);
    assert_eq!(group.failures()[0].phase, Phase::Acquire);
    assert!(matches!(
        group.failures()[0].error,
        ResourceError::AcquireFailed(_)
    ));
}

#[tokio::test]
async fn collection_can_be_entered_again_after_release() {
    let members = fakes(2);
    let set = set_of(&members);

    for _ in 0..3 {
        scoped_collection(&set, || async { Ok::<_, BodyError>(()) })
            .await
            .unwrap();
    }

    for fake in &members {
        assert_eq!(fake.call_count(ManagerCall::Acquire), 3);
        assert_eq!(fake.call_count(ManagerCall::Release), 3);
    }
}

#[tokio::test(start_paused = true)]
async fn members_are_acquired_concurrently() {
    let delay = Duration::from_secs(1);
    let members: Vec<Arc<FakeResourceManager>> = (0..6)
        .map(|i| Arc::new(FakeResourceManager::new(format!("slow-{}", i)).with_delay(delay)))
        .collect();
    let set = set_of(&members);

    let start = tokio::time::Instant::now();
    set.acquire_resources().await.unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed < delay * 2,
        "six 1s acquires took {:?}; expected about 1s",
        elapsed
    );
    set.release_resources().await.unwrap();
}

#[tokio::test]
async fn nested_collection_failures_are_reachable() {
    let inner_members = fakes(2);
    inner_members[1].fail_acquire("inner broke");
    let inner = CollectionManager::new(
        set_of(&inner_members).with_config(CollectionConfig::new("inner")),
    );
    let outer_fake = Arc::new(FakeResourceManager::new("outer-member"));

    let outer: ManagerSet = [
        outer_fake.clone() as SharedManager,
        Arc::new(inner) as SharedManager,
    ]
    .into_iter()
    .collect();

    let group = outer.acquire_resources().await.unwrap_err();

    assert_eq!(group.failed_members(), vec![1]);
    assert_eq!(group.failures()[0].name, "inner");
    let nested = group.failures()[0].error.group().expect("nested group");
    assert_eq!(nested.failed_members(), vec![1]);
    assert!(group.contains_message("inner broke"));

    assert_eq!(outer_fake.state(), ROLLED_BACK);
    assert_eq!(inner_members[0].state(), ROLLED_BACK);
}
