//! Concrete manager specs
//!
//! Verify lock files and semaphores coordinated through collections.

use crate::prelude::*;
use tempfile::TempDir;
use tokio::sync::Semaphore;

fn service_set(dir: &TempDir, semaphore: &Arc<Semaphore>) -> ManagerSet {
    let members: Vec<SharedManager> = vec![
        Arc::new(TracedResourceManager::new(LockFileManager::new(
            dir.path().join("service.lock"),
        ))),
        Arc::new(TracedResourceManager::new(
            SemaphoreManager::new("workers", Arc::clone(semaphore)).without_waiting(),
        )),
        Arc::new(NoOpResourceManager::new()),
    ];
    ManagerSet::new(members).with_config(CollectionConfig::new("service"))
}

#[tokio::test]
async fn collection_holds_lock_and_permit_inside_scope() {
    let dir = TempDir::new().unwrap();
    let semaphore = Arc::new(Semaphore::new(1));
    let set = service_set(&dir, &semaphore);
    let lock_path = dir.path().join("service.lock");

    scoped_collection(&set, || async {
        assert!(lock_path.exists());
        assert_eq!(semaphore.available_permits(), 0);
        Ok::<_, BodyError>(())
    })
    .await
    .unwrap();

    assert!(!lock_path.exists());
    assert_eq!(semaphore.available_permits(), 1);
}

#[tokio::test]
async fn conflicting_lock_rolls_back_the_permit() {
    let dir = TempDir::new().unwrap();
    let semaphore = Arc::new(Semaphore::new(2));
    let first = service_set(&dir, &semaphore);
    let second = service_set(&dir, &semaphore);

    first.acquire_resources().await.unwrap();
    let group = second.acquire_resources().await.unwrap_err();

    assert_eq!(group.failed_members(), vec![0]);
    assert!(group.contains_message("locked by another holder"));
    assert_eq!(semaphore.available_permits(), 1, "second permit rolled back");

    first.release_resources().await.unwrap();
    assert_eq!(semaphore.available_permits(), 2);
    assert!(!dir.path().join("service.lock").exists());
}

#[tokio::test]
async fn exhausted_semaphore_fails_without_waiting() {
    let semaphore = Arc::new(Semaphore::new(1));
    let holder = SemaphoreManager::new("holder", Arc::clone(&semaphore));
    holder.acquire_resources().await.unwrap();

    let fake = Arc::new(FakeResourceManager::new("cache"));
    let members: Vec<SharedManager> = vec![
        fake.clone(),
        Arc::new(SemaphoreManager::new("pool", Arc::clone(&semaphore)).without_waiting()),
    ];
    let set = ManagerSet::new(members);

    let group = set.acquire_resources().await.unwrap_err();

    assert_eq!(group.failures()[0].name, "pool");
    assert!(group.contains_message("fewer than 1 permits available"));
    assert_eq!(fake.state(), ROLLED_BACK);

    holder.release_resources().await.unwrap();
    set.acquire_resources().await.unwrap();
    set.release_resources().await.unwrap();
}

#[tokio::test]
async fn body_error_still_cleans_up_real_resources() {
    let dir = TempDir::new().unwrap();
    let semaphore = Arc::new(Semaphore::new(1));
    let set = service_set(&dir, &semaphore);

    let result = scoped_collection(&set, || async {
        Err::<(), _>(BodyError::new("handler crashed"))
    })
    .await;

    assert!(matches!(result, Err(ScopeError::Body(_))));
    assert!(!dir.path().join("service.lock").exists());
    assert_eq!(semaphore.available_permits(), 1);
}

#[tokio::test]
async fn noop_collection_member_never_fails() {
    let members: Vec<SharedManager> = (0..4)
        .map(|_| Arc::new(NoOpResourceManager::new()) as SharedManager)
        .collect();
    let set = ManagerSet::new(members);

    set.acquire_resources().await.unwrap();
    set.release_resources_on_error().await.unwrap();
    assert_eq!(set.resource_managers()[0].name(), "noop");
}

#[tokio::test]
async fn timed_out_scope_frees_lock_and_permit() {
    let dir = TempDir::new().unwrap();
    let semaphore = Arc::new(Semaphore::new(1));
    let set = service_set(&dir, &semaphore);

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        scoped_collection(&set, || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, BodyError>(())
        }),
    )
    .await;
    assert!(result.is_err());

    let permit = tokio::time::timeout(Duration::from_secs(5), semaphore.acquire())
        .await
        .expect("permit returned after the dropped scope")
        .unwrap();
    drop(permit);

    let lock_path = dir.path().join("service.lock");
    tokio::time::timeout(Duration::from_secs(5), async {
        while lock_path.exists() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("lock file removed after the dropped scope");
}
