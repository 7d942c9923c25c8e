//! Scenario tests for the synchronization core.
//!
//! These tests drive a `Repository` over the in-memory `MockBackend` and
//! check the observable behavior a presentation layer relies on: labels,
//! in-flight flags, notifications, and how often the backend is invoked.

use std::sync::Arc;
use std::time::Duration;

use gitsync::core::types::AheadBehind;
use gitsync::git::mock::{FailOn, MockBackend};
use gitsync::sync::{
    CheckoutOptions, ChoiceValue, OperationClass, Outcome, PushOptions, RepoSettings, Repository,
    SkipReason, SyncError,
};
use gitsync::ui::notify::{NotificationLevel, RecordingNotifier};

/// Repository over a mock backend, with a notifier that records.
struct Harness {
    backend: MockBackend,
    repo: Arc<Repository>,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(backend: MockBackend) -> Self {
        let notifier = RecordingNotifier::new();
        let repo = Repository::new(
            "/work",
            Arc::new(backend.clone()),
            Arc::new(notifier.clone()),
            RepoSettings::default(),
        );
        Self {
            backend,
            repo: Arc::new(repo),
            notifier,
        }
    }

    async fn label(&self) -> String {
        self.repo
            .model()
            .await
            .expect("model")
            .sync
            .expect("present repository has a sync display")
            .label
    }
}

fn tracking(ahead: u32, behind: u32) -> MockBackend {
    MockBackend::new()
        .with_remote("origin")
        .with_upstream("main", "origin/main", ahead, behind)
}

// =============================================================================
// Contention
// =============================================================================

mod contention {
    use super::*;

    /// Start `class` on a held backend command, fire a second request of the
    /// same class while the first is parked, then let the first finish.
    async fn second_request_is_noop(backend: MockBackend, command: &str, class: OperationClass) {
        let h = Harness::new(backend);
        let hold = h.backend.hold(command);

        let first = {
            let repo = Arc::clone(&h.repo);
            tokio::spawn(async move {
                match class {
                    OperationClass::Push => repo.push("main", PushOptions::default()).await,
                    OperationClass::Pull => repo.pull().await,
                    OperationClass::Fetch => repo.fetch().await,
                    OperationClass::Checkout => {
                        repo.checkout("develop", CheckoutOptions::default()).await
                    }
                }
            })
        };

        hold.started().await;
        assert!(h.repo.operation_states().is_in_progress(class));
        let before = h.backend.invocations().len();

        let second = match class {
            OperationClass::Push => h.repo.push("main", PushOptions::default()).await,
            OperationClass::Pull => h.repo.pull().await,
            OperationClass::Fetch => h.repo.fetch().await,
            OperationClass::Checkout => {
                h.repo
                    .checkout("develop", CheckoutOptions::default())
                    .await
            }
        };
        assert_eq!(second.unwrap(), Outcome::Skipped(SkipReason::Busy(class)));
        assert_eq!(h.backend.invocations().len(), before);

        hold.release();
        assert_eq!(first.await.unwrap().unwrap(), Outcome::Completed);
        assert!(!h.repo.operation_states().is_in_progress(class));
        assert_eq!(h.backend.count(command), 1);
    }

    #[tokio::test]
    async fn push() {
        second_request_is_noop(tracking(1, 0), "push", OperationClass::Push).await;
    }

    #[tokio::test]
    async fn pull() {
        second_request_is_noop(tracking(0, 1), "pull", OperationClass::Pull).await;
    }

    #[tokio::test]
    async fn fetch() {
        second_request_is_noop(tracking(0, 0), "fetch", OperationClass::Fetch).await;
    }

    #[tokio::test]
    async fn checkout() {
        second_request_is_noop(
            MockBackend::new().with_branches(&["develop"]),
            "checkout",
            OperationClass::Checkout,
        )
        .await;
    }

    #[tokio::test]
    async fn different_classes_overlap() {
        let h = Harness::new(tracking(0, 0).with_branches(&["develop"]));
        let hold = h.backend.hold("fetch");

        let fetch = {
            let repo = Arc::clone(&h.repo);
            tokio::spawn(async move { repo.fetch().await })
        };
        hold.started().await;

        let checkout = h
            .repo
            .checkout("develop", CheckoutOptions::default())
            .await
            .unwrap();
        assert_eq!(checkout, Outcome::Completed);

        hold.release();
        fetch.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn model_reports_flags_while_in_flight() {
        let h = Harness::new(tracking(0, 2));
        h.repo.model().await.unwrap();
        let hold = h.backend.hold("pull");

        let pull = {
            let repo = Arc::clone(&h.repo);
            tokio::spawn(async move { repo.pull().await })
        };
        hold.started().await;

        let model = h.repo.model().await.unwrap();
        assert!(model.operation_states.pull);
        assert!(!model.sync_enabled);

        hold.release();
        pull.await.unwrap().unwrap();
        assert!(h.repo.model().await.unwrap().sync_enabled);
    }
}

// =============================================================================
// Branches
// =============================================================================

mod branches {
    use super::*;

    #[tokio::test]
    async fn checkout_round_trip() {
        let h = Harness::new(MockBackend::new().with_branches(&["develop"]));

        let outcome = h
            .repo
            .checkout("develop", CheckoutOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let state = h.repo.current_branch().await.unwrap().unwrap();
        assert_eq!(state.name(), "develop");
        assert!(!state.is_detached());
    }

    #[tokio::test]
    async fn create_branch_switches_to_it() {
        let h = Harness::new(MockBackend::new());

        h.repo.create_branch("feature/login").await.unwrap();

        assert_eq!(h.backend.head_branch().as_deref(), Some("feature/login"));
        let names: Vec<String> = h
            .repo
            .branches()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["feature/login", "main"]);
    }

    #[tokio::test]
    async fn create_existing_branch_fails() {
        let h = Harness::new(MockBackend::new().with_branches(&["feature"]));

        let err = h.repo.create_branch("feature").await.unwrap_err();
        assert!(matches!(err, SyncError::BranchExists { ref name } if name == "feature"));

        // never reached the backend checkout
        assert_eq!(h.backend.count("checkout"), 0);
        assert_eq!(
            h.repo.current_branch().await.unwrap().unwrap().name(),
            "main"
        );
        assert!(!h.repo.operation_states().is_checkout_in_progress());
        assert_eq!(h.notifier.titles(), vec!["Cannot create branch"]);

        // a corrected name goes through
        h.repo.create_branch("feature-2").await.unwrap();
        assert_eq!(h.backend.head_branch().as_deref(), Some("feature-2"));
    }

    #[tokio::test]
    async fn detached_sentinel_never_collides() {
        let h = Harness::new(
            MockBackend::new()
                .with_branches(&["detached"])
                .detached_at("main~2"),
        );

        let choices = h.repo.branch_choices().await.unwrap();
        let selected = choices.selected().unwrap();
        assert_eq!(selected.value, ChoiceValue::Detached);
        assert_eq!(selected.label, "main~2");
        assert!(selected.disabled);

        let real: Vec<_> = choices
            .entries
            .iter()
            .filter(|e| e.value != ChoiceValue::Detached)
            .collect();
        assert_eq!(real.len(), 2);
        assert!(real.iter().all(|e| !e.disabled));
        assert!(real.iter().any(|e| e.label == "detached"));

        let branches = h.repo.branches().await.unwrap();
        assert_eq!(branches.len(), 2);
    }

    #[tokio::test]
    async fn checkout_conflict_lists_paths() {
        let h = Harness::new(
            MockBackend::new()
                .with_branches(&["develop"])
                .fail_on(FailOn::checkout_overwrite("develop", &["README.md", "src/lib.rs"])),
        );

        let err = h
            .repo
            .checkout("develop", CheckoutOptions::default())
            .await
            .unwrap_err();
        match &err {
            SyncError::CheckoutConflict { paths, .. } => {
                assert_eq!(paths, &vec!["README.md".to_string(), "src/lib.rs".to_string()]);
            }
            other => panic!("expected CheckoutConflict, got {other:?}"),
        }

        let notifications = h.notifier.notifications();
        assert_eq!(notifications[0].title, "Checkout aborted");
        assert!(notifications[0].description.contains("src/lib.rs"));
        assert_eq!(h.backend.head_branch().as_deref(), Some("main"));
    }
}

// =============================================================================
// Synchronization
// =============================================================================

mod synchronization {
    use super::*;

    #[tokio::test]
    async fn no_remote_is_inert() {
        let h = Harness::new(MockBackend::new());
        assert_eq!(h.label().await, "No remote");

        let outcome = h.repo.run_sync_action().await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Inert));
        for command in ["fetch", "push", "pull"] {
            assert_eq!(h.backend.count(command), 0, "{command} was invoked");
        }
    }

    #[tokio::test]
    async fn behind_two_pulls_once() {
        let h = Harness::new(tracking(0, 2));
        assert_eq!(h.label().await, "Pull 2");

        let hold = h.backend.hold("pull");
        let click = {
            let repo = Arc::clone(&h.repo);
            tokio::spawn(async move { repo.run_sync_action().await })
        };
        hold.started().await;

        let again = h.repo.run_sync_action().await.unwrap();
        assert_eq!(again, Outcome::Skipped(SkipReason::Busy(OperationClass::Pull)));

        hold.release();
        assert_eq!(click.await.unwrap().unwrap(), Outcome::Completed);
        assert_eq!(h.backend.count("pull"), 1);
        assert_eq!(h.label().await, "Fetch");
    }

    #[tokio::test]
    async fn labels_follow_divergence() {
        assert_eq!(Harness::new(tracking(0, 0)).label().await, "Fetch");
        assert_eq!(Harness::new(tracking(3, 0)).label().await, "Push 3");
        assert_eq!(Harness::new(tracking(2, 5)).label().await, "2 Pull 5");
        assert_eq!(
            Harness::new(MockBackend::new().with_remote("origin")).label().await,
            "Publish"
        );
        assert_eq!(
            Harness::new(tracking(1, 1).detached_at("v1.0^0")).label().await,
            "Not on branch"
        );
    }

    #[tokio::test]
    async fn external_change_shows_after_invalidation() {
        let h = Harness::new(tracking(0, 0));
        assert_eq!(h.label().await, "Fetch");

        // a collaborator pushed; the next fetch would reveal it
        h.backend.set_divergence("main", 0, 3);
        assert_eq!(h.label().await, "Fetch");

        h.repo.invalidate();
        assert_eq!(h.label().await, "Pull 3");
    }

    #[tokio::test]
    async fn both_ahead_and_behind_pulls_first() {
        let h = Harness::new(tracking(2, 1));
        h.repo.run_sync_action().await.unwrap();

        assert_eq!(h.backend.count("pull"), 1);
        assert_eq!(h.backend.count("push"), 0);
        // merge commit on top of the local work
        assert_eq!(h.label().await, "Push 3");
    }

    #[tokio::test]
    async fn publish_sets_upstream() {
        let h = Harness::new(MockBackend::new().with_remote("origin"));
        assert_eq!(h.label().await, "Publish");

        h.repo.run_sync_action().await.unwrap();

        assert_eq!(h.backend.upstream_of("main").as_deref(), Some("origin/main"));
        assert_eq!(h.label().await, "Fetch");
    }

    #[tokio::test]
    async fn push_rejected() {
        let h = Harness::new(tracking(1, 0).fail_on(FailOn::push_rejected("origin", "main")));

        let err = h
            .repo
            .push("main", PushOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::PushRejected { .. }));

        let notifications = h.notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Push rejected");
        assert!(notifications[0].description.contains("pulling before pushing"));
        assert!(!h.repo.operation_states().is_push_in_progress());

        // local state unchanged
        assert_eq!(
            h.repo.ahead_behind().await.unwrap(),
            Some(AheadBehind::Diverged { ahead: 1, behind: 0 })
        );
    }

    #[tokio::test]
    async fn merge_conflict_is_warning_and_active() {
        let h = Harness::new(
            tracking(1, 1)
                .with_status(" M", "local-only.txt")
                .fail_on(FailOn::PullConflict(vec!["shared.txt".into()])),
        );

        let err = h.repo.pull().await.unwrap_err();
        match &err {
            SyncError::MergeConflict { paths } => assert_eq!(paths, &vec!["shared.txt".to_string()]),
            other => panic!("expected MergeConflict, got {other:?}"),
        }

        let notifications = h.notifier.notifications();
        assert_eq!(notifications[0].level, NotificationLevel::Warning);
        assert_eq!(notifications[0].title, "Merge conflicts");
        assert!(h.repo.merge_in_progress().await.unwrap());
        assert!(!h.repo.operation_states().is_pull_in_progress());

        // working tree changes are left alone
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn successful_pull_clears_merge() {
        let h = Harness::new(tracking(1, 1).fail_on(FailOn::PullConflict(vec!["a.txt".into()])));
        h.repo.pull().await.unwrap_err();
        assert!(h.repo.merge_in_progress().await.unwrap());

        h.backend.clear_fail_on();
        h.repo.pull().await.unwrap();
        assert!(!h.repo.merge_in_progress().await.unwrap());
    }
}

// =============================================================================
// Changed files and the change signal
// =============================================================================

mod changes {
    use super::*;

    #[tokio::test]
    async fn staging_recounts_distinct_paths() {
        let h = Harness::new(
            MockBackend::new()
                .with_status(" M", "edited.txt")
                .with_status(" D", "deleted.txt")
                .with_status("??", "new.txt"),
        );
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 3);

        h.repo
            .stage_files(&["deleted.txt", "new.txt"])
            .await
            .unwrap();

        // deletion staged counts once, not once per column
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 3);
        assert_eq!(h.backend.count("add"), 1);
    }

    #[tokio::test]
    async fn count_changes_only_after_invalidation() {
        let h = Harness::new(MockBackend::new().with_status(" M", "a.txt"));
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 1);

        h.backend.touch("??", "b.txt");
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 1);

        h.repo.invalidate();
        assert_eq!(h.repo.changed_file_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn signal_fires_once_per_invalidation() {
        let h = Harness::new(tracking(0, 0).with_branches(&["develop"]));
        let mut rx = h.repo.subscribe();
        let start = *rx.borrow_and_update();

        h.repo
            .checkout("develop", CheckoutOptions::default())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("signal")
            .unwrap();
        assert_eq!(*rx.borrow_and_update(), start + 1);

        // reads do not signal
        h.repo.model().await.unwrap();
        assert!(!rx.has_changed().unwrap());

        h.repo.fetch().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), start + 2);
    }

    #[tokio::test]
    async fn failed_operation_does_not_signal() {
        let h = Harness::new(tracking(1, 0).fail_on(FailOn::push_rejected("origin", "main")));
        let mut rx = h.repo.subscribe();
        rx.borrow_and_update();

        h.repo
            .push("main", PushOptions::default())
            .await
            .unwrap_err();
        assert!(!rx.has_changed().unwrap());
    }
}
