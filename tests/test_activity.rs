use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use resource_tree_wizard::api::settings_dto::DEFAULT_ACTIVITY_TITLE;
use resource_tree_wizard::domain::activity::activity::Activity;
use resource_tree_wizard::domain::activity::activity_options::{ActivityChildItem, ExecuteActivityOptions, ThemeIcon};
use resource_tree_wizard::domain::activity::activity_registry::ActivityRegistry;
use resource_tree_wizard::domain::activity::activity_status::ActivityStatus;
use resource_tree_wizard::domain::activity::progress::ProgressUpdate;
use resource_tree_wizard::domain::utils::id::ActivityId;
use resource_tree_wizard::error::Error;

fn record_statuses(activity: &Activity) -> Arc<Mutex<Vec<ActivityStatus>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    activity.subscribe(Arc::new(move |_: &ActivityId, status: ActivityStatus| sink.lock().unwrap().push(status)));
    seen
}

#[tokio::test]
async fn test_failed_task_exposes_error_child() {
    let activity = Activity::new(DEFAULT_ACTIVITY_TITLE);
    let seen = record_statuses(&activity);

    let result = activity
        .run(|progress, _| async move {
            progress.report(ProgressUpdate::message("10%"));
            Err::<(), _>(anyhow::anyhow!("disk full"))
        })
        .await;

    match result {
        Err(Error::Task(title, e)) => {
            assert_eq!(title, "Azure Activity");
            assert_eq!(e.to_string(), "disk full");
        }
        other => panic!("unexpected result {:?}", other),
    }

    assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Running, ActivityStatus::Failed]);
    assert_eq!(activity.get_status(), ActivityStatus::Failed);

    let state = activity.get_state();
    assert_eq!(state.label, "Azure Activity");
    assert_eq!(state.icon, Some(ThemeIcon::Error));
    assert_eq!(state.context_value.as_deref(), Some("activity:failed"));

    let children = state.get_children(activity.get_id());
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].label, "disk full");
    assert_eq!(activity.get_error().map(|e| e.message), Some("disk full".to_string()));
}

#[tokio::test]
async fn test_successful_task_status_sequence() {
    let activity = Activity::new("Create web app");
    let seen = record_statuses(&activity);

    assert_eq!(activity.get_state().icon, Some(ThemeIcon::Loading));

    let value = activity
        .run(|progress, _| async move {
            progress.report(ProgressUpdate::message("Creating plan").with_increment(50.0));
            progress.report(ProgressUpdate::message("Creating plan"));
            progress.report(ProgressUpdate::message("Creating app").with_increment(50.0));
            Ok::<_, anyhow::Error>("shop-frontend".to_string())
        })
        .await
        .unwrap();

    assert_eq!(value, "shop-frontend");
    assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Running, ActivityStatus::Running, ActivityStatus::Succeeded]);
    assert_eq!(activity.get_progress(), 100.0);
    assert_eq!(activity.get_state().icon, Some(ThemeIcon::Pass));
    assert!(activity.get_started_at().unwrap() <= activity.get_finished_at().unwrap());
}

#[tokio::test]
async fn test_second_run_is_rejected() {
    let activity = Activity::new("once");
    activity.run(|_, _| async { Ok::<_, anyhow::Error>(()) }).await.unwrap();
    let seen = record_statuses(&activity);

    let second = activity.run(|_, _| async { Ok::<_, anyhow::Error>(()) }).await;

    assert!(matches!(second, Err(Error::ActivityAlreadyStarted(id)) if &id == activity.get_id()));
    assert_eq!(activity.get_status(), ActivityStatus::Succeeded);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_success_children_are_produced_lazily() {
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let options = ExecuteActivityOptions::new("Deploy").with_success_children(Arc::new(move |id: &ActivityId| {
        *counter.lock().unwrap() += 1;
        vec![ActivityChildItem::new(format!("{}-app", id), "shop-frontend")]
    }));
    let activity = Activity::with_options_provider("Deploy", Arc::new(options));

    activity.run(|_, _| async { Ok::<_, anyhow::Error>(()) }).await.unwrap();
    let state = activity.get_state();
    assert_eq!(*calls.lock().unwrap(), 0);

    let children = state.get_children(activity.get_id());
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(children[0].id, format!("{}-app", activity.get_id()));
}

#[tokio::test]
async fn test_cancellation_fails_only_when_task_reacts() {
    let activity = Arc::new(Activity::new("Long running"));
    let seen = record_statuses(&activity);

    let runner = {
        let activity = activity.clone();
        tokio::spawn(async move {
            activity
                .run(|_, token| async move {
                    token.cancelled().await;
                    Err::<(), _>(anyhow::Error::new(Error::UserCancelled))
                })
                .await
        })
    };

    while activity.get_status() != ActivityStatus::Running {
        tokio::task::yield_now().await;
    }
    activity.cancel();

    let result = runner.await.unwrap();
    assert!(result.as_ref().is_err_and(|e| e.is_user_cancelled()));
    assert_eq!(activity.get_status(), ActivityStatus::Failed);
    assert!(activity.get_error().unwrap().is_user_cancelled);
    assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Failed]);
}

#[tokio::test]
async fn test_concurrent_activities_do_not_share_state() {
    let registry = ActivityRegistry::new();
    let activities: Vec<Arc<Activity>> = (0..3).map(|i| registry.create(format!("task-{}", i))).collect();

    let runs = activities.iter().enumerate().map(|(i, activity)| {
        activity.run(move |progress, _| async move {
            for step in 0..3 {
                progress.report(ProgressUpdate::message(format!("task-{} step {}", i, step)).with_increment(10.0));
                tokio::time::sleep(Duration::from_millis(5 * (3 - i as u64))).await;
            }
            Ok::<_, anyhow::Error>(i)
        })
    });
    let results = join_all(runs).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), i);
        assert_eq!(activities[i].get_message(), Some(format!("task-{} step 2", i)));
        assert_eq!(activities[i].get_progress(), 30.0);
        assert_eq!(activities[i].get_status(), ActivityStatus::Succeeded);
    }

    let titles: Vec<String> = registry.list().iter().map(|a| a.get_title().to_string()).collect();
    assert_eq!(titles, vec!["task-0", "task-1", "task-2"]);
    assert_eq!(registry.dispose_completed(), 3);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_panicking_task_fails_the_activity() {
    let registry = ActivityRegistry::new();
    let activity = registry.create("Explodes");
    let seen = record_statuses(&activity);

    let runner = {
        let activity = activity.clone();
        let explode = true;
        tokio::spawn(async move {
            activity
                .run(move |_, _| async move {
                    if explode {
                        panic!("boom");
                    }
                    Ok::<_, anyhow::Error>(())
                })
                .await
        })
    };

    assert!(runner.await.unwrap_err().is_panic());
    assert_eq!(activity.get_status(), ActivityStatus::Failed);
    assert_eq!(*seen.lock().unwrap(), vec![ActivityStatus::Running, ActivityStatus::Failed]);

    let error = activity.get_error().unwrap();
    assert_eq!(error.error_type, "Panic");
    assert_eq!(error.message, "boom");
    assert_eq!(activity.get_state().get_children(activity.get_id())[0].label, "boom");

    assert_eq!(registry.dispose_completed(), 1);
    assert!(registry.is_empty());
}
