mod support;

use std::sync::Arc;
use std::time::Duration;

use folio_core::{Event, Msg, RequestError, Resource, StatusChange, UploadedManifest};
use folio_engine::{EngineSettings, PollSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{Harness, ScriptedApi};

const SOURCE: &str = "https://iiif.example.org/liber/manifest.json";

fn submit(harness: &mut Harness) {
    harness.send(Msg::UploadSubmitted {
        source_url: SOURCE.to_string(),
    });
}

fn upload_changes(events: &[Event]) -> Vec<StatusChange<UploadedManifest, RequestError>> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Upload { change, .. } => Some(change.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn finished_job_fetches_the_location_and_registers_the_manifest() {
    let imported = json!({"id": "liber", "remote_url": SOURCE});
    let api = Arc::new(
        ScriptedApi::new()
            .with_status_url("/status/9/")
            .with_poll(200, Some(json!({"status": 1})))
            .with_poll(200, Some(json!({"status": 0, "location": "/manifests/liber/"})))
            .with_uploaded("/manifests/liber/", imported.clone()),
    );
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    harness.settle().await;

    let expected = UploadedManifest {
        url: "/manifests/liber/".into(),
        resource: imported,
    };
    assert_eq!(
        upload_changes(&harness.take_events()),
        vec![StatusChange::Pending, StatusChange::Success(expected.clone())]
    );
    assert_eq!(
        harness.state.uploads().get(&SOURCE.to_string()),
        Some(&Resource::Success(expected))
    );
    assert_eq!(
        harness
            .state
            .manifest("liber")
            .and_then(|record| record.remote_url.as_deref()),
        Some(SOURCE)
    );
    assert_eq!(api.count("poll_upload"), 2);
    assert_eq!(api.count("fetch_uploaded"), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_job_surfaces_the_server_message() {
    let api = Arc::new(
        ScriptedApi::new()
            .with_status_url("/status/9/")
            .with_poll(
                200,
                Some(json!({"status": -1, "error": "Not a IIIF manifest"})),
            ),
    );
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    harness.settle().await;

    assert_eq!(
        harness.state.uploads().get(&SOURCE.to_string()),
        Some(&Resource::Error(
            RequestError::rejection("Not a IIIF manifest"),
            None
        ))
    );
    assert_eq!(api.count("fetch_uploaded"), 0);
}

#[tokio::test(start_paused = true)]
async fn server_errors_while_polling_are_retried() {
    let imported = json!({"id": "liber", "remote_url": SOURCE});
    let api = Arc::new(
        ScriptedApi::new()
            .with_status_url("/status/9/")
            .with_poll(503, None)
            .with_poll(502, None)
            .with_poll(200, Some(json!({"status": 0, "location": "/manifests/liber/"})))
            .with_uploaded("/manifests/liber/", imported),
    );
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    harness.settle().await;

    assert!(harness
        .state
        .uploads()
        .get(&SOURCE.to_string())
        .is_some_and(Resource::is_success));
    assert_eq!(api.count("poll_upload"), 3);
}

#[tokio::test(start_paused = true)]
async fn other_poll_statuses_fail_the_upload() {
    let api = Arc::new(
        ScriptedApi::new()
            .with_status_url("/status/9/")
            .with_poll(404, None),
    );
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    harness.settle().await;

    assert_eq!(
        harness.state.uploads().get(&SOURCE.to_string()),
        Some(&Resource::Error(RequestError::transport(404, ""), None))
    );
    assert_eq!(api.count("poll_upload"), 1);
}

#[tokio::test(start_paused = true)]
async fn polling_gives_up_after_the_configured_number_of_polls() {
    let api = Arc::new(ScriptedApi::new().with_status_url("/status/9/"));
    let settings = EngineSettings {
        poll: PollSettings {
            interval: Duration::from_millis(1000),
            max_polls: 3,
        },
        ..EngineSettings::default()
    };
    let mut harness = Harness::with_settings(api.clone(), settings);

    submit(&mut harness);
    harness.settle().await;

    assert!(matches!(
        harness.state.uploads().get(&SOURCE.to_string()),
        Some(Resource::Error(RequestError::Timeout { .. }, None))
    ));
    assert_eq!(api.count("poll_upload"), 3);
}

#[tokio::test(start_paused = true)]
async fn polls_are_spaced_by_the_interval() {
    let api = Arc::new(ScriptedApi::new().with_status_url("/status/9/"));
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    // Polls at 0s, 1s and 2s.
    assert_eq!(api.count("poll_upload"), 3);
    drop(harness);
}

#[tokio::test(start_paused = true)]
async fn cancelling_stops_the_poll_loop() {
    let api = Arc::new(ScriptedApi::new().with_status_url("/status/9/"));
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    harness.send(Msg::UploadCancelled {
        source_url: SOURCE.to_string(),
    });
    harness.settle().await;

    assert_eq!(
        upload_changes(&harness.take_events()),
        vec![
            StatusChange::Pending,
            StatusChange::Error(RequestError::Cancelled)
        ]
    );
    assert_eq!(api.count("poll_upload"), 2);
}

#[tokio::test(start_paused = true)]
async fn invalid_source_urls_never_reach_the_server() {
    let api = Arc::new(ScriptedApi::new().with_status_url("/status/9/"));
    let mut harness = Harness::new(api.clone());

    harness.send(Msg::UploadSubmitted {
        source_url: "ftp://iiif.example.org/m.json".to_string(),
    });
    harness.settle().await;

    assert!(matches!(
        harness.take_events().as_slice(),
        [Event::UploadValidationFailed { .. }]
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn resubmitting_while_polling_is_ignored() {
    let imported = json!({"id": "liber", "remote_url": SOURCE});
    let api = Arc::new(
        ScriptedApi::new()
            .with_status_url("/status/9/")
            .with_poll(200, Some(json!({"status": 1})))
            .with_poll(200, Some(json!({"status": 0, "location": "/manifests/liber/"})))
            .with_uploaded("/manifests/liber/", imported),
    );
    let mut harness = Harness::new(api.clone());

    submit(&mut harness);
    submit(&mut harness);
    harness.settle().await;

    assert_eq!(api.count("submit_upload"), 1);
}
