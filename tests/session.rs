//! Session gating and loop tests

use std::sync::atomic::Ordering;

use voice_loop::config::MISSING_CONFIG_WARNING;
use voice_loop::{Error, Interaction, PipelineState, Session, session};

mod common;
use common::{RecordingPresenter, Script, Shown, config_with, fake_pipeline, utterance};

#[test]
fn test_missing_credentials_halt_before_capture() {
    let presenter = RecordingPresenter::new(vec![utterance()]);
    let log = presenter.log();
    let capture_calls = presenter.capture_calls();

    let config = config_with(&[("AZURE_SPEECH_REGION", "westeurope")]);
    let result = session::open(config, presenter);

    let Err(Error::Config(msg)) = result else {
        panic!("expected configuration error");
    };
    assert!(msg.contains("OPENROUTER_API_KEY"), "{msg}");
    assert!(msg.contains("AZURE_SPEECH_KEY"), "{msg}");
    assert!(!msg.contains("AZURE_SPEECH_REGION"), "{msg}");

    let shown = log.lock().unwrap().clone();
    assert_eq!(shown[0], Shown::Warning(MISSING_CONFIG_WARNING.to_string()));
    assert!(matches!(shown[1], Shown::Error(ref m) if m.contains("OPENROUTER_API_KEY")));
    assert_eq!(capture_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_complete_config_opens_without_messages() {
    let presenter = RecordingPresenter::new(vec![]);
    let log = presenter.log();

    let config = config_with(&[
        ("OPENROUTER_API_KEY", "or-key"),
        ("AZURE_SPEECH_KEY", "speech-key"),
        ("AZURE_SPEECH_REGION", "westeurope"),
    ]);
    let session = session::open(config, presenter).unwrap();

    assert_eq!(session.pipeline().state(), PipelineState::Idle);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_capture_without_trigger_never_runs() {
    let (pipeline, calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance()]).declining();
    let mut session = Session::new(pipeline, presenter);

    assert!(matches!(session.interact().await.unwrap(), Interaction::Skipped));
    assert!(matches!(session.interact().await.unwrap(), Interaction::Ended));

    let bytes = utterance().len();
    assert_eq!(calls.counts(), (0, 0, 0));
    assert_eq!(
        session.presenter().shown(),
        vec![
            Shown::Captured(bytes),
            Shown::Reviewed(bytes),
            Shown::Triggered(false),
        ]
    );
    assert_eq!(session.pipeline().state(), PipelineState::Idle);
}

#[tokio::test]
async fn test_recording_is_played_back_before_trigger() {
    let (pipeline, calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance()]);
    let mut session = Session::new(pipeline, presenter);

    let Interaction::Completed(report) = session.interact().await.unwrap() else {
        panic!("expected a completed run");
    };
    assert!(report.is_done());
    assert_eq!(calls.counts(), (1, 1, 1));

    let bytes = utterance().len();
    let shown = session.presenter().shown();
    assert_eq!(
        shown[..3],
        [
            Shown::Captured(bytes),
            Shown::Reviewed(bytes),
            Shown::Triggered(true),
        ]
    );
    assert_eq!(shown[3], Shown::Status("Processing...".to_string()));
}

#[tokio::test]
async fn test_unplayable_recording_still_offered_for_processing() {
    let (pipeline, calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance()]).with_unplayable_recordings();
    let mut session = Session::new(pipeline, presenter);

    let Interaction::Completed(report) = session.interact().await.unwrap() else {
        panic!("expected a completed run");
    };
    assert!(report.is_done());
    assert_eq!(calls.counts(), (1, 1, 1));

    let shown = session.presenter().shown();
    assert!(matches!(
        &shown[1],
        Shown::Warning(m) if m.starts_with("Could not play back the recording")
    ));
    assert_eq!(shown[2], Shown::Triggered(true));
}

#[tokio::test]
async fn test_interact_returns_run_report() {
    let (pipeline, _calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance()]);
    let mut session = Session::new(pipeline, presenter);

    let Interaction::Completed(report) = session.interact().await.unwrap() else {
        panic!("expected a completed run");
    };
    assert!(report.is_done());
    assert_eq!(report.reply.as_deref(), Some("Paris"));
}

#[tokio::test]
async fn test_once_stops_after_first_run() {
    let (pipeline, calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance(), utterance()]);
    let capture_calls = presenter.capture_calls();
    let mut session = Session::new(pipeline, presenter);

    let runs = session.run(true).await.unwrap();

    assert_eq!(runs, 1);
    assert_eq!(calls.counts(), (1, 1, 1));
    assert_eq!(capture_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_loop_processes_every_capture_in_order() {
    let (pipeline, calls) = fake_pipeline(Script::default());
    let presenter = RecordingPresenter::new(vec![utterance(), utterance(), utterance()]);
    let mut session = Session::new(pipeline, presenter);

    let runs = session.run(false).await.unwrap();

    assert_eq!(runs, 3);
    assert_eq!(calls.counts(), (3, 3, 3));
    let played = session
        .presenter()
        .shown()
        .iter()
        .filter(|s| matches!(s, Shown::Played(_)))
        .count();
    assert_eq!(played, 3);
}

#[tokio::test]
async fn test_failed_run_does_not_end_session() {
    let (pipeline, calls) = fake_pipeline(Script {
        reply: Err("API error 503 Service Unavailable: "),
        ..Script::default()
    });
    let presenter = RecordingPresenter::new(vec![utterance(), utterance()]);
    let mut session = Session::new(pipeline, presenter);

    let runs = session.run(false).await.unwrap();

    assert_eq!(runs, 2);
    assert_eq!(calls.counts(), (2, 2, 0));
    assert_eq!(session.pipeline().state(), PipelineState::Failed);
}
