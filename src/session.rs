//! Interactive session: startup gate and the capture → review → trigger → run loop
//!
//! One utterance is processed to completion before the next capture is
//! requested. Nothing carries over between interactions.

use crate::config::MISSING_CONFIG_WARNING;
use crate::pipeline::{Pipeline, RunReport};
use crate::presenter::Presenter;
use crate::{Config, Result};

/// Result of a single capture/trigger/run cycle
#[derive(Debug)]
pub enum Interaction {
    /// The presenter had no further capture
    Ended,
    /// A capture was made but the user declined to process it
    Skipped,
    /// The pipeline ran
    Completed(RunReport),
}

/// Open a session, halting before any control is offered if configuration failed
///
/// # Errors
///
/// Returns the configuration error after showing the warning
pub fn open<P: Presenter>(config: Result<Config>, mut presenter: P) -> Result<Session<P>> {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration incomplete");
            presenter.warning(MISSING_CONFIG_WARNING);
            presenter.error(&e.to_string());
            return Err(e);
        }
    };

    let pipeline = Pipeline::from_config(&config)?;
    tracing::info!(
        model = %config.completion.model,
        region = %config.speech.region,
        "session ready"
    );

    Ok(Session::new(pipeline, presenter))
}

/// Pairs a pipeline with the surface it reports to
pub struct Session<P: Presenter> {
    pipeline: Pipeline,
    presenter: P,
}

impl<P: Presenter> Session<P> {
    /// Create a session from an assembled pipeline
    #[must_use]
    pub const fn new(pipeline: Pipeline, presenter: P) -> Self {
        Self {
            pipeline,
            presenter,
        }
    }

    /// The presentation surface
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The orchestrator
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run one capture → review → trigger → pipeline cycle
    ///
    /// A capture that cannot be played back is still offered for processing.
    ///
    /// # Errors
    ///
    /// Returns error if the capture surface fails
    #[allow(clippy::future_not_send)]
    pub async fn interact(&mut self) -> Result<Interaction> {
        let Some(capture) = self.presenter.capture()? else {
            return Ok(Interaction::Ended);
        };

        tracing::debug!(capture_bytes = capture.len(), "capture ready");

        if let Err(e) = self.presenter.review(&capture) {
            tracing::warn!(error = %e, "capture playback failed");
            self.presenter
                .warning(&format!("Could not play back the recording: {e}"));
        }

        if !self.presenter.confirm_processing() {
            tracing::debug!("processing declined");
            return Ok(Interaction::Skipped);
        }

        let report = self.pipeline.run(capture, &mut self.presenter).await;
        Ok(Interaction::Completed(report))
    }

    /// Keep interacting until the presenter ends the session
    ///
    /// With `once`, stop after the first processed capture. Reports are
    /// dropped as soon as each run is logged. Returns the number of runs.
    ///
    /// # Errors
    ///
    /// Returns error if the capture surface fails
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self, once: bool) -> Result<usize> {
        let mut runs = 0;

        loop {
            match self.interact().await? {
                Interaction::Ended => break,
                Interaction::Skipped => {}
                Interaction::Completed(report) => {
                    runs += 1;
                    tracing::info!(
                        run_id = %report.run_id,
                        state = ?report.state,
                        "run finished"
                    );
                    if once {
                        break;
                    }
                }
            }
        }

        Ok(runs)
    }
}
