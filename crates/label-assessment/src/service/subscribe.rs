//! Subscription pipeline: labels pushed over an event stream.
//!
//! ```text
//! Connecting ──► Streaming ──┬─► TimedOut      (no frame within the window)
//!                            ├─► LimitReached  (total >= limit)
//!                            ├─► Closed        (server ended the stream)
//!                            └─► Failed        (transport or error frame)
//! ```
//!
//! The inactivity timer is a pinned `Sleep` owned by the consume loop, so it
//! is dropped on every exit path.

use super::inspect::{LabelInspector, UnsignedLabelPolicy};
use super::require_pass;
use crate::domain::abort::{AbortCause, AbortController, AbortSignal};
use crate::domain::assessment::Assessment;
use crate::domain::entities::{StreamTermination, SubscribeRequest, SubscriptionOutcome};
use crate::domain::envelope::{decode_frame, ErrorFrame, Frame, SubscriptionMessage};
use crate::domain::errors::{AssessmentError, TransportError};
use crate::domain::flags::Flag;
use crate::ports::outbound::{FrameStream, LabelStreamClient};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Open the stream and consume it until it terminates.
pub(crate) async fn run<S: LabelStreamClient + ?Sized>(
    client: &S,
    request: &SubscribeRequest,
    abort: &AbortController,
    inactivity_window: Duration,
) -> Result<SubscriptionOutcome, AssessmentError> {
    let mut signal = abort.signal();

    let connected = tokio::select! {
        biased;
        cause = signal.aborted() => Err(StreamTermination::Aborted(cause)),
        result = client.subscribe_labels(request) => result.map_err(StreamTermination::Failed),
    };

    let mut assessment = Assessment::new();
    let termination = match connected {
        Ok(frames) => {
            let inspector = LabelInspector::new(
                request.key.as_deref(),
                request.policies.as_ref(),
                UnsignedLabelPolicy::FlagWithKey,
            );
            let mut consumer = Consumer {
                inspector,
                abort,
                limit: request.limit,
                assessment: &mut assessment,
            };
            consumer.consume(frames, &mut signal, inactivity_window).await
        }
        Err(termination) => termination,
    };

    conclude(assessment, termination)
}

struct Consumer<'a> {
    inspector: LabelInspector<'a>,
    abort: &'a AbortController,
    limit: u64,
    assessment: &'a mut Assessment,
}

impl Consumer<'_> {
    async fn consume(
        &mut self,
        mut frames: FrameStream,
        signal: &mut AbortSignal,
        window: Duration,
    ) -> StreamTermination {
        let inactivity = tokio::time::sleep(window);
        tokio::pin!(inactivity);

        loop {
            tokio::select! {
                biased;
                cause = signal.aborted() => {
                    debug!(%cause, "Label stream aborted");
                    return StreamTermination::Aborted(cause);
                }
                () = &mut inactivity => {
                    self.abort.abort(AbortCause::Timeout);
                }
                next = frames.next() => {
                    inactivity.as_mut().reset(Instant::now() + window);
                    match next {
                        None => {
                            info!("Label stream ended");
                            return StreamTermination::Closed;
                        }
                        Some(Err(e)) => return StreamTermination::Failed(e),
                        Some(Ok(bytes)) => {
                            if let Some(failure) = self.handle_frame(&bytes) {
                                return StreamTermination::Failed(failure);
                            }
                            if self.assessment.total() >= self.limit {
                                self.abort.abort(AbortCause::LimitReached);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Inspect one frame. Returns the cause if the frame ends the stream.
    fn handle_frame(&mut self, bytes: &[u8]) -> Option<TransportError> {
        match decode_frame(bytes) {
            Ok(Frame::Message(SubscriptionMessage::Labels(message))) => {
                debug!(seq = message.seq, count = message.labels.len(), "Labels frame");
                for label in &message.labels {
                    self.inspector.inspect(label, self.assessment);
                }
                None
            }
            Ok(Frame::Message(SubscriptionMessage::Info(notice))) => {
                info!(name = %notice.name, message = ?notice.message, "Info frame");
                None
            }
            Ok(Frame::Message(SubscriptionMessage::Unknown(kind))) => {
                debug!(%kind, "Ignoring message of unknown type");
                None
            }
            Ok(Frame::Error(ErrorFrame { error, message })) => Some(match message {
                Some(message) => TransportError::Remote { error, message },
                None => TransportError::Stream(error),
            }),
            Err(e) => {
                debug!(error = %e, "Frame failed envelope validation");
                self.assessment.add_flag(Flag::InvalidMessage(e.to_string()));
                None
            }
        }
    }
}

/// Turn the final state into the pipeline result.
fn conclude(
    mut assessment: Assessment,
    termination: StreamTermination,
) -> Result<SubscriptionOutcome, AssessmentError> {
    let fatal = termination.fatal_error();

    if assessment.total() == 0 {
        if termination == StreamTermination::Aborted(AbortCause::Timeout) {
            return Err(AssessmentError::NoLabelsBeforeTimeout);
        }
        if let Some(err) = fatal {
            warn!(error = %err, "Label stream failed before any label");
            return Err(AssessmentError::StreamTransport(err));
        }
    } else if let Some(err) = fatal {
        warn!(error = %err, "Label stream failed");
        assessment.add_flag(Flag::StreamFailed(err.to_string()));
    }

    let assessment = require_pass(assessment)?;
    Ok(SubscriptionOutcome {
        assessment,
        termination,
    })
}
