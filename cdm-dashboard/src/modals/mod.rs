//! Create and update forms for CDM trades.
//!
//! Submitting runs two legs in order: the plain trade call, then the CDM
//! call. Nothing is retried or rolled back.

mod create;
mod update;

pub use create::CreateTradeModal;
pub use update::UpdateTradeModal;

use crate::error::ClientError;
use std::fmt;

/// Parent notification once a submit has fully succeeded.
pub type Callback = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Banner::Info(text) => write!(f, "[info] {}", text),
            Banner::Success(text) => write!(f, "[ok] {}", text),
            Banner::Warning(text) => write!(f, "[warn] {}", text),
            Banner::Error(text) => write!(f, "[error] Error: {}", text),
        }
    }
}

/// Result of one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both legs succeeded; the modal has closed.
    Completed,
    /// The trade leg succeeded but the CDM service answered with an error.
    CdmFailed,
    /// The trade leg failed, or a request never got a response.
    Failed(String),
    /// The form is incomplete; nothing was sent.
    Rejected,
}

/// Success and error flags shared by both forms.
#[derive(Debug, Default)]
struct SubmitState {
    trade_success: bool,
    cdm_success: bool,
    error: Option<String>,
    cdm_error: Option<String>,
}

impl SubmitState {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records a failed trade leg. An error status is reported as
    /// `failure_text`, anything else with the underlying error.
    fn trade_leg(&mut self, result: Result<(), ClientError>, failure_text: &str) -> Option<SubmitOutcome> {
        match result {
            Ok(()) => None,
            Err(e) if e.is_status() => {
                log::error!("{}: {}", failure_text, e);
                Some(self.fail(failure_text.to_string()))
            }
            Err(e) => {
                log::error!("{}", e);
                Some(self.fail(e.to_string()))
            }
        }
    }

    /// Folds the CDM leg result in, once the trade leg has succeeded.
    fn cdm_leg(&mut self, result: Result<(), ClientError>, warning: &str) -> SubmitOutcome {
        match result {
            Ok(()) => {
                self.trade_success = true;
                self.cdm_success = true;
                SubmitOutcome::Completed
            }
            Err(e) if e.is_status() => {
                log::warn!("{}: {}", warning, e);
                self.trade_success = true;
                self.cdm_success = false;
                self.cdm_error = Some(warning.to_string());
                SubmitOutcome::CdmFailed
            }
            Err(e) => {
                log::error!("{}", e);
                self.fail(e.to_string())
            }
        }
    }

    fn fail(&mut self, message: String) -> SubmitOutcome {
        self.trade_success = false;
        self.cdm_success = false;
        self.error = Some(message.clone());
        SubmitOutcome::Failed(message)
    }

    fn clear_messages(&mut self) {
        self.error = None;
        self.cdm_error = None;
    }

    fn banner(&self, success_text: &str) -> Option<Banner> {
        if let Some(error) = &self.error {
            return Some(Banner::Error(error.clone()));
        }
        if self.trade_success && self.cdm_success {
            return Some(Banner::Success(success_text.to_string()));
        }
        match &self.cdm_error {
            Some(warning) if self.trade_success => Some(Banner::Warning(warning.clone())),
            _ => None,
        }
    }

    /// The submit button is hidden once any leg has been recorded as done.
    fn submit_visible(&self) -> bool {
        !self.trade_success && !self.cdm_success
    }
}
