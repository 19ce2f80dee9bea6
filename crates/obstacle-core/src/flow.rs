//! Creation flow state machine
//!
//! Models the "new obstacle" form explicitly instead of with scattered flags:
//!
//! ```text
//!            open                begin_submit (valid)
//!   Closed ────────► Drafting ───────────────────────► Submitting
//!     ▲                │  ▲                                 │
//!     │      close     │  │ finish(Err) / invalid input     │
//!     └────────────────┘  └─────────────────────────────────┤
//!     ▲                                                      │
//!     └──────────────────────── finish(Ok) ──────────────────┘
//! ```
//!
//! `Submitting` is only entered after validation passes. A failed submit
//! returns to `Drafting` with the draft intact and the reason recorded for
//! display.

use thiserror::Error;

use crate::error::Error;
use crate::model::{ImageChoice, Obstacle};
use crate::registry::{ObstacleRegistry, validate_text};

/// Errors from driving the creation flow
#[derive(Debug, Error)]
pub enum FlowError {
    /// The action is not allowed in the current state
    #[error("cannot {action} while the creation flow is {state}")]
    InvalidTransition {
        /// Attempted action
        action: &'static str,
        /// State name at the time
        state: &'static str,
    },

    /// Validation or persistence rejected the submission
    #[error(transparent)]
    Rejected(#[from] Error),
}

/// Form contents while drafting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Title as typed
    pub title: String,
    /// Description as typed
    pub description: String,
    /// Requested photo source
    pub image: ImageChoice,
    /// Reason the last submit failed, for display
    pub last_error: Option<String>,
}

/// Validated input handed to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Trimmed title
    pub title: String,
    /// Trimmed description
    pub description: String,
    /// Requested photo source
    pub image: ImageChoice,
}

/// Current state of the flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    /// Form not shown
    #[default]
    Closed,
    /// User is editing
    Drafting(Draft),
    /// Waiting for the registry
    Submitting(Draft),
}

impl FlowState {
    fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Drafting(_) => "drafting",
            Self::Submitting(_) => "submitting",
        }
    }
}

/// The "new obstacle" form
#[derive(Debug, Clone, Default)]
pub struct CreationFlow {
    state: FlowState,
}

impl CreationFlow {
    /// A closed flow
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The draft being edited or submitted
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FlowState::Drafting(draft) | FlowState::Submitting(draft) => Some(draft),
            FlowState::Closed => None,
        }
    }

    /// Whether the form is shown
    pub fn is_open(&self) -> bool {
        !matches!(self.state, FlowState::Closed)
    }

    /// Show the form with an empty draft
    ///
    /// Opening an already drafting flow keeps its contents.
    pub fn open(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::Closed => {
                self.state = FlowState::Drafting(Draft::default());
                Ok(())
            }
            FlowState::Drafting(_) => Ok(()),
            FlowState::Submitting(_) => Err(self.invalid("open")),
        }
    }

    /// Hide the form, discarding the draft
    pub fn close(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::Submitting(_) => Err(self.invalid("close")),
            _ => {
                self.state = FlowState::Closed;
                Ok(())
            }
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), FlowError> {
        let title = title.into();
        self.edit("set title", |draft| draft.title = title)
    }

    /// Update the description
    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), FlowError> {
        let description = description.into();
        self.edit("set description", |draft| draft.description = description)
    }

    /// Pick where the photo comes from
    pub fn choose_image(&mut self, image: ImageChoice) -> Result<(), FlowError> {
        self.edit("choose image", |draft| draft.image = image)
    }

    /// Validate the draft and move to `Submitting`
    ///
    /// Invalid input keeps the flow in `Drafting` and records the reason.
    pub fn begin_submit(&mut self) -> Result<Submission, FlowError> {
        let FlowState::Drafting(draft) = &mut self.state else {
            return Err(self.invalid("submit"));
        };

        match validate_text(&draft.title, &draft.description) {
            Ok(()) => {
                draft.last_error = None;
                let submission = Submission {
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    image: draft.image,
                };
                self.state = FlowState::Submitting(std::mem::take(draft));
                Ok(submission)
            }
            Err(e) => {
                draft.last_error = Some(e.to_string());
                Err(FlowError::Rejected(e))
            }
        }
    }

    /// Settle a submission: close on success, back to drafting on failure
    pub fn finish(&mut self, result: &Result<Obstacle, Error>) -> Result<(), FlowError> {
        let FlowState::Submitting(draft) = &mut self.state else {
            return Err(self.invalid("finish"));
        };

        match result {
            Ok(_) => self.state = FlowState::Closed,
            Err(e) => {
                let mut draft = std::mem::take(draft);
                draft.last_error = Some(e.to_string());
                self.state = FlowState::Drafting(draft);
            }
        }
        Ok(())
    }

    /// Validate, create through `registry`, and settle
    pub async fn submit(&mut self, registry: &ObstacleRegistry) -> Result<Obstacle, FlowError> {
        let submission = self.begin_submit()?;
        let result = registry
            .create(&submission.title, &submission.description, submission.image)
            .await;
        self.finish(&result)?;
        Ok(result?)
    }

    fn edit(&mut self, action: &'static str, apply: impl FnOnce(&mut Draft)) -> Result<(), FlowError> {
        match &mut self.state {
            FlowState::Drafting(draft) => {
                apply(draft);
                Ok(())
            }
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, ObstacleId};

    fn drafting(title: &str, description: &str) -> CreationFlow {
        let mut flow = CreationFlow::new();
        flow.open().unwrap();
        flow.set_title(title).unwrap();
        flow.set_description(description).unwrap();
        flow
    }

    fn created() -> Obstacle {
        Obstacle::new(
            ObstacleId::new("1"),
            "Pole".to_string(),
            "Low cable".to_string(),
            Coordinates::UNKNOWN,
            None,
        )
    }

    #[test]
    fn test_starts_closed() {
        let flow = CreationFlow::new();
        assert_eq!(flow.state(), &FlowState::Closed);
        assert!(!flow.is_open());
        assert!(flow.draft().is_none());
    }

    #[test]
    fn test_edits_require_drafting() {
        let mut flow = CreationFlow::new();
        assert!(matches!(
            flow.set_title("Pole"),
            Err(FlowError::InvalidTransition { state: "closed", .. })
        ));
    }

    #[test]
    fn test_invalid_submit_stays_drafting() {
        let mut flow = drafting("Pole", "");

        let err = flow.begin_submit().unwrap_err();
        assert!(matches!(err, FlowError::Rejected(Error::Validation(_))));

        let draft = flow.draft().unwrap();
        assert!(matches!(flow.state(), FlowState::Drafting(_)));
        assert_eq!(draft.title, "Pole");
        assert!(draft.last_error.as_deref().unwrap().contains("description"));
    }

    #[test]
    fn test_successful_submit_closes() {
        let mut flow = drafting("  Pole ", "Low cable");
        flow.choose_image(ImageChoice::Camera).unwrap();

        let submission = flow.begin_submit().unwrap();
        assert_eq!(submission.title, "  Pole ");
        assert_eq!(submission.image, ImageChoice::Camera);
        assert!(matches!(flow.state(), FlowState::Submitting(_)));

        // No edits or closing while submitting
        assert!(flow.set_title("other").is_err());
        assert!(flow.close().is_err());

        flow.finish(&Ok(created())).unwrap();
        assert_eq!(flow.state(), &FlowState::Closed);
    }

    #[test]
    fn test_failed_submit_returns_to_drafting() {
        let mut flow = drafting("Pole", "Low cable");
        flow.begin_submit().unwrap();

        flow.finish(&Err(Error::Persist("disk full".to_string())))
            .unwrap();

        let draft = flow.draft().unwrap();
        assert!(matches!(flow.state(), FlowState::Drafting(_)));
        assert_eq!(draft.description, "Low cable");
        assert!(draft.last_error.as_deref().unwrap().contains("disk full"));
    }

    #[test]
    fn test_close_discards_draft() {
        let mut flow = drafting("Pole", "Low cable");
        flow.close().unwrap();
        flow.open().unwrap();

        assert_eq!(flow.draft(), Some(&Draft::default()));
    }

    #[test]
    fn test_finish_requires_submitting() {
        let mut flow = drafting("Pole", "Low cable");
        assert!(flow.finish(&Ok(created())).is_err());
    }
}
