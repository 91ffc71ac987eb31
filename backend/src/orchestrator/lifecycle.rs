//! Which operations each lifecycle status admits.

use common::model::reference::AchievementStatus;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
    Submit,
    Attach,
    Verify,
    Reject,
}

impl Action {
    /// The only status from which the action may run.
    pub fn required_status(self) -> AchievementStatus {
        match self {
            Action::Update | Action::Delete | Action::Submit | Action::Attach => AchievementStatus::Draft,
            Action::Verify | Action::Reject => AchievementStatus::Submitted,
        }
    }

    fn refusal(self) -> &'static str {
        match self {
            Action::Update => "Only draft achievements can be updated",
            Action::Delete => "Only draft achievements can be deleted",
            Action::Submit => "Only draft achievements can be submitted",
            Action::Attach => "Attachments can only be added to draft achievements",
            Action::Verify => "Achievement must be in 'submitted' status to be verified",
            Action::Reject => "Achievement must be in 'submitted' status to be rejected",
        }
    }

    pub fn refused(self) -> AppError {
        AppError::invalid_state(self.refusal())
    }
}

/// Fails with an invalid-state error unless `action` may run from `status`.
pub fn ensure(status: AchievementStatus, action: Action) -> Result<(), AppError> {
    if status == action.required_status() {
        Ok(())
    } else if status.is_terminal() {
        Err(AppError::invalid_state(format!(
            "Achievement is already {status} and can no longer change"
        )))
    } else {
        Err(action.refused())
    }
}
