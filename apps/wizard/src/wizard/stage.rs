//! Wizard progress: three ordered stages plus the direction of the last move.

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    #[default]
    UploadInputs,
    PersonalDetails,
    ViewResults,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::UploadInputs => Some(Stage::PersonalDetails),
            Stage::PersonalDetails => Some(Stage::ViewResults),
            Stage::ViewResults => None,
        }
    }

    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::UploadInputs => None,
            Stage::PersonalDetails => Some(Stage::UploadInputs),
            Stage::ViewResults => Some(Stage::PersonalDetails),
        }
    }

    /// Zero-based position, for step indicators.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::UploadInputs => "Upload",
            Stage::PersonalDetails => "Details",
            Stage::ViewResults => "Results",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::UploadInputs => "Resume & Job Description",
            Stage::PersonalDetails => "Personal Information",
            Stage::ViewResults => "Analysis & Cover Letter",
        }
    }
}

/// Presentation hint recorded with every transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Direction {
    Forward,
    Backward,
    #[default]
    None,
}

impl Direction {
    /// `1`, `-1` or `0`, the sign a slide transition uses.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
            Direction::None => 0,
        }
    }
}

/// Single-writer state machine. Transitions are synchronous and never fail;
/// anything other than a single legal step is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMachine {
    stage: Stage,
    direction: Direction,
}

impl StageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_stage(&self) -> Stage {
        self.stage
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Moves to `stage` if it is the next or previous step from the current one.
    /// Returns whether the transition was applied.
    pub fn advance_to(&mut self, stage: Stage, direction: Direction) -> bool {
        let legal = self.stage.next() == Some(stage) || self.stage.previous() == Some(stage);
        if !legal {
            warn!(
                "Ignoring stage transition {:?} -> {:?}",
                self.stage, stage
            );
            return false;
        }
        debug!("Stage {:?} -> {:?} ({:?})", self.stage, stage, direction);
        self.stage = stage;
        self.direction = direction;
        true
    }

    /// One step backward. No-op on the first stage.
    pub fn back(&mut self) -> bool {
        match self.stage.previous() {
            Some(previous) => self.advance_to(previous, Direction::Backward),
            None => false,
        }
    }

    pub fn reset_to_start(&mut self) {
        self.stage = Stage::UploadInputs;
        self.direction = Direction::Backward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_upload_with_no_direction() {
        let machine = StageMachine::new();
        assert_eq!(machine.current_stage(), Stage::UploadInputs);
        assert_eq!(machine.direction(), Direction::None);
    }

    #[test]
    fn test_cannot_skip_personal_details() {
        let mut machine = StageMachine::new();
        assert!(!machine.advance_to(Stage::ViewResults, Direction::Forward));
        assert_eq!(machine.current_stage(), Stage::UploadInputs);
        assert_eq!(machine.direction(), Direction::None);
    }

    #[test]
    fn test_back_is_single_step() {
        let mut machine = StageMachine::new();
        assert!(machine.advance_to(Stage::PersonalDetails, Direction::Forward));
        assert!(machine.advance_to(Stage::ViewResults, Direction::Forward));

        assert!(machine.back());
        assert_eq!(machine.current_stage(), Stage::PersonalDetails);
        assert_eq!(machine.direction(), Direction::Backward);

        assert!(machine.back());
        assert_eq!(machine.current_stage(), Stage::UploadInputs);

        assert!(!machine.back());
        assert_eq!(machine.current_stage(), Stage::UploadInputs);
    }

    #[test]
    fn test_reset_from_results_goes_backward_to_start() {
        let mut machine = StageMachine::new();
        machine.advance_to(Stage::PersonalDetails, Direction::Forward);
        machine.advance_to(Stage::ViewResults, Direction::Forward);

        machine.reset_to_start();
        assert_eq!(machine.current_stage(), Stage::UploadInputs);
        assert_eq!(machine.direction(), Direction::Backward);
    }

    #[test]
    fn test_stage_metadata() {
        assert_eq!(Stage::ViewResults.index(), 2);
        assert_eq!(Stage::PersonalDetails.title(), "Details");
        assert_eq!(Direction::Backward.sign(), -1);
    }
}
