use super::preferences::Preferences;

/// The ordered wizard steps. Mood, Language and Genre gate advancement;
/// Actor and ReleaseDateRange may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Mood,
    Language,
    Genre,
    Actor,
    ReleaseDateRange,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Mood,
        Step::Language,
        Step::Genre,
        Step::Actor,
        Step::ReleaseDateRange,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Step::Mood => "Mood",
            Step::Language => "Language",
            Step::Genre => "Genre",
            Step::Actor => "Actor",
            Step::ReleaseDateRange => "Release Date Range",
        }
    }

    fn is_satisfied(&self, prefs: &Preferences) -> bool {
        match self {
            Step::Mood => prefs.mood().is_some(),
            Step::Language => prefs.language().is_some(),
            Step::Genre => prefs.genre().is_some(),
            Step::Actor | Step::ReleaseDateRange => true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please make a selection before proceeding.")]
    MissingSelection(Step),
    #[error("Please fill in all required fields before getting recommendations.")]
    MissingRequiredFields,
}

/// Which view the wizard shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Preferences,
    Recommendations,
}

/// Outcome of a successful `advance()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next step.
    Next,
    /// Final step validated; the caller should fetch recommendations.
    Finished,
    /// The wizard is not active (already on the recommendations view).
    None,
}

/// Finite step sequence driving the preference wizard.
///
/// States are the step indices plus a terminal recommendations view.
/// The terminal view is reachable only through a fully validated final
/// step, and its only way out is `reset()`.
#[derive(Debug)]
pub struct StepSequencer {
    current: usize,
    section: Section,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            current: 0,
            section: Section::Preferences,
        }
    }

    pub fn current_step(&self) -> Step {
        Step::ALL[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        Step::ALL.len()
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Validate the current step and move forward. On the final step this
    /// validates all required selections and switches to the
    /// recommendations view instead of incrementing; the `Finished`
    /// signal fires exactly once per successful call.
    pub fn advance(&mut self, prefs: &Preferences) -> Result<Advance, ValidationError> {
        if self.section == Section::Recommendations {
            return Ok(Advance::None);
        }

        if self.current < Step::ALL.len() - 1 {
            let step = self.current_step();
            if !step.is_satisfied(prefs) {
                return Err(ValidationError::MissingSelection(step));
            }
            self.current += 1;
            Ok(Advance::Next)
        } else {
            if prefs.mood().is_none() || prefs.language().is_none() || prefs.genre().is_none() {
                return Err(ValidationError::MissingRequiredFields);
            }
            self.section = Section::Recommendations;
            Ok(Advance::Finished)
        }
    }

    /// Step back; silent no-op on the first step.
    pub fn retreat(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    /// "Start Over": back to the first step and the wizard view.
    pub fn reset(&mut self) {
        self.current = 0;
        self.section = Section::Preferences;
    }
}
