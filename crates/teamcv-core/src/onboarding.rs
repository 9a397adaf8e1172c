//! First-run welcome prompt and guided tour, as an explicit state machine.
//!
//! The machine never touches the UI directly: [`Onboarding::handle`] returns
//! the [`Effect`]s the host should perform (show a dialog, navigate, show a
//! tour step, write the completion flag). Timers belong to the host too; it
//! asks [`Onboarding::auto_prompt_delay`] whether one should be armed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StoreError;
use crate::persist::{load_json, save_json, KeyValueStorage};

/// Route on which every tour anchor is present
pub const TOUR_ROUTE: &str = "/";

/// Where the tooltip sits relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
    /// Name of the UI region the step is anchored to
    pub target: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub placement: Placement,
}

pub const TOUR_STEPS: [TourStep; 4] = [
    TourStep {
        target: "sidebar",
        title: "Navigation Sidebar",
        content: "Use the sidebar to navigate between Dashboard and Team sections. \
                  The Dashboard is where you'll manage all your resumes.",
        placement: Placement::Right,
    },
    TourStep {
        target: "dashboard-header",
        title: "Dashboard Overview",
        content: "This is your main dashboard where you can view and manage all your \
                  resumes. You can search, create new resumes, and organize your work here.",
        placement: Placement::Bottom,
    },
    TourStep {
        target: "create-resume-btn",
        title: "Create Resume",
        content: "Click this button to create a new resume. You'll be guided through the \
                  process of adding personal information, work experience, skills, and more.",
        placement: Placement::Bottom,
    },
    TourStep {
        target: "body",
        title: "You're All Set!",
        content: "Great! You've learned about the dashboard. You can now create resumes, \
                  manage your work, and explore the Team section to collaborate with others.",
        placement: Placement::Center,
    },
];

/// Copy shown in the welcome dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeCopy {
    pub title: &'static str,
    pub description: &'static str,
}

impl WelcomeCopy {
    pub fn for_user(returning: bool) -> Self {
        if returning {
            Self {
                title: "About Team Resume Builder",
                description: "Take a quick tour to refresh your memory about the platform features",
            }
        } else {
            Self {
                title: "Welcome to Team Resume Builder!",
                description: "Let's get you started with a quick tour of the platform",
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    /// Welcome dialog is open
    Prompted { returning: bool },
    /// Tour is showing step `step`
    Running { step: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OnboardingEvent {
    /// Auto-prompt timer fired, or the user asked for the tour again
    Prompt,
    /// User started the tour while viewing `route`
    Accept { route: String },
    /// User skipped or dismissed the welcome dialog
    Skip,
    Next,
    Back,
    /// Tour closed early
    Close,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    ShowWelcome { returning: bool },
    HideWelcome,
    Navigate { path: String },
    StartTour,
    ShowStep { index: usize },
    EndTour,
    /// Write the completion flag to storage
    PersistCompleted,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OnboardingBlob {
    has_completed_onboarding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    phase: Phase,
    completed: bool,
    welcome_delay_ms: u32,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Onboarding {
    pub fn new(completed: bool) -> Self {
        Self {
            phase: Phase::Idle,
            completed,
            welcome_delay_ms: 1000,
        }
    }

    pub fn with_welcome_delay(mut self, ms: u32) -> Self {
        self.welcome_delay_ms = ms;
        self
    }

    /// Restore the completion flag. A missing or unreadable blob means "not completed".
    pub fn load(storage: &dyn KeyValueStorage, key: &str) -> Self {
        let blob: OnboardingBlob = load_json(storage, key).unwrap_or_default();
        Self::new(blob.has_completed_onboarding)
    }

    pub fn persist(&self, storage: &dyn KeyValueStorage, key: &str) -> Result<(), StoreError> {
        save_json(
            storage,
            key,
            &OnboardingBlob {
                has_completed_onboarding: self.completed,
            },
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn current_step(&self) -> Option<&'static TourStep> {
        match self.phase {
            Phase::Running { step } => TOUR_STEPS.get(step),
            _ => None,
        }
    }

    /// How long to wait before prompting on its own, if at all
    pub fn auto_prompt_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle if !self.completed => {
                Some(Duration::from_millis(u64::from(self.welcome_delay_ms)))
            }
            _ => None,
        }
    }

    /// Forget completion so the welcome prompt fires again on next start
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.completed = false;
    }

    pub fn handle(&mut self, event: OnboardingEvent) -> Vec<Effect> {
        match (self.phase, event) {
            (Phase::Running { .. }, OnboardingEvent::Prompt) => Vec::new(),
            (_, OnboardingEvent::Prompt) => {
                let returning = self.completed;
                self.phase = Phase::Prompted { returning };
                vec![Effect::ShowWelcome { returning }]
            }

            (Phase::Prompted { .. }, OnboardingEvent::Accept { route }) => {
                let mut effects = vec![Effect::HideWelcome];
                if route != TOUR_ROUTE {
                    effects.push(Effect::Navigate {
                        path: TOUR_ROUTE.to_string(),
                    });
                }
                self.phase = Phase::Running { step: 0 };
                effects.push(Effect::StartTour);
                effects.push(Effect::ShowStep { index: 0 });
                effects
            }
            (Phase::Prompted { .. }, OnboardingEvent::Skip) => {
                let mut effects = vec![Effect::HideWelcome];
                effects.extend(self.complete());
                effects
            }

            (Phase::Running { step }, OnboardingEvent::Next) => {
                if step + 1 < TOUR_STEPS.len() {
                    self.phase = Phase::Running { step: step + 1 };
                    vec![Effect::ShowStep { index: step + 1 }]
                } else {
                    self.end_tour()
                }
            }
            (Phase::Running { step }, OnboardingEvent::Back) if step > 0 => {
                self.phase = Phase::Running { step: step - 1 };
                vec![Effect::ShowStep { index: step - 1 }]
            }
            (
                Phase::Running { .. },
                OnboardingEvent::Skip | OnboardingEvent::Close | OnboardingEvent::Finish,
            ) => self.end_tour(),

            (phase, event) => {
                tracing::debug!(?phase, ?event, "onboarding event ignored");
                Vec::new()
            }
        }
    }

    fn end_tour(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::EndTour];
        effects.extend(self.complete());
        effects
    }

    fn complete(&mut self) -> Vec<Effect> {
        self.phase = Phase::Idle;
        self.completed = true;
        vec![Effect::PersistCompleted]
    }
}
