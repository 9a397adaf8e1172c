pub mod backup;
pub mod clock;
pub mod config;
pub mod draft;
pub mod error;
pub mod loading;
pub mod model;
pub mod onboarding;
pub mod persist;
pub mod store;
pub mod validation;

pub use backup::{backup_file_name, export_backup, import_backup, Backup, BACKUP_VERSION};
pub use clock::{next_timestamp, Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use draft::{
    reduce, DraftAction, DraftSession, EducationUpdate, ResumeField, SaveOutcome, SkillUpdate,
    WorkExperienceUpdate,
};
pub use error::{BackupError, StorageError, StoreError};
pub use loading::{BusyFlag, LoadingGuard};
pub use model::{
    new_id, Education, EducationInput, EducationPatch, MemberInput, Resume, ResumeInput, Skill,
    SkillInput, SkillPatch, TeamMember, WorkExperience, WorkExperienceInput, WorkExperiencePatch,
    PROFICIENCY_LEVELS,
};
pub use onboarding::{
    Effect, Onboarding, OnboardingEvent, Phase, Placement, TourStep, WelcomeCopy, TOUR_ROUTE,
    TOUR_STEPS,
};
pub use persist::{KeyValueStorage, MemoryStorage};
pub use store::{Mutation, Outcome, Store, StoreEvent, StoreState, SubscriptionId};
pub use validation::{FieldErrors, MemberForm};
