//! The persisted store: single source of truth for resumes and team members.
//!
//! Every change goes through [`Store::mutate`], which applies the
//! [`Mutation`] to memory, writes the touched collection back to the
//! key-value backend and then notifies subscribers. There is exactly one
//! writer; nothing here is `Send`.

mod mutation;
mod selectors;

pub use mutation::{Mutation, Outcome, StoreEvent};

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::{
    EducationInput, EducationPatch, MemberInput, Resume, ResumeInput, SkillInput, SkillPatch,
    TeamMember, WorkExperienceInput, WorkExperiencePatch,
};
use crate::persist::{load_json, save_json, KeyValueStorage, MemoryStorage};

/// Snapshot of everything the store owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub resumes: Vec<Resume>,
    pub current_resume_id: Option<String>,
    pub team_members: Vec<TeamMember>,
}

/// Persisted shape of the resume collection
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ResumeBlob {
    resumes: Vec<Resume>,
    current_resume_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResumeBlobRef<'a> {
    resumes: &'a [Resume],
    current_resume_id: Option<&'a str>,
}

/// Persisted shape of the team collection
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TeamBlob {
    team_members: Vec<TeamMember>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamBlobRef<'a> {
    team_members: &'a [TeamMember],
}

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(StoreEvent, &StoreState)>;

pub struct Store {
    state: StoreState,
    storage: Rc<dyn KeyValueStorage>,
    clock: Rc<dyn Clock>,
    config: StoreConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("resumes", &self.state.resumes.len())
            .field("team_members", &self.state.team_members.len())
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    /// Create a store and hydrate it from `storage`
    pub fn open(
        storage: Rc<dyn KeyValueStorage>,
        clock: Rc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        let resumes: ResumeBlob = load_json(&*storage, &config.resume_key).unwrap_or_default();
        let team: TeamBlob = load_json(&*storage, &config.team_key).unwrap_or_default();

        // Drop a pointer that no longer resolves
        let current_resume_id = resumes
            .current_resume_id
            .filter(|id| resumes.resumes.iter().any(|r| &r.id == id));

        tracing::debug!(
            resumes = resumes.resumes.len(),
            team_members = team.team_members.len(),
            "store hydrated"
        );

        Self {
            state: StoreState {
                resumes: resumes.resumes,
                current_resume_id,
                team_members: team.team_members,
            },
            storage,
            clock,
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store over a fresh in-memory backend and the system clock
    pub fn in_memory() -> Self {
        Self::open(
            Rc::new(MemoryStorage::new()),
            Rc::new(SystemClock),
            StoreConfig::default(),
        )
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &Rc<dyn KeyValueStorage> {
        &self.storage
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Apply a mutation, persist the touched collection, notify subscribers.
    ///
    /// Missing targets are reported as [`Outcome::Missing`] and leave the
    /// store untouched. A persistence failure is returned after the
    /// in-memory state and subscribers have already seen the change, as
    /// [`StoreError::NotPersisted`] carrying the outcome.
    pub fn mutate(&mut self, mutation: Mutation) -> Result<Outcome, StoreError> {
        let label = mutation.label();
        let (outcome, event) = self.state.apply(mutation, &*self.clock);

        if !outcome.changed() {
            tracing::debug!(mutation = label, ?outcome, "mutation left store unchanged");
            return Ok(outcome);
        }
        tracing::debug!(mutation = label, ?outcome, "mutation applied");

        let persisted = self.persist(event);
        if let Err(e) = &persisted {
            tracing::warn!(mutation = label, error = %e, "failed to persist store");
        }
        self.notify(event);
        match persisted {
            Ok(()) => Ok(outcome),
            Err(source) => Err(StoreError::NotPersisted {
                outcome,
                source: Box::new(source),
            }),
        }
    }

    /// Register a listener called after every applied mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(StoreEvent, &StoreState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn persist(&self, event: StoreEvent) -> Result<(), StoreError> {
        match event {
            StoreEvent::ResumesChanged => save_json(
                &*self.storage,
                &self.config.resume_key,
                &ResumeBlobRef {
                    resumes: &self.state.resumes,
                    current_resume_id: self.state.current_resume_id.as_deref(),
                },
            ),
            StoreEvent::TeamChanged => save_json(
                &*self.storage,
                &self.config.team_key,
                &TeamBlobRef {
                    team_members: &self.state.team_members,
                },
            ),
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, &self.state);
        }
    }

    // Resume operations

    /// Insert a new resume and make it current. Returns the new id.
    ///
    /// When only the write fails, the id is still available through
    /// [`StoreError::created_id`].
    pub fn add_resume(&mut self, input: ResumeInput) -> Result<String, StoreError> {
        let outcome = self.mutate(Mutation::AddResume(input))?;
        Ok(outcome.created_id().unwrap_or_default().to_string())
    }

    pub fn update_resume(&mut self, id: &str, input: ResumeInput) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UpdateResume {
            id: id.to_string(),
            input,
        })
    }

    /// Remove a resume. Team members that reference it keep the dangling id.
    pub fn delete_resume(&mut self, id: &str) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::DeleteResume { id: id.to_string() })
    }

    pub fn set_current_resume(&mut self, id: Option<&str>) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::SetCurrentResume {
            id: id.map(str::to_string),
        })
    }

    pub fn add_work_experience(
        &mut self,
        resume_id: &str,
        input: WorkExperienceInput,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::AddWorkExperience {
            resume_id: resume_id.to_string(),
            input,
        })
    }

    /// Patch one work experience. The isCurrent/endDate invariant is not checked here.
    pub fn update_work_experience(
        &mut self,
        resume_id: &str,
        experience_id: &str,
        patch: WorkExperiencePatch,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UpdateWorkExperience {
            resume_id: resume_id.to_string(),
            experience_id: experience_id.to_string(),
            patch,
        })
    }

    pub fn remove_work_experience(
        &mut self,
        resume_id: &str,
        experience_id: &str,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::RemoveWorkExperience {
            resume_id: resume_id.to_string(),
            experience_id: experience_id.to_string(),
        })
    }

    pub fn add_education(
        &mut self,
        resume_id: &str,
        input: EducationInput,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::AddEducation {
            resume_id: resume_id.to_string(),
            input,
        })
    }

    pub fn update_education(
        &mut self,
        resume_id: &str,
        education_id: &str,
        patch: EducationPatch,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UpdateEducation {
            resume_id: resume_id.to_string(),
            education_id: education_id.to_string(),
            patch,
        })
    }

    pub fn remove_education(
        &mut self,
        resume_id: &str,
        education_id: &str,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::RemoveEducation {
            resume_id: resume_id.to_string(),
            education_id: education_id.to_string(),
        })
    }

    pub fn add_skill(&mut self, resume_id: &str, input: SkillInput) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::AddSkill {
            resume_id: resume_id.to_string(),
            input,
        })
    }

    pub fn update_skill(
        &mut self,
        resume_id: &str,
        skill_id: &str,
        patch: SkillPatch,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UpdateSkill {
            resume_id: resume_id.to_string(),
            skill_id: skill_id.to_string(),
            patch,
        })
    }

    pub fn remove_skill(&mut self, resume_id: &str, skill_id: &str) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::RemoveSkill {
            resume_id: resume_id.to_string(),
            skill_id: skill_id.to_string(),
        })
    }

    // Team operations

    /// Insert a new team member. Returns the new id.
    pub fn add_member(&mut self, input: MemberInput) -> Result<String, StoreError> {
        let outcome = self.mutate(Mutation::AddMember(input))?;
        Ok(outcome.created_id().unwrap_or_default().to_string())
    }

    pub fn update_member(&mut self, id: &str, input: MemberInput) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UpdateMember {
            id: id.to_string(),
            input,
        })
    }

    pub fn delete_member(&mut self, id: &str) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::DeleteMember { id: id.to_string() })
    }

    /// Idempotent: linking an already linked pair is [`Outcome::Unchanged`]
    pub fn link_resume_to_member(
        &mut self,
        member_id: &str,
        resume_id: &str,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::LinkResume {
            member_id: member_id.to_string(),
            resume_id: resume_id.to_string(),
        })
    }

    pub fn unlink_resume_from_member(
        &mut self,
        member_id: &str,
        resume_id: &str,
    ) -> Result<Outcome, StoreError> {
        self.mutate(Mutation::UnlinkResume {
            member_id: member_id.to_string(),
            resume_id: resume_id.to_string(),
        })
    }
}
