use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{
    new_id, Education, EducationInput, Resume, ResumeInput, Skill, SkillInput, WorkExperience,
    WorkExperienceInput,
};
use crate::store::{Outcome, Store};

/// Top-level text fields of a resume draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResumeField {
    FullName,
    Email,
    Phone,
    Title,
    Summary,
    Location,
    LinkedinUrl,
    PortfolioUrl,
}

impl ResumeField {
    fn slot(self, draft: &mut ResumeInput) -> &mut String {
        match self {
            ResumeField::FullName => &mut draft.full_name,
            ResumeField::Email => &mut draft.email,
            ResumeField::Phone => &mut draft.phone,
            ResumeField::Title => &mut draft.title,
            ResumeField::Summary => &mut draft.summary,
            ResumeField::Location => &mut draft.location,
            ResumeField::LinkedinUrl => &mut draft.linkedin_url,
            ResumeField::PortfolioUrl => &mut draft.portfolio_url,
        }
    }
}

/// One field edit on a work experience entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum WorkExperienceUpdate {
    Company(String),
    Position(String),
    StartDate(String),
    EndDate(Option<String>),
    Description(String),
    Location(String),
    /// Checking "current" also clears the end date
    IsCurrent(bool),
}

impl WorkExperienceUpdate {
    fn apply(self, exp: &mut WorkExperience) {
        match self {
            WorkExperienceUpdate::Company(v) => exp.company = v,
            WorkExperienceUpdate::Position(v) => exp.position = v,
            WorkExperienceUpdate::StartDate(v) => exp.start_date = v,
            WorkExperienceUpdate::EndDate(v) => exp.end_date = v,
            WorkExperienceUpdate::Description(v) => exp.description = v,
            WorkExperienceUpdate::Location(v) => exp.location = v,
            WorkExperienceUpdate::IsCurrent(current) => {
                exp.is_current = current;
                if current {
                    exp.end_date = None;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum EducationUpdate {
    Institution(String),
    Degree(String),
    StartDate(String),
    EndDate(Option<String>),
    Gpa(String),
    Description(String),
}

impl EducationUpdate {
    fn apply(self, edu: &mut Education) {
        match self {
            EducationUpdate::Institution(v) => edu.institution = v,
            EducationUpdate::Degree(v) => edu.degree = v,
            EducationUpdate::StartDate(v) => edu.start_date = v,
            EducationUpdate::EndDate(v) => edu.end_date = v,
            EducationUpdate::Gpa(v) => edu.gpa = v,
            EducationUpdate::Description(v) => edu.description = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SkillUpdate {
    SkillName(String),
    Category(String),
    ProficiencyLevel(String),
}

impl SkillUpdate {
    fn apply(self, skill: &mut Skill) {
        match self {
            SkillUpdate::SkillName(v) => skill.skill_name = v,
            SkillUpdate::Category(v) => skill.category = v,
            SkillUpdate::ProficiencyLevel(v) => skill.proficiency_level = v,
        }
    }
}

/// Closed set of edits the resume form can make to its draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DraftAction {
    SetField {
        field: ResumeField,
        value: String,
    },
    AddWorkExperience,
    UpdateWorkExperience {
        id: String,
        update: WorkExperienceUpdate,
    },
    RemoveWorkExperience {
        id: String,
    },
    AddEducation,
    UpdateEducation {
        id: String,
        update: EducationUpdate,
    },
    RemoveEducation {
        id: String,
    },
    AddSkill,
    UpdateSkill {
        id: String,
        update: SkillUpdate,
    },
    RemoveSkill {
        id: String,
    },
    /// Replace the whole draft, e.g. when the resume being edited changes
    Reset {
        initial: ResumeInput,
    },
}

/// Apply one action to a draft.
///
/// Add actions insert a blank entry under a freshly generated id; update and
/// remove actions targeting an unknown id leave the draft as it was.
pub fn reduce(mut draft: ResumeInput, action: DraftAction) -> ResumeInput {
    match action {
        DraftAction::SetField { field, value } => {
            *field.slot(&mut draft) = value;
        }
        DraftAction::AddWorkExperience => {
            draft
                .work_experiences
                .push(WorkExperienceInput::default().with_id(new_id()));
        }
        DraftAction::UpdateWorkExperience { id, update } => {
            if let Some(exp) = draft.work_experiences.iter_mut().find(|e| e.id == id) {
                update.apply(exp);
            }
        }
        DraftAction::RemoveWorkExperience { id } => {
            draft.work_experiences.retain(|e| e.id != id);
        }
        DraftAction::AddEducation => {
            draft.education.push(EducationInput::default().with_id(new_id()));
        }
        DraftAction::UpdateEducation { id, update } => {
            if let Some(edu) = draft.education.iter_mut().find(|e| e.id == id) {
                update.apply(edu);
            }
        }
        DraftAction::RemoveEducation { id } => {
            draft.education.retain(|e| e.id != id);
        }
        DraftAction::AddSkill => {
            draft.skills.push(SkillInput::default().with_id(new_id()));
        }
        DraftAction::UpdateSkill { id, update } => {
            if let Some(skill) = draft.skills.iter_mut().find(|s| s.id == id) {
                update.apply(skill);
            }
        }
        DraftAction::RemoveSkill { id } => {
            draft.skills.retain(|s| s.id != id);
        }
        DraftAction::Reset { initial } => return initial,
    }
    draft
}

/// What [`DraftSession::save`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "camelCase")]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
    /// The resume being edited no longer exists
    Missing,
}

/// An in-progress edit of one resume (or of a new one)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSession {
    /// `None` while creating a new resume
    resume_id: Option<String>,
    draft: ResumeInput,
    /// Draft content when the session started, for discard
    original: ResumeInput,
    unsaved: bool,
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new_blank()
    }
}

impl DraftSession {
    /// Start creating a new resume from an empty form
    pub fn new_blank() -> Self {
        Self {
            resume_id: None,
            draft: ResumeInput::default(),
            original: ResumeInput::default(),
            unsaved: false,
        }
    }

    /// Start editing an existing resume
    pub fn for_resume(resume: &Resume) -> Self {
        let draft = ResumeInput::from(resume);
        Self {
            resume_id: Some(resume.id.clone()),
            original: draft.clone(),
            draft,
            unsaved: false,
        }
    }

    /// Apply an action. Everything except `Reset` marks the draft as unsaved.
    pub fn dispatch(&mut self, action: DraftAction) -> &ResumeInput {
        let is_reset = matches!(action, DraftAction::Reset { .. });
        let draft = std::mem::take(&mut self.draft);
        self.draft = reduce(draft, action);
        if is_reset {
            self.original = self.draft.clone();
            self.unsaved = false;
        } else {
            self.unsaved = true;
        }
        &self.draft
    }

    /// Re-seed the session when the resume being edited changes identity
    pub fn reset_to(&mut self, resume: Option<&Resume>) {
        *self = match resume {
            Some(resume) => Self::for_resume(resume),
            None => Self::new_blank(),
        };
    }

    /// Throw away edits and return to the content the session started with
    pub fn discard(&mut self) {
        self.draft = self.original.clone();
        self.unsaved = false;
    }

    pub fn draft(&self) -> &ResumeInput {
        &self.draft
    }

    pub fn resume_id(&self) -> Option<&str> {
        self.resume_id.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Commit the draft: add a new resume or replace the edited one.
    ///
    /// After creating, the session switches to editing the new resume. That
    /// also happens when the record was created but could not be written, so
    /// retrying updates it instead of adding a copy.
    pub fn save(&mut self, store: &mut Store) -> Result<SaveOutcome, StoreError> {
        let outcome = match self.resume_id.clone() {
            None => {
                let id = store.add_resume(self.draft.clone()).map_err(|err| {
                    if let Some(id) = err.created_id() {
                        self.resume_id = Some(id.to_string());
                    }
                    err
                })?;
                self.resume_id = Some(id.clone());
                SaveOutcome::Created(id)
            }
            Some(id) => match store.update_resume(&id, self.draft.clone())? {
                Outcome::Missing => return Ok(SaveOutcome::Missing),
                _ => SaveOutcome::Updated(id),
            },
        };
        self.original = self.draft.clone();
        self.unsaved = false;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(field: ResumeField, value: &str) -> DraftAction {
        DraftAction::SetField {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_set_field() {
        let draft = reduce(ResumeInput::default(), set(ResumeField::FullName, "Ada Lovelace"));
        let draft = reduce(draft, set(ResumeField::LinkedinUrl, "https://linkedin.com/in/ada"));
        assert_eq!(draft.full_name, "Ada Lovelace");
        assert_eq!(draft.linkedin_url, "https://linkedin.com/in/ada");
        assert_eq!(draft.email, "");
    }

    #[test]
    fn test_add_actions_generate_fresh_ids() {
        let mut draft = ResumeInput::default();
        draft = reduce(draft, DraftAction::AddWorkExperience);
        draft = reduce(draft, DraftAction::AddWorkExperience);
        draft = reduce(draft, DraftAction::AddEducation);
        draft = reduce(draft, DraftAction::AddSkill);

        assert_eq!(draft.work_experiences.len(), 2);
        assert_ne!(draft.work_experiences[0].id, draft.work_experiences[1].id);
        assert!(!draft.education[0].id.is_empty());
        assert!(!draft.skills[0].id.is_empty());
        assert_eq!(draft.work_experiences[0].end_date, None);
        assert!(!draft.work_experiences[0].is_current);
    }

    #[test]
    fn test_update_and_remove_by_id() {
        let mut draft = reduce(ResumeInput::default(), DraftAction::AddSkill);
        draft = reduce(draft, DraftAction::AddSkill);
        let first = draft.skills[0].id.clone();
        let second = draft.skills[1].id.clone();

        draft = reduce(
            draft,
            DraftAction::UpdateSkill {
                id: second.clone(),
                update: SkillUpdate::SkillName("Rust".into()),
            },
        );
        assert_eq!(draft.skills[0].skill_name, "");
        assert_eq!(draft.skills[1].skill_name, "Rust");

        draft = reduce(draft, DraftAction::RemoveSkill { id: first });
        assert_eq!(draft.skills.len(), 1);
        assert_eq!(draft.skills[0].id, second);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let draft = reduce(ResumeInput::default(), DraftAction::AddEducation);
        let before = draft.clone();

        let after = reduce(
            draft,
            DraftAction::UpdateEducation {
                id: "missing".into(),
                update: EducationUpdate::Degree("PhD".into()),
            },
        );
        let after = reduce(after, DraftAction::RemoveEducation { id: "missing".into() });
        let after = reduce(
            after,
            DraftAction::UpdateWorkExperience {
                id: "missing".into(),
                update: WorkExperienceUpdate::Company("X".into()),
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_is_current_clears_end_date() {
        let mut draft = reduce(ResumeInput::default(), DraftAction::AddWorkExperience);
        let id = draft.work_experiences[0].id.clone();
        draft = reduce(
            draft,
            DraftAction::UpdateWorkExperience {
                id: id.clone(),
                update: WorkExperienceUpdate::EndDate(Some("2021-12-31".into())),
            },
        );
        assert_eq!(draft.work_experiences[0].end_date.as_deref(), Some("2021-12-31"));

        draft = reduce(
            draft,
            DraftAction::UpdateWorkExperience {
                id: id.clone(),
                update: WorkExperienceUpdate::IsCurrent(true),
            },
        );
        assert!(draft.work_experiences[0].is_current);
        assert_eq!(draft.work_experiences[0].end_date, None);

        // Unchecking does not restore anything
        draft = reduce(
            draft,
            DraftAction::UpdateWorkExperience {
                id,
                update: WorkExperienceUpdate::IsCurrent(false),
            },
        );
        assert!(!draft.work_experiences[0].is_current);
        assert_eq!(draft.work_experiences[0].end_date, None);
    }

    #[test]
    fn test_reset_replaces_state() {
        let draft = reduce(ResumeInput::default(), set(ResumeField::Title, "Engineer"));
        let initial = ResumeInput {
            full_name: "Jane Smith".into(),
            ..Default::default()
        };
        let draft = reduce(
            draft,
            DraftAction::Reset {
                initial: initial.clone(),
            },
        );
        assert_eq!(draft, initial);
    }

    #[test]
    fn test_action_json_shape() {
        let json = r#"{"type":"updateWorkExperience","id":"exp1","update":{"field":"isCurrent","value":true}}"#;
        let action: DraftAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            DraftAction::UpdateWorkExperience {
                id: "exp1".into(),
                update: WorkExperienceUpdate::IsCurrent(true),
            }
        );

        let json = r#"{"type":"setField","field":"portfolioUrl","value":"https://ada.dev"}"#;
        let action: DraftAction = serde_json::from_str(json).unwrap();
        assert_eq!(action, set(ResumeField::PortfolioUrl, "https://ada.dev"));

        let action: DraftAction = serde_json::from_str(r#"{"type":"addSkill"}"#).unwrap();
        assert_eq!(action, DraftAction::AddSkill);
    }

    #[test]
    fn test_session_unsaved_flag() {
        let mut session = DraftSession::new_blank();
        assert!(!session.has_unsaved_changes());

        session.dispatch(set(ResumeField::FullName, "Ada"));
        assert!(session.has_unsaved_changes());

        session.dispatch(DraftAction::Reset {
            initial: ResumeInput::default(),
        });
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.draft().full_name, "");
    }

    #[test]
    fn test_session_create_then_update() {
        let mut store = Store::in_memory();
        let mut session = DraftSession::new_blank();
        session.dispatch(set(ResumeField::FullName, "Ada Lovelace"));
        session.dispatch(set(ResumeField::Email, "ada@x.com"));

        // Nothing reaches the store before save
        assert_eq!(store.resume_count(), 0);

        let id = match session.save(&mut store).unwrap() {
            SaveOutcome::Created(id) => id,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.resume_id(), Some(id.as_str()));
        assert_eq!(store.resume(&id).unwrap().full_name, "Ada Lovelace");

        session.dispatch(set(ResumeField::Title, "Analyst"));
        assert_eq!(store.resume(&id).unwrap().title, "");
        assert_eq!(session.save(&mut store).unwrap(), SaveOutcome::Updated(id.clone()));
        assert_eq!(store.resume(&id).unwrap().title, "Analyst");
        assert_eq!(store.resume_count(), 1);
    }

    #[test]
    fn test_session_save_after_delete() {
        let mut store = Store::in_memory();
        let id = store
            .add_resume(ResumeInput {
                full_name: "Gone Soon".into(),
                ..Default::default()
            })
            .unwrap();
        let mut session = DraftSession::for_resume(store.resume(&id).unwrap());
        session.dispatch(set(ResumeField::Summary, "edited"));
        store.delete_resume(&id).unwrap();

        assert_eq!(session.save(&mut store).unwrap(), SaveOutcome::Missing);
        assert!(session.has_unsaved_changes());
        assert_eq!(store.resume_count(), 0);
    }

    #[test]
    fn test_session_retry_after_failed_write_does_not_duplicate() {
        use crate::clock::SystemClock;
        use crate::config::StoreConfig;
        use crate::persist::MemoryStorage;
        use std::rc::Rc;

        let mut store = Store::open(
            Rc::new(MemoryStorage::with_quota(10)),
            Rc::new(SystemClock),
            StoreConfig::default(),
        );
        let mut session = DraftSession::new_blank();
        session.dispatch(set(ResumeField::FullName, "Ada Lovelace"));

        let err = session.save(&mut store).unwrap_err();
        assert_eq!(err.code(), "STORAGE_QUOTA_EXCEEDED");
        assert!(session.has_unsaved_changes());
        let id = session.resume_id().map(str::to_string);
        assert_eq!(id.as_deref(), Some(store.resumes()[0].id.as_str()));

        // The retry targets the record that is already in memory
        assert!(session.save(&mut store).is_err());
        assert_eq!(store.resume_count(), 1);
        assert_eq!(session.resume_id(), id.as_deref());
    }

    #[test]
    fn test_session_discard_and_reset_to() {
        let mut store = Store::in_memory();
        let a = store
            .add_resume(ResumeInput {
                full_name: "A".into(),
                ..Default::default()
            })
            .unwrap();
        let b = store
            .add_resume(ResumeInput {
                full_name: "B".into(),
                ..Default::default()
            })
            .unwrap();

        let mut session = DraftSession::for_resume(store.resume(&a).unwrap());
        session.dispatch(set(ResumeField::FullName, "changed"));
        session.discard();
        assert_eq!(session.draft().full_name, "A");
        assert!(!session.has_unsaved_changes());

        session.reset_to(store.resume(&b));
        assert_eq!(session.resume_id(), Some(b.as_str()));
        assert_eq!(session.draft().full_name, "B");

        session.reset_to(None);
        assert_eq!(session.resume_id(), None);
        assert_eq!(session.draft(), &ResumeInput::default());
    }
}
