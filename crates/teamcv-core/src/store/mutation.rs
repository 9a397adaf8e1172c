use serde::{Deserialize, Serialize};

use super::StoreState;
use crate::clock::{next_timestamp, Clock};
use crate::model::{
    new_id, EducationInput, EducationPatch, MemberInput, Resume, ResumeInput, SkillInput,
    SkillPatch, TeamMember, WorkExperienceInput, WorkExperiencePatch,
};

/// Every change the store accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    AddResume(ResumeInput),
    UpdateResume {
        id: String,
        input: ResumeInput,
    },
    DeleteResume {
        id: String,
    },
    SetCurrentResume {
        id: Option<String>,
    },

    AddWorkExperience {
        resume_id: String,
        input: WorkExperienceInput,
    },
    UpdateWorkExperience {
        resume_id: String,
        experience_id: String,
        patch: WorkExperiencePatch,
    },
    RemoveWorkExperience {
        resume_id: String,
        experience_id: String,
    },

    AddEducation {
        resume_id: String,
        input: EducationInput,
    },
    UpdateEducation {
        resume_id: String,
        education_id: String,
        patch: EducationPatch,
    },
    RemoveEducation {
        resume_id: String,
        education_id: String,
    },

    AddSkill {
        resume_id: String,
        input: SkillInput,
    },
    UpdateSkill {
        resume_id: String,
        skill_id: String,
        patch: SkillPatch,
    },
    RemoveSkill {
        resume_id: String,
        skill_id: String,
    },

    AddMember(MemberInput),
    UpdateMember {
        id: String,
        input: MemberInput,
    },
    DeleteMember {
        id: String,
    },
    LinkResume {
        member_id: String,
        resume_id: String,
    },
    UnlinkResume {
        member_id: String,
        resume_id: String,
    },
}

impl Mutation {
    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::AddResume(_) => "add_resume",
            Mutation::UpdateResume { .. } => "update_resume",
            Mutation::DeleteResume { .. } => "delete_resume",
            Mutation::SetCurrentResume { .. } => "set_current_resume",
            Mutation::AddWorkExperience { .. } => "add_work_experience",
            Mutation::UpdateWorkExperience { .. } => "update_work_experience",
            Mutation::RemoveWorkExperience { .. } => "remove_work_experience",
            Mutation::AddEducation { .. } => "add_education",
            Mutation::UpdateEducation { .. } => "update_education",
            Mutation::RemoveEducation { .. } => "remove_education",
            Mutation::AddSkill { .. } => "add_skill",
            Mutation::UpdateSkill { .. } => "update_skill",
            Mutation::RemoveSkill { .. } => "remove_skill",
            Mutation::AddMember(_) => "add_member",
            Mutation::UpdateMember { .. } => "update_member",
            Mutation::DeleteMember { .. } => "delete_member",
            Mutation::LinkResume { .. } => "link_resume",
            Mutation::UnlinkResume { .. } => "unlink_resume",
        }
    }
}

/// Result of applying a mutation to the in-memory state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "camelCase")]
pub enum Outcome {
    /// A new entity was created with this id
    Created(String),
    /// The state changed
    Applied,
    /// The target already looked like the requested result
    Unchanged,
    /// The target id does not exist; nothing happened
    Missing,
}

impl Outcome {
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Outcome::Created(id) => Some(id),
            _ => None,
        }
    }

    /// True when the state changed and must be persisted
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Created(_) | Outcome::Applied)
    }
}

/// Which persisted collection a change touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreEvent {
    ResumesChanged,
    TeamChanged,
}

impl StoreState {
    /// Apply `mutation`, stamping records with `clock`
    pub(crate) fn apply(&mut self, mutation: Mutation, clock: &dyn Clock) -> (Outcome, StoreEvent) {
        use Mutation::*;

        match mutation {
            AddResume(input) => {
                let resume = Resume::from_input(new_id(), input, clock.now());
                let id = resume.id.clone();
                self.resumes.push(resume);
                self.current_resume_id = Some(id.clone());
                (Outcome::Created(id), StoreEvent::ResumesChanged)
            }
            UpdateResume { id, input } => {
                let outcome = self.touch_resume(&id, clock, |r| r.replace_content(input));
                (outcome, StoreEvent::ResumesChanged)
            }
            DeleteResume { id } => {
                let before = self.resumes.len();
                self.resumes.retain(|r| r.id != id);
                if self.resumes.len() == before {
                    return (Outcome::Missing, StoreEvent::ResumesChanged);
                }
                if self.current_resume_id.as_deref() == Some(id.as_str()) {
                    self.current_resume_id = None;
                }
                (Outcome::Applied, StoreEvent::ResumesChanged)
            }
            SetCurrentResume { id } => {
                let exists = id
                    .as_deref()
                    .map_or(true, |id| self.resumes.iter().any(|r| r.id == id));
                let outcome = if !exists {
                    Outcome::Missing
                } else if self.current_resume_id == id {
                    Outcome::Unchanged
                } else {
                    self.current_resume_id = id;
                    Outcome::Applied
                };
                (outcome, StoreEvent::ResumesChanged)
            }

            AddWorkExperience { resume_id, input } => {
                let entry = input.with_id(new_id());
                let id = entry.id.clone();
                let outcome =
                    self.touch_resume(&resume_id, clock, |r| r.work_experiences.push(entry));
                (created_if_applied(outcome, id), StoreEvent::ResumesChanged)
            }
            UpdateWorkExperience {
                resume_id,
                experience_id,
                patch,
            } => {
                let outcome = self.touch_resume(&resume_id, clock, |r| {
                    if let Some(exp) = r.work_experiences.iter_mut().find(|e| e.id == experience_id) {
                        patch.apply(exp);
                    }
                });
                (outcome, StoreEvent::ResumesChanged)
            }
            RemoveWorkExperience {
                resume_id,
                experience_id,
            } => {
                let outcome = self.touch_resume(&resume_id, clock, |r| {
                    r.work_experiences.retain(|e| e.id != experience_id)
                });
                (outcome, StoreEvent::ResumesChanged)
            }

            AddEducation { resume_id, input } => {
                let entry = input.with_id(new_id());
                let id = entry.id.clone();
                let outcome = self.touch_resume(&resume_id, clock, |r| r.education.push(entry));
                (created_if_applied(outcome, id), StoreEvent::ResumesChanged)
            }
            UpdateEducation {
                resume_id,
                education_id,
                patch,
            } => {
                let outcome = self.touch_resume(&resume_id, clock, |r| {
                    if let Some(edu) = r.education.iter_mut().find(|e| e.id == education_id) {
                        patch.apply(edu);
                    }
                });
                (outcome, StoreEvent::ResumesChanged)
            }
            RemoveEducation {
                resume_id,
                education_id,
            } => {
                let outcome = self.touch_resume(&resume_id, clock, |r| {
                    r.education.retain(|e| e.id != education_id)
                });
                (outcome, StoreEvent::ResumesChanged)
            }

            AddSkill { resume_id, input } => {
                let entry = input.with_id(new_id());
                let id = entry.id.clone();
                let outcome = self.touch_resume(&resume_id, clock, |r| r.skills.push(entry));
                (created_if_applied(outcome, id), StoreEvent::ResumesChanged)
            }
            UpdateSkill {
                resume_id,
                skill_id,
                patch,
            } => {
                let outcome = self.touch_resume(&resume_id, clock, |r| {
                    if let Some(skill) = r.skills.iter_mut().find(|s| s.id == skill_id) {
                        patch.apply(skill);
                    }
                });
                (outcome, StoreEvent::ResumesChanged)
            }
            RemoveSkill {
                resume_id,
                skill_id,
            } => {
                let outcome =
                    self.touch_resume(&resume_id, clock, |r| r.skills.retain(|s| s.id != skill_id));
                (outcome, StoreEvent::ResumesChanged)
            }

            AddMember(input) => {
                let member = TeamMember::from_input(new_id(), input, clock.now());
                let id = member.id.clone();
                self.team_members.push(member);
                (Outcome::Created(id), StoreEvent::TeamChanged)
            }
            UpdateMember { id, input } => {
                let outcome = self.touch_member(&id, clock, |m| {
                    m.replace_content(input);
                    true
                });
                (outcome, StoreEvent::TeamChanged)
            }
            DeleteMember { id } => {
                let before = self.team_members.len();
                self.team_members.retain(|m| m.id != id);
                let outcome = if self.team_members.len() == before {
                    Outcome::Missing
                } else {
                    Outcome::Applied
                };
                (outcome, StoreEvent::TeamChanged)
            }
            LinkResume {
                member_id,
                resume_id,
            } => {
                let outcome = self.touch_member(&member_id, clock, |m| {
                    if m.has_resume(&resume_id) {
                        return false;
                    }
                    m.resume_ids.push(resume_id);
                    true
                });
                (outcome, StoreEvent::TeamChanged)
            }
            UnlinkResume {
                member_id,
                resume_id,
            } => {
                let outcome = self.touch_member(&member_id, clock, |m| {
                    let before = m.resume_ids.len();
                    m.resume_ids.retain(|id| *id != resume_id);
                    m.resume_ids.len() != before
                });
                (outcome, StoreEvent::TeamChanged)
            }
        }
    }

    /// Edit the resume `id` and refresh its `updated_at`
    fn touch_resume(
        &mut self,
        id: &str,
        clock: &dyn Clock,
        edit: impl FnOnce(&mut Resume),
    ) -> Outcome {
        match self.resumes.iter_mut().find(|r| r.id == id) {
            Some(resume) => {
                edit(resume);
                resume.updated_at = next_timestamp(clock, resume.updated_at);
                Outcome::Applied
            }
            None => Outcome::Missing,
        }
    }

    /// Edit the member `id`; `edit` reports whether anything changed
    fn touch_member(
        &mut self,
        id: &str,
        clock: &dyn Clock,
        edit: impl FnOnce(&mut TeamMember) -> bool,
    ) -> Outcome {
        match self.team_members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                if edit(member) {
                    member.updated_at = next_timestamp(clock, member.updated_at);
                    Outcome::Applied
                } else {
                    Outcome::Unchanged
                }
            }
            None => Outcome::Missing,
        }
    }
}

fn created_if_applied(outcome: Outcome, id: String) -> Outcome {
    match outcome {
        Outcome::Applied => Outcome::Created(id),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_mutation_json_shape() {
        let json = r#"{"type":"linkResume","memberId":"m1","resumeId":"r1"}"#;
        let mutation: Mutation = serde_json::from_str(json).unwrap();
        assert_eq!(
            mutation,
            Mutation::LinkResume {
                member_id: "m1".into(),
                resume_id: "r1".into()
            }
        );
        assert_eq!(mutation.label(), "link_resume");

        let json = r#"{"type":"addResume","fullName":"Ada Lovelace"}"#;
        match serde_json::from_str::<Mutation>(json).unwrap() {
            Mutation::AddResume(input) => assert_eq!(input.full_name, "Ada Lovelace"),
            other => panic!("unexpected mutation {:?}", other),
        }
    }

    #[test]
    fn test_outcome_json_shape() {
        let value = serde_json::to_value(Outcome::Created("abc".into())).unwrap();
        assert_eq!(value, serde_json::json!({"status": "created", "id": "abc"}));
        let value = serde_json::to_value(Outcome::Missing).unwrap();
        assert_eq!(value, serde_json::json!({"status": "missing"}));
    }

    #[test]
    fn test_add_sub_entity_to_missing_resume() {
        let mut state = StoreState::default();
        let (outcome, event) = state.apply(
            Mutation::AddSkill {
                resume_id: "nope".into(),
                input: SkillInput::default(),
            },
            &clock(),
        );
        assert_eq!(outcome, Outcome::Missing);
        assert_eq!(event, StoreEvent::ResumesChanged);
    }

    #[test]
    fn test_set_current_resume() {
        let clock = clock();
        let mut state = StoreState::default();
        let (outcome, _) = state.apply(Mutation::AddResume(ResumeInput::default()), &clock);
        let id = outcome.created_id().unwrap().to_string();

        let (outcome, _) = state.apply(Mutation::SetCurrentResume { id: None }, &clock);
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(state.current_resume_id, None);

        let (outcome, _) = state.apply(Mutation::SetCurrentResume { id: None }, &clock);
        assert_eq!(outcome, Outcome::Unchanged);

        let (outcome, _) = state.apply(
            Mutation::SetCurrentResume {
                id: Some("ghost".into()),
            },
            &clock,
        );
        assert_eq!(outcome, Outcome::Missing);

        let (outcome, _) = state.apply(Mutation::SetCurrentResume { id: Some(id.clone()) }, &clock);
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(state.current_resume_id, Some(id));
    }
}
