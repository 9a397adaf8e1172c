use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Proficiency levels offered by the editor. Stored as plain text, never enforced.
pub const PROFICIENCY_LEVELS: [&str; 4] = ["Beginner", "Intermediate", "Advanced", "Expert"];

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Distinguishes "field absent" (`None`) from "field set to null" (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A single position in a resume's work history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    /// `None` means ongoing or unspecified
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_current: bool,
}

/// Work experience payload without an id; the receiver assigns one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperienceInput {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: String,
    pub location: String,
    pub is_current: bool,
}

impl WorkExperienceInput {
    pub fn with_id(self, id: String) -> WorkExperience {
        WorkExperience {
            id,
            company: self.company,
            position: self.position,
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description,
            location: self.location,
            is_current: self.is_current,
        }
    }
}

/// Partial update of a work experience. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperiencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
}

impl WorkExperiencePatch {
    /// Merge the present fields into `target`. No cross-field invariant is applied.
    pub fn apply(&self, target: &mut WorkExperience) {
        if let Some(v) = &self.company {
            target.company = v.clone();
        }
        if let Some(v) = &self.position {
            target.position = v.clone();
        }
        if let Some(v) = &self.start_date {
            target.start_date = v.clone();
        }
        if let Some(v) = &self.end_date {
            target.end_date = v.clone();
        }
        if let Some(v) = &self.description {
            target.description = v.clone();
        }
        if let Some(v) = &self.location {
            target.location = v.clone();
        }
        if let Some(v) = self.is_current {
            target.is_current = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Free text, e.g. "3.8" or "First Class"
    #[serde(default)]
    pub gpa: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationInput {
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub gpa: String,
    pub description: String,
}

impl EducationInput {
    pub fn with_id(self, id: String) -> Education {
        Education {
            id,
            institution: self.institution,
            degree: self.degree,
            start_date: self.start_date,
            end_date: self.end_date,
            gpa: self.gpa,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EducationPatch {
    pub fn apply(&self, target: &mut Education) {
        if let Some(v) = &self.institution {
            target.institution = v.clone();
        }
        if let Some(v) = &self.degree {
            target.degree = v.clone();
        }
        if let Some(v) = &self.start_date {
            target.start_date = v.clone();
        }
        if let Some(v) = &self.end_date {
            target.end_date = v.clone();
        }
        if let Some(v) = &self.gpa {
            target.gpa = v.clone();
        }
        if let Some(v) = &self.description {
            target.description = v.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub skill_name: String,
    /// Free text grouping, e.g. "Frontend"
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub proficiency_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillInput {
    pub skill_name: String,
    pub category: String,
    pub proficiency_level: String,
}

impl SkillInput {
    pub fn with_id(self, id: String) -> Skill {
        Skill {
            id,
            skill_name: self.skill_name,
            category: self.category,
            proficiency_level: self.proficiency_level,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_level: Option<String>,
}

impl SkillPatch {
    pub fn apply(&self, target: &mut Skill) {
        if let Some(v) = &self.skill_name {
            target.skill_name = v.clone();
        }
        if let Some(v) = &self.category {
            target.category = v.clone();
        }
        if let Some(v) = &self.proficiency_level {
            target.proficiency_level = v.clone();
        }
    }
}

/// A resume record as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub portfolio_url: String,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resume {
    /// Build a new record; `created_at` and `updated_at` both take `timestamp`
    pub fn from_input(id: String, input: ResumeInput, timestamp: DateTime<Utc>) -> Self {
        let mut resume = Self {
            id,
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            title: String::new(),
            summary: String::new(),
            location: String::new(),
            linkedin_url: String::new(),
            portfolio_url: String::new(),
            work_experiences: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        resume.replace_content(input);
        resume
    }

    /// Overwrite every mutable field. Identity and timestamps are untouched.
    pub fn replace_content(&mut self, input: ResumeInput) {
        self.full_name = input.full_name;
        self.email = input.email;
        self.phone = input.phone;
        self.title = input.title;
        self.summary = input.summary;
        self.location = input.location;
        self.linkedin_url = input.linkedin_url;
        self.portfolio_url = input.portfolio_url;
        self.work_experiences = input.work_experiences;
        self.education = input.education;
        self.skills = input.skills;
    }
}

/// The mutable content of a resume: everything except id and timestamps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub summary: String,
    pub location: String,
    pub linkedin_url: String,
    pub portfolio_url: String,
    pub work_experiences: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
}

impl From<&Resume> for ResumeInput {
    fn from(resume: &Resume) -> Self {
        Self {
            full_name: resume.full_name.clone(),
            email: resume.email.clone(),
            phone: resume.phone.clone(),
            title: resume.title.clone(),
            summary: resume.summary.clone(),
            location: resume.location.clone(),
            linkedin_url: resume.linkedin_url.clone(),
            portfolio_url: resume.portfolio_url.clone(),
            work_experiences: resume.work_experiences.clone(),
            education: resume.education.clone(),
            skills: resume.skills.clone(),
        }
    }
}

/// A roster entry that may be linked to resumes by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Order-preserving, duplicate-free. Ids may dangle after a resume is deleted.
    #[serde(default)]
    pub resume_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn from_input(id: String, input: MemberInput, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: input.full_name,
            role: input.role,
            email: input.email,
            avatar_url: input.avatar_url,
            resume_ids: dedup_preserving_order(input.resume_ids),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn replace_content(&mut self, input: MemberInput) {
        self.full_name = input.full_name;
        self.role = input.role;
        self.email = input.email;
        self.avatar_url = input.avatar_url;
        self.resume_ids = dedup_preserving_order(input.resume_ids);
    }

    pub fn has_resume(&self, resume_id: &str) -> bool {
        self.resume_ids.iter().any(|id| id == resume_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberInput {
    pub full_name: String,
    pub role: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub resume_ids: Vec<String>,
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_resume_wire_format_is_camel_case() {
        let resume = Resume::from_input(
            "r1".into(),
            ResumeInput {
                full_name: "Jane Smith".into(),
                linkedin_url: "https://linkedin.com/in/janesmith".into(),
                ..Default::default()
            },
            ts(),
        );
        let value = serde_json::to_value(&resume).unwrap();
        assert_eq!(value["fullName"], "Jane Smith");
        assert_eq!(value["linkedinUrl"], "https://linkedin.com/in/janesmith");
        assert!(value["workExperiences"].as_array().unwrap().is_empty());
        assert_eq!(value["createdAt"], value["updatedAt"]);
    }

    #[test]
    fn test_resume_parses_browser_blob() {
        let json = r#"{
            "id": "1",
            "fullName": "John Doe",
            "email": "john.doe@example.com",
            "workExperiences": [{
                "id": "exp1",
                "company": "Tech Corp",
                "position": "Senior Software Engineer",
                "startDate": "2022-01-01",
                "endDate": null,
                "description": "",
                "location": "San Francisco, CA",
                "isCurrent": true
            }],
            "createdAt": "2024-01-15T10:00:00Z",
            "updatedAt": "2024-01-20T15:30:00Z"
        }"#;
        let resume: Resume = serde_json::from_str(json).unwrap();
        assert_eq!(resume.full_name, "John Doe");
        assert_eq!(resume.phone, "");
        assert_eq!(resume.work_experiences[0].end_date, None);
        assert!(resume.work_experiences[0].is_current);
        assert!(resume.skills.is_empty());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let mut exp = WorkExperienceInput {
            company: "Tech Corp".into(),
            end_date: Some("2021-12-31".into()),
            ..Default::default()
        }
        .with_id("exp1".into());

        let absent: WorkExperiencePatch =
            serde_json::from_str(r#"{"company":"StartupXYZ"}"#).unwrap();
        assert_eq!(absent.end_date, None);
        absent.apply(&mut exp);
        assert_eq!(exp.company, "StartupXYZ");
        assert_eq!(exp.end_date.as_deref(), Some("2021-12-31"));

        let null: WorkExperiencePatch = serde_json::from_str(r#"{"endDate":null}"#).unwrap();
        assert_eq!(null.end_date, Some(None));
        null.apply(&mut exp);
        assert_eq!(exp.end_date, None);
        assert_eq!(exp.company, "StartupXYZ");
    }

    #[test]
    fn test_skill_and_education_patches() {
        let mut skill = SkillInput {
            skill_name: "Rust".into(),
            category: "Backend".into(),
            proficiency_level: "Advanced".into(),
        }
        .with_id("s1".into());
        SkillPatch {
            proficiency_level: Some("Expert".into()),
            ..Default::default()
        }
        .apply(&mut skill);
        assert_eq!(skill.skill_name, "Rust");
        assert_eq!(skill.proficiency_level, "Expert");

        let mut edu = EducationInput {
            institution: "Stanford University".into(),
            ..Default::default()
        }
        .with_id("e1".into());
        EducationPatch {
            gpa: Some("3.8".into()),
            end_date: Some(Some("2020-06-01".into())),
            ..Default::default()
        }
        .apply(&mut edu);
        assert_eq!(edu.institution, "Stanford University");
        assert_eq!(edu.gpa, "3.8");
        assert_eq!(edu.end_date.as_deref(), Some("2020-06-01"));
    }

    #[test]
    fn test_member_resume_ids_are_deduplicated() {
        let member = TeamMember::from_input(
            "m1".into(),
            MemberInput {
                full_name: "Ada".into(),
                role: "Engineer".into(),
                resume_ids: vec!["a".into(), "b".into(), "a".into()],
                ..Default::default()
            },
            ts(),
        );
        assert_eq!(member.resume_ids, vec!["a".to_string(), "b".to_string()]);
        assert!(member.has_resume("b"));
        assert!(!member.has_resume("c"));
    }

    #[test]
    fn test_member_avatar_omitted_when_absent() {
        let member = TeamMember::from_input("m1".into(), MemberInput::default(), ts());
        let value = serde_json::to_value(&member).unwrap();
        assert!(value.get("avatarUrl").is_none());
        assert!(value["resumeIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_input_round_trip_from_resume() {
        let input = ResumeInput {
            full_name: "Ada Lovelace".into(),
            skills: vec![SkillInput::default().with_id("s1".into())],
            ..Default::default()
        };
        let resume = Resume::from_input("r1".into(), input.clone(), ts());
        assert_eq!(ResumeInput::from(&resume), input);
    }

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }
}
