use regex::Regex;
use std::sync::OnceLock;

use teamcv_core::{Education, Resume, Skill, WorkExperience};

use crate::dates::format_date_range;
use crate::document::{Document, Node, PageSize, Role};

pub const SUMMARY_TITLE: &str = "Professional Summary";
pub const EXPERIENCE_TITLE: &str = "Work Experience";
pub const EDUCATION_TITLE: &str = "Education";
pub const SKILLS_TITLE: &str = "Skills";

/// Describe `resume` as a single A4 page.
///
/// Deterministic; optional content that is empty produces no node at all.
pub fn render_resume(resume: &Resume) -> Document {
    let mut page = vec![header(resume)];

    if !resume.summary.trim().is_empty() {
        page.push(section(
            SUMMARY_TITLE,
            vec![Node::text(Role::Summary, resume.summary.as_str())],
        ));
    }

    let mut left = Vec::new();
    if !resume.work_experiences.is_empty() {
        left.push(section(
            EXPERIENCE_TITLE,
            resume.work_experiences.iter().map(experience_item).collect(),
        ));
    }

    let mut right = Vec::new();
    if !resume.education.is_empty() {
        right.push(section(
            EDUCATION_TITLE,
            resume.education.iter().map(education_item).collect(),
        ));
    }
    if !resume.skills.is_empty() {
        right.push(section(
            SKILLS_TITLE,
            vec![Node::view(
                Role::SkillsContainer,
                resume.skills.iter().map(skill_tag).collect(),
            )],
        ));
    }

    if !left.is_empty() || !right.is_empty() {
        page.push(Node::view(
            Role::TwoColumn,
            vec![
                Node::view(Role::LeftColumn, left),
                Node::view(Role::RightColumn, right),
            ],
        ));
    }

    Document {
        page_size: PageSize::A4,
        pages: vec![Node::view(Role::Page, page)],
    }
}

fn header(resume: &Resume) -> Node {
    let mut children = vec![Node::text(Role::Name, resume.full_name.as_str())];
    if !resume.title.is_empty() {
        children.push(Node::text(Role::Title, resume.title.as_str()));
    }

    let contacts: Vec<Node> = [&resume.email, &resume.phone, &resume.location]
        .into_iter()
        .filter(|value| !value.is_empty())
        .map(|value| Node::text(Role::Contact, value.as_str()))
        .collect();
    if !contacts.is_empty() {
        children.push(Node::view(Role::ContactInfo, contacts));
    }

    Node::view(Role::Header, children)
}

fn section(title: &str, mut body: Vec<Node>) -> Node {
    body.insert(0, Node::text(Role::SectionTitle, title));
    Node::view(Role::Section, body)
}

fn experience_item(exp: &WorkExperience) -> Node {
    let mut children = vec![Node::view(
        Role::ExperienceHeader,
        vec![
            Node::view(
                Role::JobHeading,
                vec![
                    Node::text(Role::JobTitle, exp.position.as_str()),
                    Node::text(Role::Company, exp.company.as_str()),
                ],
            ),
            Node::text(
                Role::DateRange,
                format_date_range(&exp.start_date, exp.end_date.as_deref(), exp.is_current),
            ),
        ],
    )];
    if !exp.description.is_empty() {
        children.push(Node::text(Role::Description, exp.description.as_str()));
    }
    Node::view(Role::ExperienceItem, children)
}

fn education_item(edu: &Education) -> Node {
    Node::view(
        Role::EducationItem,
        vec![
            Node::text(Role::Degree, edu.degree.as_str()),
            Node::text(Role::Institution, edu.institution.as_str()),
            Node::text(
                Role::DateRange,
                format_date_range(&edu.start_date, edu.end_date.as_deref(), false),
            ),
        ],
    )
}

fn skill_tag(skill: &Skill) -> Node {
    Node::text(
        Role::SkillTag,
        format!("{} ({})", skill.skill_name, skill.proficiency_level),
    )
}

fn whitespace_runs() -> &'static Regex {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    RUNS.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// "Ada Lovelace" -> "Ada_Lovelace_Resume.pdf"
pub fn pdf_file_name(resume: &Resume) -> String {
    format!(
        "{}_Resume.pdf",
        whitespace_runs().replace_all(&resume.full_name, "_")
    )
}
