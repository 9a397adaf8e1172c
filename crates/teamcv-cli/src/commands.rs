use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use teamcv_core::{
    backup_file_name, export_backup, import_backup, MemberForm, Onboarding, Outcome, Resume,
    Store, SystemClock, TOUR_STEPS,
};
use teamcv_render::{pdf_file_name, render_resume};

use crate::cli::{Commands, OnboardingCommands, TeamCommands};
use crate::config::Config;
use crate::storage::FileStorage;

/// Open the store under `config.data_dir`
pub fn open_store(config: &Config) -> Store {
    Store::open(
        Rc::new(FileStorage::new(&config.data_dir)),
        Rc::new(SystemClock),
        config.store_config(),
    )
}

pub fn run(command: Commands, config: &Config, out: &mut impl Write) -> Result<()> {
    let mut store = open_store(config);

    match command {
        Commands::List { limit } => {
            let limit = limit.unwrap_or(store.resume_count());
            let resumes = store.recent_resumes(limit);
            if resumes.is_empty() {
                writeln!(out, "No resumes yet.")?;
            } else {
                writeln!(
                    out,
                    "{:<38} {:<24} {:<24} {:<17}",
                    "ID", "NAME", "TITLE", "UPDATED"
                )?;
                writeln!(out, "{}", "-".repeat(104))?;
                let current = store.state().current_resume_id.as_deref();
                for resume in resumes {
                    let marker = if current == Some(resume.id.as_str()) { "*" } else { " " };
                    writeln!(
                        out,
                        "{}{:<37} {:<24} {:<24} {:<17}",
                        marker,
                        resume.id,
                        truncate(&display_name(resume), 24),
                        truncate(&resume.title, 24),
                        resume.updated_at.format("%Y-%m-%d %H:%M")
                    )?;
                }
            }
        }

        Commands::Show { id } => {
            let Some(resume) = store.resume(&id) else {
                bail!("Resume not found: {}", id);
            };
            print_resume(out, resume)?;
            let members = store.members_for_resume(&id);
            if !members.is_empty() {
                writeln!(out, "\nLinked team members:")?;
                for member in members {
                    writeln!(out, "  {} ({})", member.full_name, member.role)?;
                }
            }
        }

        Commands::Delete { id } => {
            require(store.delete_resume(&id)?, "Resume", &id)?;
            writeln!(out, "Deleted resume {}", id)?;
        }

        Commands::Select { id } => match id {
            Some(id) => {
                require(store.set_current_resume(Some(&id))?, "Resume", &id)?;
                writeln!(out, "Current resume: {}", id)?;
            }
            None => {
                store.set_current_resume(None)?;
                writeln!(out, "Cleared current resume")?;
            }
        },

        Commands::Export { out: path } => {
            let backup = export_backup(&store);
            let path = path.unwrap_or_else(|| {
                PathBuf::from(backup_file_name(backup.exported_at.date_naive()))
            });
            fs::write(&path, backup.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(
                out,
                "Exported {} resume(s) to {}",
                backup.resumes.len(),
                path.display()
            )?;
        }

        Commands::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = import_backup(&mut store, &raw)?;
            writeln!(out, "Imported {} resume(s)", count)?;
        }

        Commands::Render { id, out: path, outline } => {
            let Some(resume) = store.resume(&id) else {
                bail!("Resume not found: {}", id);
            };
            let document = render_resume(resume);
            if outline {
                for page in &document.pages {
                    write!(out, "{}", page)?;
                }
            } else {
                let path = path.unwrap_or_else(|| {
                    let pdf = pdf_file_name(resume);
                    let stem = pdf.strip_suffix(".pdf").unwrap_or(&pdf);
                    PathBuf::from(format!("{}.json", stem))
                });
                fs::write(&path, document.to_json()?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                writeln!(out, "Rendered {} to {}", display_name(resume), path.display())?;
            }
        }

        Commands::Team { command } => run_team(command, &mut store, out)?,

        Commands::Onboarding { command } => {
            let storage = FileStorage::new(&config.data_dir);
            let key = &store.config().onboarding_key;
            let mut onboarding = Onboarding::load(&storage, key);
            match command {
                OnboardingCommands::Status => {
                    if onboarding.is_completed() {
                        writeln!(out, "Tour completed")?;
                    } else {
                        writeln!(out, "Tour not completed ({} steps)", TOUR_STEPS.len())?;
                    }
                }
                OnboardingCommands::Reset => {
                    onboarding.reset();
                    onboarding.persist(&storage, key)?;
                    writeln!(out, "Onboarding reset; the welcome prompt will show again")?;
                }
            }
        }
    }

    Ok(())
}

fn run_team(command: TeamCommands, store: &mut Store, out: &mut impl Write) -> Result<()> {
    match command {
        TeamCommands::List => {
            let members = store.members();
            if members.is_empty() {
                writeln!(out, "No team members yet.")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<38} {:<22} {:<20} {:<28} {:>7}",
                "ID", "NAME", "ROLE", "EMAIL", "RESUMES"
            )?;
            writeln!(out, "{}", "-".repeat(119))?;
            for member in members {
                let linked = store.linked_resumes(&member.id).len();
                writeln!(
                    out,
                    "{:<38} {:<22} {:<20} {:<28} {:>7}",
                    member.id,
                    truncate(&member.full_name, 22),
                    truncate(&member.role, 20),
                    truncate(&member.email, 28),
                    linked
                )?;
            }
        }

        TeamCommands::Show { id } => {
            let Some(member) = store.member(&id) else {
                bail!("Team member not found: {}", id);
            };
            writeln!(out, "{}", member.full_name)?;
            writeln!(out, "Role:   {}", member.role)?;
            writeln!(out, "Email:  {}", member.email)?;
            if let Some(avatar) = &member.avatar_url {
                writeln!(out, "Avatar: {}", avatar)?;
            }
            let linked = store.linked_resumes(&id);
            writeln!(out, "\nLinked resumes ({}):", linked.len())?;
            for resume in linked {
                writeln!(out, "  {}  {}", resume.id, display_name(resume))?;
            }
        }

        TeamCommands::Add {
            name,
            role,
            email,
            avatar,
        } => {
            let form = MemberForm {
                full_name: name,
                role,
                email: email.unwrap_or_default(),
                avatar_url: avatar.unwrap_or_default(),
            };
            let input = match form.validate() {
                Ok(input) => input,
                Err(errors) => {
                    let messages: Vec<&str> = [errors.full_name, errors.role, errors.email]
                        .into_iter()
                        .flatten()
                        .collect();
                    bail!("Invalid team member: {}", messages.join("; "));
                }
            };
            let id = store.add_member(input)?;
            writeln!(out, "Added team member {}", id)?;
        }

        TeamCommands::Delete { id } => {
            require(store.delete_member(&id)?, "Team member", &id)?;
            writeln!(out, "Deleted team member {}", id)?;
        }

        TeamCommands::Link { member, resume } => {
            if store.resume(&resume).is_none() {
                bail!("Resume not found: {}", resume);
            }
            match require(store.link_resume_to_member(&member, &resume)?, "Team member", &member)? {
                Outcome::Unchanged => writeln!(out, "Already linked")?,
                _ => writeln!(out, "Linked resume {} to {}", resume, member)?,
            }
        }

        TeamCommands::Unlink { member, resume } => {
            match require(store.unlink_resume_from_member(&member, &resume)?, "Team member", &member)? {
                Outcome::Unchanged => writeln!(out, "Not linked")?,
                _ => writeln!(out, "Unlinked resume {} from {}", resume, member)?,
            }
        }
    }

    Ok(())
}

fn require(outcome: Outcome, what: &str, id: &str) -> Result<Outcome> {
    if outcome == Outcome::Missing {
        bail!("{} not found: {}", what, id);
    }
    Ok(outcome)
}

fn print_resume(out: &mut impl Write, resume: &Resume) -> Result<()> {
    writeln!(out, "{}", display_name(resume))?;
    if !resume.title.is_empty() {
        writeln!(out, "{}", resume.title)?;
    }
    for (label, value) in [
        ("Email", &resume.email),
        ("Phone", &resume.phone),
        ("Location", &resume.location),
        ("LinkedIn", &resume.linkedin_url),
        ("Portfolio", &resume.portfolio_url),
    ] {
        if !value.is_empty() {
            writeln!(out, "{:<10} {}", format!("{}:", label), value)?;
        }
    }
    if !resume.summary.trim().is_empty() {
        writeln!(out, "\n{}", resume.summary.trim())?;
    }

    if !resume.work_experiences.is_empty() {
        writeln!(out, "\nExperience:")?;
        for exp in &resume.work_experiences {
            writeln!(out, "  {} at {}", exp.position, exp.company)?;
        }
    }
    if !resume.education.is_empty() {
        writeln!(out, "\nEducation:")?;
        for edu in &resume.education {
            writeln!(out, "  {}, {}", edu.degree, edu.institution)?;
        }
    }
    if !resume.skills.is_empty() {
        let skills: Vec<String> = resume
            .skills
            .iter()
            .map(|s| format!("{} ({})", s.skill_name, s.proficiency_level))
            .collect();
        writeln!(out, "\nSkills: {}", skills.join(", "))?;
    }

    writeln!(
        out,
        "\nCreated {}  Updated {}",
        resume.created_at.format("%Y-%m-%d %H:%M"),
        resume.updated_at.format("%Y-%m-%d %H:%M")
    )?;
    Ok(())
}

fn display_name(resume: &Resume) -> String {
    if resume.full_name.trim().is_empty() {
        "Untitled Resume".to_string()
    } else {
        resume.full_name.clone()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use teamcv_core::ResumeInput;

    fn run_to_string(command: Commands, config: &Config) -> Result<String> {
        let mut out = Vec::new();
        run(command, config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn seed_resume(config: &Config, name: &str) -> String {
        let mut store = open_store(config);
        store
            .add_resume(ResumeInput {
                full_name: name.to_string(),
                title: "Engineer".to_string(),
                ..ResumeInput::default()
            })
            .unwrap()
    }

    #[test]
    fn test_list_and_show() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());

        let empty = run_to_string(Commands::List { limit: None }, &config).unwrap();
        assert!(empty.contains("No resumes yet."));

        let id = seed_resume(&config, "Ada Lovelace");
        let listed = run_to_string(Commands::List { limit: None }, &config).unwrap();
        assert!(listed.contains(&id));
        assert!(listed.contains("Ada Lovelace"));

        let shown = run_to_string(Commands::Show { id: id.clone() }, &config).unwrap();
        assert!(shown.starts_with("Ada Lovelace\nEngineer\n"));
    }

    #[test]
    fn test_missing_resume_is_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let err = run_to_string(Commands::Delete { id: "nope".into() }, &config).unwrap_err();
        assert_eq!(err.to_string(), "Resume not found: nope");
    }

    #[test]
    fn test_export_then_import_appends() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().join("data"));
        seed_resume(&config, "Ada Lovelace");

        let backup = dir.path().join("backup.json");
        let msg = run_to_string(Commands::Export { out: Some(backup.clone()) }, &config).unwrap();
        assert!(msg.starts_with("Exported 1 resume(s)"));

        let msg = run_to_string(Commands::Import { file: backup }, &config).unwrap();
        assert_eq!(msg, "Imported 1 resume(s)\n");
        assert_eq!(open_store(&config).resume_count(), 2);
    }

    #[test]
    fn test_import_rejects_bad_file() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().join("data"));
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{"resumes": "nope"}"#).unwrap();

        let err = run_to_string(Commands::Import { file }, &config).unwrap_err();
        assert!(err.to_string().contains("Invalid file format"));
    }

    #[test]
    fn test_render_writes_document() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().join("data"));
        let id = seed_resume(&config, "Ada Lovelace");
        let path = dir.path().join("ada.json");

        run_to_string(
            Commands::Render { id: id.clone(), out: Some(path.clone()), outline: false },
            &config,
        )
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["pageSize"], "A4");

        let outline =
            run_to_string(Commands::Render { id, out: None, outline: true }, &config).unwrap();
        assert!(outline.contains("Ada Lovelace"));
    }

    #[test]
    fn test_team_add_link_and_show() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let resume_id = seed_resume(&config, "Grace Hopper");

        let bad = run_to_string(
            Commands::Team {
                command: TeamCommands::Add {
                    name: " ".into(),
                    role: "Admiral".into(),
                    email: Some("not-an-email".into()),
                    avatar: None,
                },
            },
            &config,
        )
        .unwrap_err();
        assert!(bad.to_string().starts_with("Invalid team member:"));

        run_to_string(
            Commands::Team {
                command: TeamCommands::Add {
                    name: "Grace Hopper".into(),
                    role: "Admiral".into(),
                    email: Some("grace@navy.mil".into()),
                    avatar: None,
                },
            },
            &config,
        )
        .unwrap();
        let member_id = open_store(&config).members()[0].id.clone();

        let link = || Commands::Team {
            command: TeamCommands::Link { member: member_id.clone(), resume: resume_id.clone() },
        };
        assert!(run_to_string(link(), &config).unwrap().starts_with("Linked"));
        assert_eq!(run_to_string(link(), &config).unwrap(), "Already linked\n");

        let shown = run_to_string(
            Commands::Team { command: TeamCommands::Show { id: member_id.clone() } },
            &config,
        )
        .unwrap();
        assert!(shown.contains("Linked resumes (1):"));
    }

    #[test]
    fn test_onboarding_reset() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let storage = FileStorage::new(dir.path());
        let key = config.store_config().onboarding_key;
        Onboarding::new(true).persist(&storage, &key).unwrap();

        let status = || Commands::Onboarding { command: OnboardingCommands::Status };
        assert_eq!(run_to_string(status(), &config).unwrap(), "Tour completed\n");

        run_to_string(Commands::Onboarding { command: OnboardingCommands::Reset }, &config)
            .unwrap();
        assert_eq!(
            run_to_string(status(), &config).unwrap(),
            "Tour not completed (4 steps)\n"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long name", 10), "a very ...");
    }
}
