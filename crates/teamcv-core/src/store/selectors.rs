//! Derived, read-only views over the store state

use super::Store;
use crate::model::{Resume, TeamMember};

impl Store {
    pub fn resumes(&self) -> &[Resume] {
        &self.state.resumes
    }

    pub fn resume(&self, id: &str) -> Option<&Resume> {
        self.state.resumes.iter().find(|r| r.id == id)
    }

    pub fn resume_count(&self) -> usize {
        self.state.resumes.len()
    }

    pub fn current_resume(&self) -> Option<&Resume> {
        self.state
            .current_resume_id
            .as_deref()
            .and_then(|id| self.resume(id))
    }

    /// Most recently updated first, at most `limit` entries
    pub fn recent_resumes(&self, limit: usize) -> Vec<&Resume> {
        let mut recent: Vec<&Resume> = self.state.resumes.iter().collect();
        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        recent.truncate(limit);
        recent
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.state.team_members
    }

    pub fn member(&self, id: &str) -> Option<&TeamMember> {
        self.state.team_members.iter().find(|m| m.id == id)
    }

    /// Resumes linked to the member, in link order. Dangling ids are skipped.
    pub fn linked_resumes(&self, member_id: &str) -> Vec<&Resume> {
        match self.member(member_id) {
            Some(member) => member
                .resume_ids
                .iter()
                .filter_map(|id| self.resume(id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Resumes the member could still be linked to
    pub fn unlinked_resumes(&self, member_id: &str) -> Vec<&Resume> {
        match self.member(member_id) {
            Some(member) => self
                .state
                .resumes
                .iter()
                .filter(|r| !member.has_resume(&r.id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn members_for_resume(&self, resume_id: &str) -> Vec<&TeamMember> {
        self.state
            .team_members
            .iter()
            .filter(|m| m.has_resume(resume_id))
            .collect()
    }
}
