use serde::{Deserialize, Serialize};

/// Semantic role of a node; the layout engine maps roles to styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Page,
    Header,
    Name,
    Title,
    ContactInfo,
    Contact,
    Section,
    SectionTitle,
    Summary,
    TwoColumn,
    LeftColumn,
    RightColumn,
    ExperienceItem,
    ExperienceHeader,
    JobHeading,
    JobTitle,
    Company,
    DateRange,
    Description,
    EducationItem,
    Degree,
    Institution,
    SkillsContainer,
    SkillTag,
}

/// Document tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Layout container
    View { role: Role, children: Vec<Node> },
    /// Leaf text run
    Text { role: Role, content: String },
}

impl Node {
    pub fn view(role: Role, children: Vec<Node>) -> Self {
        Node::View { role, children }
    }

    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Node::Text {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Node::View { role, .. } | Node::Text { role, .. } => *role,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::View { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    /// Depth-first, including `self`
    pub fn find_all(&self, role: Role) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect(role, &mut found);
        found
    }

    fn collect<'a>(&'a self, role: Role, found: &mut Vec<&'a Node>) {
        if self.role() == role {
            found.push(self);
        }
        for child in self.children() {
            child.collect(role, found);
        }
    }

    /// Every text run below this node, in reading order
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Node::Text { content, .. } => vec![content.as_str()],
            Node::View { children, .. } => children.iter().flat_map(Node::texts).collect(),
        }
    }

    fn outline(&self, depth: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Node::Text { role, content } => writeln!(f, "{}{:?}: {}", indent, role, content),
            Node::View { role, children } => {
                writeln!(f, "{}{:?}", indent, role)?;
                for child in children {
                    child.outline(depth + 1, f)?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.outline(0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
}

/// Layout-engine input: page size plus one tree per page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub page_size: PageSize,
    pub pages: Vec<Node>,
}

impl Document {
    pub fn find_all(&self, role: Role) -> Vec<&Node> {
        self.pages.iter().flat_map(|p| p.find_all(role)).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::view(
            Role::Header,
            vec![
                Node::text(Role::Name, "Ada"),
                Node::view(Role::ContactInfo, vec![Node::text(Role::Contact, "ada@x.com")]),
            ],
        )
    }

    #[test]
    fn test_find_and_texts() {
        let node = sample();
        assert_eq!(node.find_all(Role::Contact).len(), 1);
        assert_eq!(node.find_all(Role::Header).len(), 1);
        assert!(node.find_all(Role::Summary).is_empty());
        assert_eq!(node.texts(), vec!["Ada", "ada@x.com"]);
    }

    #[test]
    fn test_json_is_tagged() {
        let value = serde_json::to_value(Node::text(Role::SkillTag, "Rust (Expert)")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "text", "role": "skillTag", "content": "Rust (Expert)"})
        );
    }

    #[test]
    fn test_outline() {
        assert_eq!(
            sample().to_string(),
            "Header\n  Name: Ada\n  ContactInfo\n    Contact: ada@x.com\n"
        );
    }
}
