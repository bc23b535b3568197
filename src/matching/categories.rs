use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SkillCategory {
    Languages,
    Web,
    Fundamentals,
    DataAi,
    Design,
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Languages,
        SkillCategory::Web,
        SkillCategory::Fundamentals,
        SkillCategory::DataAi,
        SkillCategory::Design,
        SkillCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Languages => "languages",
            SkillCategory::Web => "web",
            SkillCategory::Fundamentals => "fundamentals",
            SkillCategory::DataAi => "data-ai",
            SkillCategory::Design => "design",
            SkillCategory::Other => "other",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        SkillCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown skill category '{value}'"))
    }
}

const CATEGORY_TABLE: &[(&str, SkillCategory)] = &[
    ("c", SkillCategory::Languages),
    ("c++", SkillCategory::Languages),
    ("c#", SkillCategory::Languages),
    ("go", SkillCategory::Languages),
    ("java", SkillCategory::Languages),
    ("javascript", SkillCategory::Languages),
    ("kotlin", SkillCategory::Languages),
    ("python", SkillCategory::Languages),
    ("rust", SkillCategory::Languages),
    ("swift", SkillCategory::Languages),
    ("typescript", SkillCategory::Languages),
    ("angular", SkillCategory::Web),
    ("css", SkillCategory::Web),
    ("html", SkillCategory::Web),
    ("next.js", SkillCategory::Web),
    ("node.js", SkillCategory::Web),
    ("react", SkillCategory::Web),
    ("tailwind", SkillCategory::Web),
    ("vue", SkillCategory::Web),
    ("algorithms", SkillCategory::Fundamentals),
    ("computer networks", SkillCategory::Fundamentals),
    ("data structures", SkillCategory::Fundamentals),
    ("dbms", SkillCategory::Fundamentals),
    ("operating systems", SkillCategory::Fundamentals),
    ("system design", SkillCategory::Fundamentals),
    ("data science", SkillCategory::DataAi),
    ("deep learning", SkillCategory::DataAi),
    ("machine learning", SkillCategory::DataAi),
    ("sql", SkillCategory::DataAi),
    ("statistics", SkillCategory::DataAi),
    ("figma", SkillCategory::Design),
    ("graphic design", SkillCategory::Design),
    ("ui design", SkillCategory::Design),
    ("ux research", SkillCategory::Design),
];

/// Case-insensitive lookup; unlisted skills land in `Other`.
pub fn categorize(skill: &str) -> SkillCategory {
    let key = skill.trim().to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, category)| *category)
        .unwrap_or(SkillCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(categorize("C++"), SkillCategory::Languages);
        assert_eq!(categorize("  data structures "), SkillCategory::Fundamentals);
        assert_eq!(categorize("FIGMA"), SkillCategory::Design);
        assert_eq!(categorize("Juggling"), SkillCategory::Other);
    }

    #[test]
    fn parses_display_names() {
        for category in SkillCategory::ALL {
            assert_eq!(category.to_string().parse::<SkillCategory>().unwrap(), category);
        }
        assert!("cooking".parse::<SkillCategory>().is_err());
    }
}
