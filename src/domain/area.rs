use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deployable unit a changed file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AreaType {
    Lambda,
    #[serde(rename = "ECS")]
    Ecs,
    Infrastructure,
    Other,
}

impl AreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Lambda => "Lambda",
            AreaType::Ecs => "ECS",
            AreaType::Infrastructure => "Infrastructure",
            AreaType::Other => "Other",
        }
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-project touched by the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedArea {
    pub entity: String,
    #[serde(rename = "type")]
    pub area_type: AreaType,
    /// Directory whose manifest gets the new version, if any
    pub sub_project_root: Option<String>,
    /// Whether the area is listed in the changelog
    pub visible: bool,
}

impl AffectedArea {
    pub fn new(
        entity: impl Into<String>,
        area_type: AreaType,
        sub_project_root: Option<String>,
        visible: bool,
    ) -> Self {
        AffectedArea {
            entity: entity.into(),
            area_type,
            sub_project_root,
            visible,
        }
    }

    /// The root if there is one, else the entity label
    pub fn identity(&self) -> &str {
        self.sub_project_root.as_deref().unwrap_or(&self.entity)
    }

    /// Deduplication key: identity and type
    pub fn fingerprint(&self) -> String {
        format!("{}-{}", self.identity(), self.area_type)
    }

    /// Manifest path for areas that own one
    pub fn manifest_path(&self, manifest_name: &str) -> Option<String> {
        self.sub_project_root
            .as_ref()
            .map(|root| format!("{}/{}", root, manifest_name))
    }
}
