//! Domain logic - pure release rules independent of the hosting API

pub mod area;
pub mod branch;
pub mod commit;
pub mod dataset;
pub mod tag;
pub mod version;

pub use area::{AffectedArea, AreaType};
pub use branch::BranchPrefix;
pub use commit::{ClassifiedCommit, CommitKind, ParsedMessage};
pub use dataset::{CommitCategories, ReleaseDataset};
pub use tag::{Tag, TagFormat};
pub use version::{VersionBump, VersionTriple};

/// Upper-case the first character and lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
