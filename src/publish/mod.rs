//! Writing a release back to the host

pub mod commit_builder;
pub mod folders;

pub use commit_builder::{
    release_commit_message, AtomicCommitBuilder, CurrentCommit, FileUpload, PublishOutcome,
};
pub use folders::FolderLister;
