pub mod orchestration;

pub use orchestration::{run_release, run_release_with, ReleaseOptions, ReleaseReport};
