//! User interface module - terminal output for a release run.
//!
//! The tool runs unattended in CI, so there are no prompts; everything here
//! lives in `formatter`.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_release_plan, display_status,
    display_success, render_release_plan,
};
