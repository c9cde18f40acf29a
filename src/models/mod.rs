pub mod consultant;
pub mod dashboard;
pub mod project;
pub mod project_meta;
pub mod project_status;
pub mod time_entry;

pub use consultant::*;
pub use dashboard::*;
pub use project::*;
pub use project_meta::*;
pub use project_status::*;
pub use time_entry::*;
