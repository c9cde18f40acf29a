pub mod consultants;
pub mod projects;
pub mod roles;
pub mod statuses;
pub mod tags;
pub mod time_entries;
