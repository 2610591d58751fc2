// State managers over the link store: links, tags and profiles.

pub mod link_manager;
pub mod profile_manager;
pub mod tag_manager;
