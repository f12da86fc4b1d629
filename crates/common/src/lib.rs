//! Process-level plumbing shared by tapstake consumers.

pub mod logging;
