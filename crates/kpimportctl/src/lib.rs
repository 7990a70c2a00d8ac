pub mod cmd_convert;
pub mod cmd_stats;
pub mod common;
