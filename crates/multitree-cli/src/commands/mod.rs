pub mod config;
pub mod makecldf;
pub mod show;
pub mod status;

pub use makecldf::run_makecldf;
pub use show::show_tree;
pub use status::show_status;
