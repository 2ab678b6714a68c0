pub mod build;
pub mod collect;
pub mod init;
pub mod session;

pub use build::build_command;
pub use collect::collect_command;
pub use init::init_command;
