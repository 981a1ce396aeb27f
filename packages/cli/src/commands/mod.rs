pub mod init;
pub mod paths;
pub mod replay;
pub mod script;

pub use init::{init, InitArgs};
pub use paths::{paths, PathsArgs};
pub use replay::{replay, ReplayArgs};
