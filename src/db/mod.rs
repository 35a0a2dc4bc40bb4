pub mod init;
pub mod read;
pub mod utils;
pub mod write;

pub use init::connect;
