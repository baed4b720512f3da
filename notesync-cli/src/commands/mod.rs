pub mod collections;
pub mod init;
pub mod inspect;
pub mod sync;
