pub mod add;
pub mod dispatch;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod play;
pub mod remove;
pub mod schema;
pub mod shared;
pub mod show;
pub mod stats;
pub mod sync;
pub mod update;
