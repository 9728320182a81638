//! Command implementations.

pub mod playback;
pub mod record;
pub mod show;

pub use self::playback::execute_playback;
pub use self::record::execute_record;
pub use self::show::execute_show;
