pub mod ids;
pub mod logger;
pub mod time;
