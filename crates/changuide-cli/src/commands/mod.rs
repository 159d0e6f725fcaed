pub mod channel;
pub mod config;
pub mod genre;
pub mod run;
pub mod subscribe;
