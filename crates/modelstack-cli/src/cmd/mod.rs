pub mod deploy;
pub mod init;
pub mod models;
pub mod params;
pub mod status;
pub mod update;
