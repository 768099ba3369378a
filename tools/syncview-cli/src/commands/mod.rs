pub mod clip_name;
pub mod init_config;
pub mod markers;
pub mod simulate;
