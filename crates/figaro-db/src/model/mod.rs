pub mod center;
pub mod credential;
pub mod session;
pub mod shared_folder;
pub mod user;
pub mod webdav_token;
