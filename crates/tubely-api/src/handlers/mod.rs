pub mod assets;
pub mod health;
pub mod video_upload;
pub mod videos;
