pub mod extract;
pub mod list;
pub mod preload;
pub mod render;
pub mod run;
pub mod verify;
