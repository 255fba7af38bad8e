pub mod clipboard;
pub mod html;
pub mod process;
