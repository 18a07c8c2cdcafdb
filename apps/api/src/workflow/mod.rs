pub mod controller;
pub mod handlers;
pub mod navigation;
pub mod notice;
