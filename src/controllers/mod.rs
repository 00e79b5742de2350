pub mod admin;
pub mod category;
pub mod health;
pub mod item;
