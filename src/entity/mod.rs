pub mod category;
pub mod item;
pub mod item_category;
pub mod item_image;
pub mod item_price;
pub mod session;
pub mod user;
