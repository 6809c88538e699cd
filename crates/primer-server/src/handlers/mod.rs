pub mod explore;
pub mod generate;
pub mod health;
pub mod images;
