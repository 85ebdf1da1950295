pub mod card;
pub mod catalog;
pub mod category;
pub mod deck;
pub mod hand;
pub mod seat;
pub mod solution;
