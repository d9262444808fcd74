pub mod actions;
pub mod cards;
pub mod health;
pub mod tools;
