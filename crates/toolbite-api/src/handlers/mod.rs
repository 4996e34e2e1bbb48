pub mod health;
pub mod tools;
