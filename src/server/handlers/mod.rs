pub mod chat;
pub mod function_call;
pub mod health;
