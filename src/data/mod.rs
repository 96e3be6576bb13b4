pub mod ack;
pub mod cart;
pub mod class;
pub mod filter;
#[cfg(test)]
pub mod memory;
pub mod mongo;
pub mod payment;
pub mod store;
pub mod user;

pub use store::Store;
