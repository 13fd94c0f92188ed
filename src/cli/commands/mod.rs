pub mod list;
pub mod repair;
pub mod sync;



#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;
