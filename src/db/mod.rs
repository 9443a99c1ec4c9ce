pub mod connection;
pub mod queries;
#[cfg(test)]
pub mod schema;
