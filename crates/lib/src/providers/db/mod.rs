pub mod sqlite;
pub mod storage;
