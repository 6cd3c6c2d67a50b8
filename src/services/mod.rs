pub mod alerts;
pub mod permissions;
pub mod storage;
