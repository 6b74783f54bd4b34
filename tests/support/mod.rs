#![allow(dead_code)]

pub mod scenario;
pub mod temp_db;
