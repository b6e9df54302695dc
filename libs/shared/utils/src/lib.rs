pub mod guard;
pub mod jwt;
pub mod test_utils;
