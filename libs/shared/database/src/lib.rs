pub mod insforge;
