pub mod hits;
pub mod loopback;
