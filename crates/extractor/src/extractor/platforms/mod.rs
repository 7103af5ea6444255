pub mod audible;
