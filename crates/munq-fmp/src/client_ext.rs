pub mod fmp;
