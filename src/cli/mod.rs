pub mod convert;
pub mod currency;
pub mod parse;
pub mod setup;
pub mod summary;
pub mod ui;
