pub mod analyzer;
pub mod checks;
pub mod config;
pub mod error;
pub mod extract;
pub mod fake_card;
pub mod form;
pub mod logbook;
pub mod model;
pub mod odds;
pub mod parsers;
pub mod scoring;
pub mod segment;
pub mod stakes;
