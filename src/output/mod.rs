pub mod printer;

pub use printer::{OutputFormat, PricePrinter};
