pub mod option;
pub mod price;
pub mod report;
