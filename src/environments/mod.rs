pub mod medicine;
pub mod patient;
pub mod population;
