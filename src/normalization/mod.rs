pub mod extract;
pub mod price;
