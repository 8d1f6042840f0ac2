pub mod donations;
pub mod ngos;
pub mod track;
