pub mod fretboard;
pub mod patterns;
pub mod settings;
pub mod theory;
