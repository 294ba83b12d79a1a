pub mod fretboard;
pub mod input;
pub mod mode;
pub mod steps;
pub mod view;
