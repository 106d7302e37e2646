pub mod io;
pub mod terminal;
pub mod yaml;
