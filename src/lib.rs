pub mod cli;
pub mod dashboard;
pub mod history;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;
