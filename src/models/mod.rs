pub mod crop;
pub mod farm;
pub mod location;
pub mod season;
pub mod weather;

pub use crop::*;
pub use farm::*;
pub use location::*;
pub use season::*;
pub use weather::*;
