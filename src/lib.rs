pub mod config;
pub mod lights;
pub mod net;
pub mod pins;
pub mod server;

pub mod prelude {
    pub use crate::{config::*, lights::*, pins::*, server::*};
}
