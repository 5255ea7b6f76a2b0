pub mod band;
pub mod composite;
pub mod image;
pub mod region;
pub mod session;
pub mod visualization;
pub mod window;

pub use band::*;
pub use composite::*;
pub use image::*;
pub use region::*;
pub use session::*;
pub use visualization::*;
pub use window::*;
