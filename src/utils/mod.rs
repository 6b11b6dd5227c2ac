pub mod constants;
pub mod progress;
pub mod registry;
pub mod timestamps;
pub mod wet_bulb;

pub use constants::*;
pub use progress::ProgressReporter;
pub use registry::{LocationRegistry, MAP_CENTRE};
pub use timestamps::{format_timestamp, parse_timestamp};
pub use wet_bulb::{wet_bulb_temperature, InputPolicy};
