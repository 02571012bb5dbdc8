//! Sample buffering, raw array caching and test signal generation

pub mod buffer;
pub mod cache;
pub mod acoustic;
pub mod generator;

pub use buffer::{OverflowPolicy, WindowBuffer};
pub use cache::RawChannelCache;
pub use acoustic::{deinterleave, AcousticHandler, ArrayGeometry, SensorId};
