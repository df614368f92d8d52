/// Keyed counter record
pub mod entry;
/// Pixel rectangles
pub mod region;

pub use entry::Entry;
pub use region::Region;
