//! Layout entry points: unit conversion, embedded max-width policy and
//! image box resolution.

pub mod image;
pub mod units;

pub use image::Dimensions;
pub use image::ImageLayoutSpec;
pub use image::Provenance;
pub use image::resolve;
pub use units::FitContentWidth;
pub use units::LayoutConstraints;
pub use units::MaxWidth;
pub use units::MaxWidthPolicy;
pub use units::NoScaling;
pub use units::Size;
