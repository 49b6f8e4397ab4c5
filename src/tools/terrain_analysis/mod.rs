// private sub-module defined in other files
mod gradient;
mod hypsographic_curve;
mod nabla;
mod slope;

// exports identifiers from private sub-modules in the current module namespace
pub use self::gradient::Gradient;
pub use self::hypsographic_curve::HypsographicCurve;
pub use self::nabla::Nabla;
pub use self::slope::Slope;
