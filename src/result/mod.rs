pub mod routing;

pub use routing::Routed;
