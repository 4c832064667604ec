//! Individual preprocessing steps

pub mod color;
pub mod confidence;
pub mod edge;
pub mod load;
pub mod morphology;
pub mod normalize;
pub mod region;
pub mod saliency;
