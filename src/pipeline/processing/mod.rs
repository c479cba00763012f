// Pipeline processing: field normalization, relevance filtering,
// entity resolution, and the terminal revenue gate

pub mod normalize;
pub mod relevance;
pub mod resolve;
pub mod revenue_gate;
