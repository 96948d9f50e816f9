pub mod handlers;
pub mod keywords;
pub mod normalize;
pub mod pipeline;
pub mod tone;
