pub mod alpha_compositor;
pub mod resample;
