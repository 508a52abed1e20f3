mod circle;

pub use circle::create_circle;
