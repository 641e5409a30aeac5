pub mod gpu_record;

pub use gpu_record::*;
