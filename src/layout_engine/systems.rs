pub mod tree;

pub use tree::TreeLayoutEngine;
