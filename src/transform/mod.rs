//! Window transformation through the generative backend.

mod invoker;
mod prompt;
mod style_transformer;

pub use invoker::{degraded_placeholder, InvokerOptions, TransformationInvoker, TransformedWindow};
pub use prompt::build_prompt;
pub use style_transformer::{StyleTransformer, StyledDocument};
