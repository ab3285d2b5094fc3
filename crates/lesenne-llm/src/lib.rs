pub mod traits;
pub mod streaming;
pub mod openai;

pub use traits::{
    CompletionClient,
    CompletionRequest, CompletionOptions,
    TokenStream,
};
pub use openai::OpenAIClient;
