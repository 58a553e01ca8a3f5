// Service modules
// Response parsing, the chat-completion client and bookmark storage

pub mod bookmarks;
pub mod openai;
pub mod parser;

pub use bookmarks::BookmarkStore;

pub use openai::{
    ChatMessage,
    OpenAiClient,
    OpenAiConfig,
    DEFAULT_ENDPOINT,
    DEFAULT_MODEL,
};

pub use parser::{
    parse,
    strip_enumeration_prefix,
};
