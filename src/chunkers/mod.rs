//! Window splitting, sentence segmentation and sentence-level merging.

mod merger;
mod sentence_splitter;
mod window_chunker;

pub use merger::{merge_windows, SentenceMerger};
pub use sentence_splitter::{split_sentences, SentenceTokenizer};
pub use window_chunker::{Window, WindowSplitter};
