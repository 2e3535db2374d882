//! Evented HTML tokenizer for HBSX templates.
//!
//! The tokenizer walks HTML text one character at a time and reports what it
//! sees to a [`TokenizerDelegate`]. It never builds a tree itself. Input can be
//! fed in pieces: the caller is free to interleave its own nodes between
//! chunks, read the current [`TokenizerState`] to decide where those nodes
//! belong, and reposition the tokenizer before the next chunk.
//!
//! ```
//! use hbsx_tokenizer::{Tokenizer, TokenizerState};
//!
//! # struct Sink;
//! # impl hbsx_tokenizer::TokenizerDelegate for Sink {
//! #     type Error = ();
//! #     fn begin_start_tag(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn begin_end_tag(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn append_to_tag_name(&mut self, _: char) -> Result<(), ()> { Ok(()) }
//! #     fn mark_tag_as_self_closing(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn finish_tag(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn begin_attribute(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn append_to_attribute_name(&mut self, _: char) -> Result<(), ()> { Ok(()) }
//! #     fn begin_attribute_value(&mut self, _: bool, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn append_to_attribute_value(&mut self, _: &str, _: hbsx_tokenizer::Position, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn finish_attribute_value(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn begin_data(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn append_to_data(&mut self, _: &str) -> Result<(), ()> { Ok(()) }
//! #     fn finish_data(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn begin_comment(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn append_to_comment_data(&mut self, _: &str) -> Result<(), ()> { Ok(()) }
//! #     fn finish_comment(&mut self, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! #     fn report_syntax_error(&mut self, _: &str, _: hbsx_tokenizer::Position) -> Result<(), ()> { Ok(()) }
//! # }
//! let mut tokenizer = Tokenizer::new();
//! let mut sink = Sink;
//! tokenizer.tokenize_part("<div class=\"a ", &mut sink).unwrap();
//! assert_eq!(tokenizer.state(), TokenizerState::AttributeValueDoubleQuoted);
//! ```

mod entities;
mod state;
mod tokenizer;

pub use state::{is_void_element, Position, TokenizerState, VOID_ELEMENTS};
pub use tokenizer::{Tokenizer, TokenizerDelegate, TokenizerMode};
