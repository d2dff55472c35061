mod reader;

mod tokenizer;

pub(crate) mod error;

pub(crate) mod signal;

pub(crate) mod types;

mod utilities;

mod parse;

pub(crate) mod session;
