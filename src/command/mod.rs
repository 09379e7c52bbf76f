// Command-line text: tokenizing and docker-prefix normalization, plus the verb catalog.

pub mod catalog;
mod normalize;
mod tokenizer;

pub use catalog::{CommandSection, DockerCommand, SECTIONS};
pub use normalize::{normalized_arguments, strip_cli_prefix};
pub use tokenizer::tokenize;
