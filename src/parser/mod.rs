mod common;
mod java;
mod kotlin;

pub use common::{parse_annotation_text, ParsedUnit, Parser};
pub use java::JavaParser;
pub use kotlin::KotlinParser;
