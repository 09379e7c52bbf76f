// Structured decoding of backend output and synonym field lookup.

mod json;
mod lookup;

pub use json::{
    RawRecord, Structured, decode, decode_array, decode_lines, decode_object, decode_records,
};
pub use lookup::{FieldLookup, value_as_bool, value_as_text};
