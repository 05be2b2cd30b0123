pub mod common;

mod test_resolver;
