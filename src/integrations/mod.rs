pub mod deno;
pub mod helm;
