mod cli;

pub use cli::{print_commands, print_error, print_output, print_units, print_warnings};
