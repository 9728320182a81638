//! `ArgumentSource` implementations for the ways a command line can arrive

mod clap_args;
mod static_args;

pub use clap_args::ClapArguments;
pub use static_args::StaticArguments;
