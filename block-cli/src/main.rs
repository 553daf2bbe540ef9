use std::process;

use structopt::StructOpt;

// argument parser and configuation
pub mod cli;
pub mod manifest;
pub mod status;

// command implementation
pub mod transpile;

use crate::{
    cli::Block,
    status::Status,
    transpile::Failure,
};

pub const MANIFEST: &str = "block.toml";
pub const EXTENSION: &str = "py";

fn main() {
    env_logger::init();
    let options = Block::from_args();

    match transpile::transpile(options) {
        Ok(()) => (),
        Err(Failure::Syntax(error)) => {
            Status::syntax(&error);
            process::exit(1);
        },
        Err(Failure::Other(reason)) => {
            Status::Fatal.log(&reason);
            process::exit(1);
        },
    }
}
