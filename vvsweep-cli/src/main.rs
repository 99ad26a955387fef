//! Command line program for running simulation sweeps and analysing
//! their output.

#[macro_use]
extern crate log;

extern crate anyhow;
extern crate clap;
extern crate colored;

extern crate vvsweep_core as vvsweep;

pub mod cli;
mod util;

use colored::*;

fn main() {
    // Run the program based on user input
    match cli::start(cli::app().get_matches()) {
        Ok(_) => (),
        Err(e) => {
            eprintln!("{}{}", "error: ".red(), e);
            if e.root_cause().to_string() != e.to_string() {
                eprintln!("Caused by:\n{}", e.root_cause())
            }
            std::process::exit(1);
        }
    }
}
