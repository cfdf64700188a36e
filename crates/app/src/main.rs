//! Headless driver: seeds a starter town, runs it for a number of fixed
//! ticks and prints a summary.

mod headless;

use clap::Parser;

use headless::RunOptions;

fn main() {
    let options = RunOptions::parse();
    headless::run(&options);
}
