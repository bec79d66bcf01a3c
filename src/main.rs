#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::process;

use structopt::StructOpt;

use uridl::{exit_code, Opt};
use uridl_util::console::Console;

fn main() {
    let opt = Opt::from_args();
    let mut cnsl = Console::term(opt.console_config());
    let result = opt.run(&mut io::stdout(), &mut cnsl);
    if let Err(err) = result {
        io::stdout().flush().ok();
        eprintln!();
        eprintln!("Error: {:?}", err);
        process::exit(exit_code(&err));
    }
}
