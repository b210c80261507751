use cpu8::cli::command;
use structopt::StructOpt;

fn main() {
    command::terminal_init();
    command::exit_with(command::asm(command::SubcommandAsm::from_args()));
}
