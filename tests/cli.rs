use cpu8::cli::command::{self, CommandRoot};
use structopt::StructOpt;

#[test]
fn send_takes_port_and_baud() {
    assert!(CommandRoot::from_iter_safe(&["cpu8", "send", "prog.s"]).is_ok());
    assert!(CommandRoot::from_iter_safe(&[
        "cpu8", "send", "prog.s", "--port", "/dev/ttyACM0", "--baud", "9600"
    ])
    .is_ok());
    assert!(CommandRoot::from_iter_safe(&["cpu8", "send", "prog.s", "--baud", "fast"]).is_err());
}

#[test]
fn opening_a_missing_port_names_port_and_baud() {
    let err = match command::open_link("/nonexistent/cpu8-tty", 9600) {
        Ok(_) => panic!("opened a port that does not exist"),
        Err(err) => err,
    };

    assert!(format!("{:#}", err).contains("could not open port '/nonexistent/cpu8-tty' at 9600 baud"));
}
