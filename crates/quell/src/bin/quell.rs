fn main() {
    if let Err(err) = quell::run() {
        eprintln!("{}", quell::format_error(&err));
        std::process::exit(quell::EXIT_FATAL);
    }
}
