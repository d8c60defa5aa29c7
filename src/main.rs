fn main() {
    if let Err(err) = picker_console_lib::run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
