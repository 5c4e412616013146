//! `swaxios` binary.

fn main() {
    let code = swaxios_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
