use log::error;
use std::io::{self, Write};
use std::panic;

pub fn initialize_panic_handler() {
    better_panic::install();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        record_panic(&panic_info.to_string());

        default_hook(panic_info);

        std::process::exit(1);
    }));
}

/// Write the panic message to the log file before the process goes away
///
/// The file logger buffers; without an explicit flush the last lines
/// (usually the interesting ones) are lost.
pub fn record_panic(message: &str) {
    error!("Panic: {message}");
    log::logger().flush();
    let _ = io::stdout().flush();
    let _ = writeln!(io::stderr());
}
