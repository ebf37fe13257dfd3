pub use anyhow::anyhow;
pub use std::io::Write;

// Replacements for the std printing macros that return an error instead of panicking, so a
// closed pipe (`thrifty list | head`) can be caught in main and treated as success.
#[macro_export]
macro_rules! println {
    () => (println!(""));
    ($($arg:tt)*) => ({
        writeln!(std::io::stdout(), $($arg)*).map_err(|e| anyhow!(e))
    })
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        write!(std::io::stdout(), $($arg)*).map_err(|e| anyhow!(e))
    })
}

#[macro_export]
macro_rules! eprintln {
    () => (eprintln!(""));
    ($($arg:tt)*) => ({
        writeln!(std::io::stderr(), $($arg)*).map_err(|e| anyhow!(e))
    })
}
