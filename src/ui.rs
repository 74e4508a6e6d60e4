//! Colored console output, mirroring the shell convention of `==>` status
//! lines. Informational and warning lines go to stdout, errors to stderr.

pub const GREEN: &str = "\x1b[0;32m";
pub const YELLOW: &str = "\x1b[1;33m";
pub const RED: &str = "\x1b[0;31m";
pub const CYAN: &str = "\x1b[0;36m";
pub const RESET: &str = "\x1b[0m";

pub fn info(msg: impl AsRef<str>) {
    println!("{GREEN}==> {}{RESET}", msg.as_ref());
}

pub fn warn(msg: impl AsRef<str>) {
    println!("{YELLOW}==> {}{RESET}", msg.as_ref());
}

pub fn error(msg: impl AsRef<str>) {
    eprintln!("{RED}Error: {}{RESET}", msg.as_ref());
}
