use colored::Colorize;

pub fn print_title(title: &str) {
    println!("{}", title.bold().cyan());
}

pub fn print_message(message: &str) {
    println!("{message}");
}

pub fn print_info(message: &str) {
    println!("{}", message.blue());
}

pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red().bold());
}

pub fn print_divider() {
    println!("{}", "─".repeat(48).dimmed());
}
